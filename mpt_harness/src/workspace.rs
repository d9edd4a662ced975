//! Registry of the programs a test can address by name.
//!
//! Programs are registered from typed descriptors compiled into the harness. An IDL artifact
//! on disk is never trusted as the source of truth. With an IDL directory configured, the
//! artifact must exist there and match the compiled description; without one, only the
//! compiled description is used.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use convert_case::{Case, Casing};
use mpt_idl::IdlDefinition;
use solana_address::Address;
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Directory `anchor build` style tooling writes IDL artifacts to.
pub const DEFAULT_IDL_DIR: &str = "target/idl";

/// A program known to the workspace at compile time.
pub trait WorkspaceProgram {
    const NAME: &'static str;

    fn address() -> Address;

    fn idl() -> IdlDefinition;
}

/// The MPT verifier program.
pub struct MptVerifier;

impl WorkspaceProgram for MptVerifier {
    const NAME: &'static str = mpt_program::PROGRAM_NAME;

    fn address() -> Address {
        mpt_program::ID_ADDRESS
    }

    fn idl() -> IdlDefinition {
        mpt_program::idl::program_idl()
    }
}

#[derive(Debug, Clone)]
pub struct ProgramHandle {
    pub name: String,
    pub address: Address,
    pub idl: Arc<IdlDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    programs: BTreeMap<String, (Address, Arc<IdlDefinition>)>,
    idl_dir: Option<PathBuf>,
}

impl Workspace {
    /// Every program of this repository, checking artifacts in [`DEFAULT_IDL_DIR`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
            .register::<MptVerifier>()
            .with_idl_dir(DEFAULT_IDL_DIR)
    }

    #[must_use]
    pub fn register<P: WorkspaceProgram>(mut self) -> Self {
        self.programs.insert(
            normalize(P::NAME),
            (P::address(), Arc::new(P::idl())),
        );
        self
    }

    #[must_use]
    pub fn with_idl_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.idl_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn idl_dir(&self) -> Option<&Path> {
        self.idl_dir.as_deref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    /// Looks up `name` in snake, kebab or Pascal case.
    ///
    /// A missing, unparsable or diverging artifact in the IDL directory is a
    /// [`HarnessError::SchemaMismatch`].
    pub fn resolve(&self, name: &str) -> Result<ProgramHandle> {
        let key = normalize(name);
        let (address, idl) = self
            .programs
            .get(&key)
            .ok_or_else(|| HarnessError::NotFound(name.to_string()))?;

        if let Some(path) = self.artifact_path(&key) {
            debug!(program = %key, path = %path.display(), "checking IDL artifact");
            IdlDefinition::read(&path)
                .and_then(|artifact| idl.check_compatible(&artifact))
                .map_err(|source| HarnessError::SchemaMismatch {
                    name: key.clone(),
                    source,
                })?;
        }

        Ok(ProgramHandle {
            name: key,
            address: *address,
            idl: Arc::clone(idl),
        })
    }

    fn artifact_path(&self, key: &str) -> Option<PathBuf> {
        self.idl_dir
            .as_ref()
            .map(|dir| dir.join(format!("{key}.json")))
    }
}

fn normalize(name: &str) -> String {
    name.to_case(Case::Snake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_normalize_to_snake_case() {
        for name in ["anchor_mpt_demo", "anchor-mpt-demo", "AnchorMptDemo"] {
            assert_eq!(normalize(name), "anchor_mpt_demo");
        }
    }

    #[test]
    fn resolves_without_an_artifact_dir() {
        let workspace = Workspace::default().register::<MptVerifier>();
        let handle = workspace.resolve("AnchorMptDemo").unwrap();
        assert_eq!(handle.name, "anchor_mpt_demo");
        assert_eq!(handle.address, mpt_program::ID_ADDRESS);
        assert_eq!(handle.idl.instructions.len(), 4);
        assert_eq!(workspace.names().collect::<Vec<_>>(), vec!["anchor_mpt_demo"]);
    }

    #[test]
    fn unknown_programs_are_not_found() {
        let workspace = Workspace::default().register::<MptVerifier>();
        assert!(matches!(
            workspace.resolve("token_swap"),
            Err(HarnessError::NotFound(name)) if name == "token_swap"
        ));
    }
}
