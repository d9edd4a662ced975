//! Interface description (IDL) of the MPT verifier program.
//!
//! The definition is produced from the compiled program crate and written to
//! `target/idl/<program>.json`. Clients holding typed bindings use
//! [`IdlDefinition::check_compatible`] to detect a stale or mismatched artifact.
pub mod instruction;
pub mod serde_impls;
pub mod ty;

use crate::serde_impls::{serde_base58_address, serde_hex_bytes};
pub use instruction::{IdlAccountItem, IdlInstruction, IdlSeed};
pub use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use solana_address::Address;
use std::{fs, path::Path};
pub use ty::{IdlField, IdlTypeDef};

pub type IdlDiscriminant = Vec<u8>;
pub type ItemDescription = Vec<String>;

pub type Result<T> = std::result::Result<T, Error>;

/// Version of the IDL format itself, tied to this crate's version.
pub fn idl_spec_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdlMetadata {
    /// Version of the `IdlDefinition` format
    pub idl_spec: Version,
    /// Name of the program
    pub name: String,
    /// Version of the program
    pub version: Version,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub docs: ItemDescription,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub repository: Option<String>,
}

impl Default for IdlMetadata {
    fn default() -> Self {
        Self {
            idl_spec: idl_spec_version(),
            name: String::new(),
            version: Version::new(0, 0, 0),
            docs: Vec::new(),
            repository: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdlAccount {
    pub name: String,
    #[serde(with = "serde_hex_bytes")]
    pub discriminant: IdlDiscriminant,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub docs: ItemDescription,
    pub fields: Vec<IdlField>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdlError {
    pub code: u32,
    pub name: String,
    pub msg: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdlDefinition {
    #[serde(with = "serde_base58_address")]
    pub address: Address,
    pub metadata: IdlMetadata,
    pub instructions: Vec<IdlInstruction>,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub accounts: Vec<IdlAccount>,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub errors: Vec<IdlError>,
}

impl IdlDefinition {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    pub fn account(&self, name: &str) -> Option<&IdlAccount> {
        self.accounts.iter().find(|account| account.name == name)
    }

    pub fn error(&self, code: u32) -> Option<&IdlError> {
        self.errors.iter().find(|error| error.code == code)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Writes the pretty printed definition, creating parent directories as needed.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| Error::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut json = self.to_json_pretty()?;
        json.push('\n');
        fs::write(path, json).map_err(io_err)
    }

    /// Checks that `artifact` describes the same interface as `self`.
    ///
    /// Compares the address, the IDL format version and every instruction's discriminant,
    /// accounts and arguments. Docs and errors are informational and ignored.
    pub fn check_compatible(&self, artifact: &IdlDefinition) -> Result<()> {
        let spec_req = caret_req(&self.metadata.idl_spec);
        if !spec_req.matches(&artifact.metadata.idl_spec) {
            return Err(Error::mismatch(
                "idl_spec",
                spec_req,
                &artifact.metadata.idl_spec,
            ));
        }
        if self.address != artifact.address {
            return Err(Error::mismatch("address", self.address, artifact.address));
        }
        if self.instructions.len() != artifact.instructions.len() {
            return Err(Error::mismatch(
                "instruction count",
                self.instructions.len(),
                artifact.instructions.len(),
            ));
        }

        for expected in &self.instructions {
            let found = artifact
                .instruction(&expected.name)
                .ok_or_else(|| Error::MissingInstruction(expected.name.clone()))?;
            if expected.discriminant != found.discriminant {
                return Err(Error::mismatch(
                    format!("`{}` discriminant", expected.name),
                    format!("{:?}", expected.discriminant),
                    format!("{:?}", found.discriminant),
                ));
            }
            let expected_accounts: Vec<_> = expected.accounts.iter().map(account_shape).collect();
            let found_accounts: Vec<_> = found.accounts.iter().map(account_shape).collect();
            if expected_accounts != found_accounts {
                return Err(Error::mismatch(
                    format!("`{}` accounts", expected.name),
                    format!("{expected_accounts:?}"),
                    format!("{found_accounts:?}"),
                ));
            }
            let expected_args: Vec<_> = expected.args.iter().map(|f| (&f.name, &f.ty)).collect();
            let found_args: Vec<_> = found.args.iter().map(|f| (&f.name, &f.ty)).collect();
            if expected_args != found_args {
                return Err(Error::mismatch(
                    format!("`{}` args", expected.name),
                    format!("{expected_args:?}"),
                    format!("{found_args:?}"),
                ));
            }
        }
        Ok(())
    }
}

fn account_shape(account: &IdlAccountItem) -> (&str, bool, bool) {
    (&account.name, account.writable, account.signer)
}

fn caret_req(version: &Version) -> VersionReq {
    VersionReq {
        comparators: vec![semver::Comparator {
            op: semver::Op::Caret,
            major: version.major,
            minor: Some(version.minor),
            patch: None,
            pre: semver::Prerelease::EMPTY,
        }],
    }
}

// Serde helper function
fn is_default<T: Default + PartialEq>(t: &T) -> bool {
    t == &T::default()
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IDL mismatch in {what}: expected {expected}, found {found}")]
    Mismatch {
        what: String,
        expected: String,
        found: String,
    },
    #[error("Instruction `{0}` is missing from the IDL artifact")]
    MissingInstruction(String),
    #[error("Failed to access IDL file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    fn mismatch(
        what: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        Self::Mismatch {
            what: what.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn sample() -> IdlDefinition {
        IdlDefinition {
            address: Address::from_str("9n2uAscxSNrotCE2PC1DpKgtUFu7iSWEiJpbN9ynqzHp").unwrap(),
            metadata: IdlMetadata {
                name: "sample".into(),
                version: Version::new(1, 2, 3),
                ..Default::default()
            },
            instructions: vec![IdlInstruction {
                name: "init".into(),
                discriminant: vec![0],
                docs: vec!["Creates the account".into()],
                accounts: vec![
                    IdlAccountItem::new("payer", true, true),
                    IdlAccountItem::new("state", true, false).with_seeds(vec![
                        IdlSeed::Const(b"State".to_vec()),
                        IdlSeed::Arg("root".into()),
                    ]),
                ],
                args: vec![
                    IdlField::new("root", IdlTypeDef::array(IdlTypeDef::U8, 32)),
                    IdlField::new("size", IdlTypeDef::U32),
                ],
            }],
            accounts: vec![],
            errors: vec![IdlError {
                code: 6000,
                name: "Oops".into(),
                msg: "Something broke".into(),
            }],
        }
    }

    #[test]
    fn test_idl_spec_version() {
        assert_eq!(idl_spec_version().to_string(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn json_round_trip_keeps_definition() {
        let idl = sample();
        let json = idl.to_json_pretty().unwrap();
        assert!(json.contains("\"9n2uAscxSNrotCE2PC1DpKgtUFu7iSWEiJpbN9ynqzHp\""));
        assert!(json.contains("\"const\": \"5374617465\""));
        assert_eq!(IdlDefinition::from_json(&json).unwrap(), idl);
    }

    #[test]
    fn write_then_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/idl/sample.json");
        sample().write(&path).unwrap();
        assert_eq!(IdlDefinition::read(&path).unwrap(), sample());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IdlDefinition::read(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err}");
    }

    #[test]
    fn compatible_ignores_docs() {
        let mut artifact = sample();
        artifact.instructions[0].docs.clear();
        artifact.errors.clear();
        sample().check_compatible(&artifact).unwrap();
    }

    #[test]
    fn detects_address_change() {
        let mut artifact = sample();
        artifact.address = Address::default();
        let err = sample().check_compatible(&artifact).unwrap_err();
        assert!(matches!(err, Error::Mismatch { ref what, .. } if what == "address"));
    }

    #[test]
    fn detects_interface_changes() {
        let mut artifact = sample();
        artifact.instructions[0].discriminant = vec![9];
        assert!(sample().check_compatible(&artifact).is_err());

        let mut artifact = sample();
        artifact.instructions[0].accounts[0].writable = false;
        assert!(sample().check_compatible(&artifact).is_err());

        let mut artifact = sample();
        artifact.instructions[0].args[1].ty = IdlTypeDef::U64;
        assert!(sample().check_compatible(&artifact).is_err());

        let mut artifact = sample();
        artifact.instructions[0].name = "initialize".into();
        let err = sample().check_compatible(&artifact).unwrap_err();
        assert!(matches!(err, Error::MissingInstruction(ref name) if name == "init"));
    }

    #[test]
    fn rejects_incompatible_format_version() {
        let mut artifact = sample();
        artifact.metadata.idl_spec = Version::new(99, 0, 0);
        let err = sample().check_compatible(&artifact).unwrap_err();
        assert!(matches!(err, Error::Mismatch { ref what, .. } if what == "idl_spec"));
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(IdlTypeDef::array(IdlTypeDef::U8, 32).fixed_size(), Some(32));
        assert_eq!(IdlTypeDef::vec(IdlTypeDef::U8).fixed_size(), None);
        assert_eq!(
            IdlTypeDef::Struct(vec![
                IdlField::new("a", IdlTypeDef::U32),
                IdlField::new("b", IdlTypeDef::Address),
            ])
            .fixed_size(),
            Some(36)
        );
    }
}
