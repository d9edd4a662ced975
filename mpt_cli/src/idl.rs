use std::path::PathBuf;

use clap::Parser;
use colored::*;
use mpt_harness::workspace::DEFAULT_IDL_DIR;
use mpt_program::{idl::program_idl, PROGRAM_NAME};

#[derive(Parser, Debug)]
pub struct IdlArgs {
    /// Directory the `<program>.json` artifact is written to
    #[arg(long, value_name = "DIR", default_value = DEFAULT_IDL_DIR)]
    pub out_dir: PathBuf,
}

pub fn generate_idl(args: IdlArgs) -> eyre::Result<PathBuf> {
    let path = args.out_dir.join(format!("{PROGRAM_NAME}.json"));
    program_idl().write(&path)?;
    println!("{}", format!("IDL written to {}", path.display()).green());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpt_harness::{MptVerifier, Workspace};

    #[test]
    fn written_idl_resolves_in_the_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate_idl(IdlArgs {
            out_dir: dir.path().join("idl"),
        })
        .unwrap();
        assert!(path.ends_with("anchor_mpt_demo.json"));

        let workspace = Workspace::default()
            .register::<MptVerifier>()
            .with_idl_dir(dir.path().join("idl"));
        workspace.resolve("anchor-mpt-demo").unwrap();
    }
}
