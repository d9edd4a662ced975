use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod cluster;
pub mod idl;
pub mod offline;
pub mod proof_file;

use cluster::{SubmitArgs, TestArgs};
use idl::IdlArgs;
use offline::{AddressArgs, ProveArgs, VerifyArgs};

#[derive(Subcommand, Debug)]
enum CliCommand {
    #[command(about = "Verify a proof file off chain")]
    Verify(VerifyArgs),
    #[command(about = "Build a trie from key/value entries and write a proof for one key")]
    Prove(ProveArgs),
    #[command(about = "Show the proof account and upload plan for a proof file")]
    Address(AddressArgs),
    #[command(about = "Upload a proof and validate it on chain")]
    Submit(SubmitArgs),
    #[command(about = "Write the program IDL")]
    Idl(IdlArgs),
    #[command(about = "Run the smoke test suite against a cluster")]
    Test(TestArgs),
}

#[derive(Parser)]
#[command(name = "mpt", version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        CliCommand::Verify(args) => offline::verify(args),
        CliCommand::Prove(args) => offline::prove(args),
        CliCommand::Address(args) => offline::address(args),
        CliCommand::Submit(args) => cluster::submit(args).await,
        CliCommand::Idl(args) => idl::generate_idl(args).map(|_| ()),
        CliCommand::Test(args) => cluster::test(args).await,
    }
}
