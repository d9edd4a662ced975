//! Client-side harness for the MPT verifier.
//!
//! The flow is linear: read a [`ProviderConfig`] from the environment, [`Provider::bind`] it,
//! [`Workspace::resolve`] the program, then register and run tests with a [`Suite`]. There is
//! no process-wide state; the provider and program handle are passed to each test explicitly.
pub mod config;
pub mod error;
pub mod mpt;
pub mod provider;
pub mod runner;
pub mod suite;
pub mod workspace;

pub use config::ProviderConfig;
pub use error::{HarnessError, Result};
pub use mpt::{ProofUploader, UploadReport};
pub use provider::Provider;
pub use runner::{Outcome, Suite, SuiteReport, TestResult};
pub use suite::{smoke_suite, TestContext};
pub use workspace::{MptVerifier, ProgramHandle, Workspace, WorkspaceProgram};
