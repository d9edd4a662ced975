//! Suites shipped with the harness.
use crate::{provider::Provider, runner::Suite, workspace::ProgramHandle};

pub const SMOKE_SUITE: &str = "anchor-mpt-demo";

/// What a test body receives: the bound provider and the resolved program.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub provider: Provider,
    pub program: ProgramHandle,
}

/// Checks that the harness can bind a provider and resolve the program.
#[must_use]
pub fn smoke_suite<C>() -> Suite<C>
where
    C: Clone + Send + 'static,
{
    Suite::describe(SMOKE_SUITE).it("Is initialized!", |_ctx| async { Ok(()) })
}
