mod common;

use mpt_harness::{smoke_suite, Outcome, Provider, TestContext, Workspace};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn is_initialized() {
    let dir = tempfile::tempdir().unwrap();
    common::write_keypair(dir.path(), 11);
    let provider = Provider::bind(common::local_config(dir.path())).unwrap();
    let program = Workspace::default()
        .register::<mpt_harness::MptVerifier>()
        .resolve("AnchorMptDemo")
        .unwrap();

    let suite = smoke_suite::<TestContext>();
    assert_eq!(suite.name(), "anchor-mpt-demo");
    assert_eq!(suite.test_names().collect::<Vec<_>>(), vec!["Is initialized!"]);

    let report = suite.run(TestContext { provider, program }).await;
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Passed);
    assert_eq!((report.passed(), report.failed()), (1, 0));
    assert_eq!(report.summary(), "1 passed, 0 failed");
    assert!(report.is_success());
}
