use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use mpt_harness::{Outcome, Suite};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

type Log = Arc<Mutex<Vec<&'static str>>>;

#[tokio::test]
async fn runs_tests_in_registration_order() {
    let log = Log::default();
    let suite = Suite::describe("order")
        .it("first", |log: Log| async move {
            log.lock().unwrap().push("first");
            Ok(())
        })
        .it("second", |log: Log| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            log.lock().unwrap().push("second");
            Ok(())
        })
        .it("third", |log: Log| async move {
            log.lock().unwrap().push("third");
            Ok(())
        });

    let report = suite.run(log.clone()).await;
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    assert_eq!(report.passed(), 3);
}

#[tokio::test]
async fn classifies_outcomes() {
    let suite = Suite::describe("outcomes")
        .timeout(Duration::from_millis(50))
        .it("passes", |()| async { Ok(()) })
        .it("panics", |()| async {
            assert_eq!(1 + 1, 3, "arithmetic is broken");
            Ok(())
        })
        .it("errors", |()| async {
            Err(eyre::eyre!("inner").wrap_err("outer"))
        })
        .it("hangs", |()| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .it("still runs", |()| async { Ok(()) });

    let report = suite.run(()).await;
    let outcomes: Vec<_> = report.results.iter().map(|r| &r.outcome).collect();

    assert_eq!(outcomes[0], &Outcome::Passed);
    assert!(matches!(
        outcomes[1],
        Outcome::Failed { message } if message.contains("arithmetic is broken")
    ));
    assert_eq!(
        outcomes[2],
        &Outcome::Errored {
            message: "outer: inner".to_string()
        }
    );
    assert_eq!(outcomes[3], &Outcome::TimedOut(Duration::from_millis(50)));
    assert_eq!(outcomes[4], &Outcome::Passed);

    assert_eq!((report.passed(), report.failed()), (2, 3));
    assert_eq!(report.summary(), "2 passed, 3 failed");
    assert!(!report.is_success());
    assert!(report.render().contains("hangs"));
}

#[tokio::test]
async fn cancellation_stops_the_run() {
    let cancel = CancellationToken::new();
    let suite = Suite::describe("cancel")
        .it("cancels", |cancel: CancellationToken| async move {
            cancel.cancel();
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .it("never starts", |_| async { Ok(()) });

    let report = suite.run_with_cancel(cancel.clone(), cancel).await;
    let outcomes: Vec<_> = report.results.iter().map(|r| r.outcome.clone()).collect();
    assert_eq!(outcomes, vec![Outcome::Cancelled, Outcome::Cancelled]);
    assert_eq!(report.summary(), "0 passed, 0 failed, 2 cancelled");
}

#[tokio::test]
async fn empty_suite_succeeds() {
    let report = Suite::<()>::describe("empty").run(()).await;
    assert!(report.is_success());
    assert_eq!(report.summary(), "0 passed, 0 failed");
}

#[test]
fn suites_describe_themselves_for_any_context() {
    struct Unshared;

    let suite = Suite::<Unshared>::describe("listing").timeout(Duration::from_secs(1));
    let debug = format!("{suite:?}");
    assert!(debug.contains("listing"), "{debug}");
    assert_eq!(suite.test_names().count(), 0);

    let suite = Suite::describe("named")
        .it("alpha", |()| async { Ok(()) })
        .it("beta", |()| async { Ok(()) });
    assert_eq!(suite.name(), "named");
    assert_eq!(suite.test_names().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    assert!(format!("{suite:?}").contains("beta"));
}
