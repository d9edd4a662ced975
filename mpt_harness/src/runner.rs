//! A small `describe`/`it` style runner for async integration tests.
//!
//! Every test body receives a clone of the suite context and runs in its own tokio task, so a
//! panicking assertion fails only that test. Tests run one after another in registration
//! order. A [`CancellationToken`] stops the run; the test in flight is aborted and the rest
//! are reported as cancelled.
use std::{
    any::Any,
    fmt::{self, Display, Formatter},
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use colored::Colorize;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type TestBody<C> = Arc<dyn Fn(C) -> BoxFuture<'static, eyre::Result<()>> + Send + Sync>;

struct TestCase<C> {
    name: String,
    body: TestBody<C>,
}

pub struct Suite<C> {
    name: String,
    timeout: Option<Duration>,
    tests: Vec<TestCase<C>>,
}

impl<C> fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("tests", &self.test_names().collect::<Vec<_>>())
            .finish()
    }
}

impl<C> Suite<C> {
    #[must_use]
    pub fn describe(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout: None,
            tests: Vec::new(),
        }
    }

    /// Limits how long each test may run.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|test| test.name.as_str())
    }
}

impl<C> Suite<C>
where
    C: Clone + Send + 'static,
{
    #[must_use]
    pub fn it<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = eyre::Result<()>> + Send + 'static,
    {
        self.tests.push(TestCase {
            name: name.into(),
            body: Arc::new(move |ctx| Box::pin(body(ctx))),
        });
        self
    }

    pub async fn run(&self, ctx: C) -> SuiteReport {
        self.run_with_cancel(ctx, CancellationToken::new()).await
    }

    pub async fn run_with_cancel(&self, ctx: C, cancel: CancellationToken) -> SuiteReport {
        info!(suite = %self.name, tests = self.tests.len(), "running suite");
        let mut results = Vec::with_capacity(self.tests.len());

        for test in &self.tests {
            let started = Instant::now();
            let outcome = if cancel.is_cancelled() {
                Outcome::Cancelled
            } else {
                self.run_test(test, ctx.clone(), &cancel).await
            };
            let duration = started.elapsed();

            if outcome.is_failure() {
                warn!(suite = %self.name, test = %test.name, %outcome, "test failed");
            } else {
                info!(suite = %self.name, test = %test.name, %outcome, ?duration, "test finished");
            }
            results.push(TestResult {
                name: test.name.clone(),
                outcome,
                duration,
            });
        }

        SuiteReport {
            suite: self.name.clone(),
            results,
        }
    }

    async fn run_test(&self, test: &TestCase<C>, ctx: C, cancel: &CancellationToken) -> Outcome {
        let handle = tokio::spawn((test.body)(ctx));
        let abort = handle.abort_handle();
        let limit = self.timeout;

        let finished = async move {
            let joined = match limit {
                Some(limit) => match tokio::time::timeout(limit, handle).await {
                    Ok(joined) => joined,
                    Err(_) => return Outcome::TimedOut(limit),
                },
                None => handle.await,
            };
            match joined {
                Ok(Ok(())) => Outcome::Passed,
                Ok(Err(report)) => Outcome::Errored {
                    message: format!("{report:#}"),
                },
                Err(error) if error.is_panic() => Outcome::Failed {
                    message: panic_message(error.into_panic()),
                },
                Err(_) => Outcome::Cancelled,
            }
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Outcome::Cancelled,
            outcome = finished => outcome,
        };
        // Dropping a join handle detaches the task.
        abort.abort();
        outcome
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// The body panicked.
    Failed { message: String },
    /// The body returned an error.
    Errored { message: String },
    TimedOut(Duration),
    Cancelled,
}

impl Outcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::Failed { .. } | Outcome::Errored { .. } | Outcome::TimedOut(_)
        )
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => f.write_str("passed"),
            Outcome::Failed { message } => write!(f, "failed: {message}"),
            Outcome::Errored { message } => write!(f, "errored: {message}"),
            Outcome::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
            Outcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub name: String,
    pub outcome: Outcome,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub suite: String,
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|outcome| *outcome == Outcome::Passed)
    }

    /// Tests that panicked, errored or timed out.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.count(|outcome| *outcome == Outcome::Cancelled)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.passed() == self.results.len()
    }

    fn count(&self, filter: impl Fn(&Outcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|result| filter(&result.outcome))
            .count()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!("{} passed, {} failed", self.passed(), self.failed());
        if self.cancelled() > 0 {
            summary.push_str(&format!(", {} cancelled", self.cancelled()));
        }
        summary
    }

    /// One line per test followed by the summary, coloured for a terminal.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.suite.bold());
        for result in &self.results {
            let line = match &result.outcome {
                Outcome::Passed => format!(
                    "  {} {} ({}ms)",
                    "✔".green(),
                    result.name,
                    result.duration.as_millis()
                ),
                Outcome::Cancelled => format!("  {} {}", "-".yellow(), result.name.dimmed()),
                failure => format!("  {} {}: {}", "✘".red(), result.name, failure),
            };
            out.push_str(&line);
            out.push('\n');
        }
        let summary = self.summary();
        if self.is_success() {
            out.push_str(&summary.green().to_string());
        } else {
            out.push_str(&summary.red().to_string());
        }
        out
    }
}
