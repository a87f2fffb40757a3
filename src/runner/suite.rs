//! Ordered execution of test steps.

use serde::Serialize;
use tracing::{info, warn};

use crate::client::ProbeClient;
use crate::report::Reporter;

use super::step::{run_step, OutcomeStatus, TestOutcome, TestStep};

/// Aggregate of a run. `passed + failed` always equals `outcomes.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    /// Subset of `passed` that carried a warning.
    pub warned: usize,
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteSummary {
    pub fn record(&mut self, outcome: TestOutcome) {
        if outcome.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        if outcome.status == OutcomeStatus::Warned {
            self.warned += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Fold another summary into this one, keeping order.
    pub fn merge(&mut self, other: SuiteSummary) {
        for outcome in other.outcomes {
            self.record(outcome);
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: 0 iff nothing failed.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

/// Named, ordered list of steps. Cleanup steps run after every regular step,
/// whatever happened before them.
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    steps: Vec<TestStep>,
    cleanup: Vec<TestStep>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            cleanup: Vec::new(),
        }
    }

    pub fn step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn cleanup(mut self, step: TestStep) -> Self {
        self.cleanup.push(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of steps including cleanup.
    pub fn len(&self) -> usize {
        self.steps.len() + self.cleanup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .chain(&self.cleanup)
            .map(TestStep::name)
            .collect()
    }

    /// Run every step in declaration order, then the cleanup steps.
    ///
    /// A failing step never stops the sequence. Reporter write failures are
    /// logged and otherwise ignored.
    pub async fn run(&self, client: &ProbeClient, reporter: &mut dyn Reporter) -> SuiteSummary {
        info!(suite = %self.name, endpoint = %client.endpoint(), steps = self.len(), "suite started");
        report(reporter.suite_started(&self.name, client.endpoint()));

        let mut summary = SuiteSummary::default();
        for step in self.steps.iter().chain(&self.cleanup) {
            let outcome = run_step(step, client).await;
            report(reporter.step_finished(&outcome));
            summary.record(outcome);
        }

        info!(
            suite = %self.name,
            passed = summary.passed,
            failed = summary.failed,
            "suite finished"
        );
        report(reporter.suite_finished(&self.name, &summary));
        summary
    }
}

fn report(result: std::io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "reporter write failed");
    }
}
