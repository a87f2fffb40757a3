//! Rendering of outcomes. Runners emit values, reporters decide how they look.

mod console;
mod json;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

use std::io;

use crate::runner::{SuiteSummary, TestOutcome};

/// Receives the outcome stream of a suite run.
pub trait Reporter {
    fn suite_started(&mut self, suite: &str, endpoint: &str) -> io::Result<()>;

    fn step_finished(&mut self, outcome: &TestOutcome) -> io::Result<()>;

    fn suite_finished(&mut self, suite: &str, summary: &SuiteSummary) -> io::Result<()>;
}

/// Every reporter sees every event; the first write error is returned.
impl Reporter for Vec<Box<dyn Reporter>> {
    fn suite_started(&mut self, suite: &str, endpoint: &str) -> io::Result<()> {
        fan_out(self, |reporter| reporter.suite_started(suite, endpoint))
    }

    fn step_finished(&mut self, outcome: &TestOutcome) -> io::Result<()> {
        fan_out(self, |reporter| reporter.step_finished(outcome))
    }

    fn suite_finished(&mut self, suite: &str, summary: &SuiteSummary) -> io::Result<()> {
        fan_out(self, |reporter| reporter.suite_finished(suite, summary))
    }
}

fn fan_out(
    reporters: &mut [Box<dyn Reporter>],
    mut emit: impl FnMut(&mut dyn Reporter) -> io::Result<()>,
) -> io::Result<()> {
    let mut first_error = None;
    for reporter in reporters.iter_mut() {
        if let Err(e) = emit(reporter.as_mut()) {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
