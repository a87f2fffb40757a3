use std::io::{self, Write};

use crate::runner::{OutcomeStatus, SuiteSummary, TestOutcome};

use super::Reporter;

/// Streaming plain-text output.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn mark(status: OutcomeStatus) -> &'static str {
    match status {
        OutcomeStatus::Passed => "✓",
        OutcomeStatus::Warned => "⚠",
        OutcomeStatus::Failed | OutcomeStatus::Crashed => "✗",
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn suite_started(&mut self, suite: &str, endpoint: &str) -> io::Result<()> {
        writeln!(self.out, "=== {suite} ===")?;
        writeln!(self.out, "Testing server at: {endpoint}")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn step_finished(&mut self, outcome: &TestOutcome) -> io::Result<()> {
        writeln!(self.out, "{} {}", mark(outcome.status), outcome.name)?;
        for line in outcome.diagnostic.lines() {
            writeln!(self.out, "  {line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn suite_finished(&mut self, suite: &str, summary: &SuiteSummary) -> io::Result<()> {
        writeln!(self.out, "=== {suite} complete ===")?;
        if summary.warned > 0 {
            writeln!(self.out, "Passed: {} ({} with warnings)", summary.passed, summary.warned)?;
        } else {
            writeln!(self.out, "Passed: {}", summary.passed)?;
        }
        writeln!(self.out, "Failed: {}", summary.failed)?;
        writeln!(self.out)?;
        if !summary.all_passed() {
            writeln!(self.out, "Note: Some tests may fail if no scene is open in Godot.")?;
            writeln!(self.out, "Open a scene in the Godot editor and run this again.")?;
            writeln!(self.out)?;
        }
        self.out.flush()
    }
}
