use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::runner::{SuiteSummary, TestOutcome};

use super::Reporter;

/// One JSON object per line, for machines.
pub struct JsonReporter<W: Write> {
    out: W,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    SuiteStarted {
        suite: &'a str,
        endpoint: &'a str,
        at: DateTime<Utc>,
    },
    Step {
        #[serde(flatten)]
        outcome: &'a TestOutcome,
        passed: bool,
        at: DateTime<Utc>,
    },
    SuiteFinished {
        suite: &'a str,
        passed: usize,
        failed: usize,
        warned: usize,
        at: DateTime<Utc>,
    },
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn suite_started(&mut self, suite: &str, endpoint: &str) -> io::Result<()> {
        self.emit(&Event::SuiteStarted {
            suite,
            endpoint,
            at: Utc::now(),
        })
    }

    fn step_finished(&mut self, outcome: &TestOutcome) -> io::Result<()> {
        self.emit(&Event::Step {
            outcome,
            passed: outcome.passed(),
            at: Utc::now(),
        })
    }

    fn suite_finished(&mut self, suite: &str, summary: &SuiteSummary) -> io::Result<()> {
        self.emit(&Event::SuiteFinished {
            suite,
            passed: summary.passed,
            failed: summary.failed,
            warned: summary.warned,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::OutcomeStatus;
    use serde_json::{json, Value};

    #[test]
    fn writes_one_tagged_object_per_event() {
        let outcome = TestOutcome {
            name: "Invalid method".into(),
            status: OutcomeStatus::Passed,
            diagnostic: "protocol: error -32601: Method not found".into(),
            elapsed_ms: 4,
        };
        let mut summary = SuiteSummary::default();
        summary.record(outcome.clone());

        let mut reporter = JsonReporter::new(Vec::new());
        reporter.suite_started("smoke", "http://localhost:8765/").unwrap();
        reporter.step_finished(&outcome).unwrap();
        reporter.suite_finished("smoke", &summary).unwrap();

        let raw = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<Value> = raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 3);

        assert_eq!(lines[0]["event"], json!("suite_started"));
        assert_eq!(lines[1]["event"], json!("step"));
        assert_eq!(lines[1]["name"], json!("Invalid method"));
        assert_eq!(lines[1]["status"], json!("passed"));
        assert_eq!(lines[1]["passed"], json!(true));
        assert_eq!(lines[2]["event"], json!("suite_finished"));
        assert_eq!(lines[2]["failed"], json!(0));
        assert!(lines[2]["at"].as_str().is_some());
    }
}
