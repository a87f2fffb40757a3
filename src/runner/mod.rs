//! Test case and suite runners.

mod step;
mod suite;

pub use step::{
    run_step, Expectation, OutcomeStatus, StepFuture, StepPolicy, TestOutcome, TestStep,
    ToolErrorPolicy, Verdict,
};
pub use suite::{Suite, SuiteSummary};
