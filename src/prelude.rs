//! Convenience re-exports for common use.

pub use crate::classify::{Category, Classification};
pub use crate::client::{Exchange, ProbeClient};
pub use crate::config::ProbeConfig;
pub use crate::error::{ProbeError, Result};
pub use crate::protocol::{RpcRequest, RpcResponse};
pub use crate::report::{ConsoleReporter, JsonReporter, Reporter};
pub use crate::runner::{StepPolicy, Suite, SuiteSummary, TestOutcome, TestStep, Verdict};
