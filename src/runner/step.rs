//! A single named test step and the failure boundary around it.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::warn;

use crate::classify::{Classification, ProtocolFault};
use crate::client::{Exchange, ProbeClient};
use crate::error::Result;

/// Future returned by a step body.
pub type StepFuture = BoxFuture<'static, Result<Verdict>>;

type StepBody = Arc<dyn Fn(ProbeClient) -> StepFuture + Send + Sync>;

/// What a step concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass(String),
    /// Counts as a pass; the step ran but observed a domain condition.
    Warn(String),
    Fail(String),
}

/// What a step expects the envelope to look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Success,
    /// A standard JSON-RPC error object is the passing outcome.
    ProtocolError,
}

/// How a step treats a tool reporting failure inside a good envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorPolicy {
    Fail,
    Warn,
}

/// Per-step declaration of which outcomes pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    pub expect: Expectation,
    pub on_tool_error: ToolErrorPolicy,
}

impl StepPolicy {
    /// Only `success` passes.
    pub const STRICT: Self = Self {
        expect: Expectation::Success,
        on_tool_error: ToolErrorPolicy::Fail,
    };

    /// `success` passes, `tool_error` passes with a warning.
    pub const TOLERATE_TOOL_ERROR: Self = Self {
        expect: Expectation::Success,
        on_tool_error: ToolErrorPolicy::Warn,
    };

    /// Only a standard JSON-RPC error object passes.
    pub const EXPECT_PROTOCOL_ERROR: Self = Self {
        expect: Expectation::ProtocolError,
        on_tool_error: ToolErrorPolicy::Fail,
    };

    pub fn assess(&self, exchange: &Exchange) -> Verdict {
        let diagnostic = exchange.diagnostic();
        match (self.expect, &exchange.classification) {
            (Expectation::Success, Classification::Success(_)) => Verdict::Pass(diagnostic),
            (Expectation::Success, Classification::ToolError(_)) => match self.on_tool_error {
                ToolErrorPolicy::Fail => Verdict::Fail(diagnostic),
                ToolErrorPolicy::Warn => Verdict::Warn(diagnostic),
            },
            (Expectation::Success, _) => Verdict::Fail(diagnostic),
            (Expectation::ProtocolError, Classification::ProtocolError(ProtocolFault::Rpc(_))) => {
                Verdict::Pass(diagnostic)
            }
            (Expectation::ProtocolError, _) => {
                Verdict::Fail(format!("expected a protocol error, got {diagnostic}"))
            }
        }
    }

    /// The successful result, or the verdict to return early with.
    ///
    /// Steps that need to look inside a result use this so that the
    /// non-success paths still follow the declared policy.
    pub fn require_success<'a>(&self, exchange: &'a Exchange) -> std::result::Result<&'a Value, Verdict> {
        match exchange.classification.result() {
            Some(result) if self.expect == Expectation::Success => Ok(result),
            _ => Err(self.assess(exchange)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Warned,
    Failed,
    /// The step returned an error or panicked.
    Crashed,
}

/// Record of one executed step. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    pub name: String,
    pub status: OutcomeStatus,
    pub diagnostic: String,
    pub elapsed_ms: u64,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Passed | OutcomeStatus::Warned)
    }
}

/// A named, reusable test procedure.
#[derive(Clone)]
pub struct TestStep {
    name: String,
    body: StepBody,
}

impl std::fmt::Debug for TestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestStep").field("name", &self.name).finish()
    }
}

impl TestStep {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(ProbeClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Verdict>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(move |client| body(client).boxed()),
        }
    }

    /// One generic method call judged by `policy`.
    pub fn call(
        name: impl Into<String>,
        method: impl Into<String>,
        params: Value,
        policy: StepPolicy,
    ) -> Self {
        let method = method.into();
        Self::new(name, move |client: ProbeClient| {
            let method = method.clone();
            let params = params.clone();
            async move {
                let exchange = client.call(&method, params).await?;
                Ok(policy.assess(&exchange))
            }
        })
    }

    /// One tool invocation judged by `policy`.
    pub fn tool(
        name: impl Into<String>,
        tool: impl Into<String>,
        arguments: Value,
        policy: StepPolicy,
    ) -> Self {
        let tool = tool.into();
        Self::new(name, move |client: ProbeClient| {
            let tool = tool.clone();
            let arguments = arguments.clone();
            async move {
                let exchange = client.call_tool(&tool, arguments).await?;
                Ok(policy.assess(&exchange))
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Run one step inside a failure boundary. Never panics, never errors.
pub async fn run_step(step: &TestStep, client: &ProbeClient) -> TestOutcome {
    let started = Instant::now();
    let body = Arc::clone(&step.body);
    let client = client.clone();

    let result = AssertUnwindSafe(async move { body(client).await })
        .catch_unwind()
        .await;

    let (status, diagnostic) = match result {
        Ok(Ok(Verdict::Pass(diagnostic))) => (OutcomeStatus::Passed, diagnostic),
        Ok(Ok(Verdict::Warn(diagnostic))) => (OutcomeStatus::Warned, diagnostic),
        Ok(Ok(Verdict::Fail(diagnostic))) => (OutcomeStatus::Failed, diagnostic),
        Ok(Err(e)) => {
            warn!(step = %step.name, error = %e, "step returned an error");
            let diagnostic = match e.category() {
                Some(category) => format!("step crashed: {}: {e}", category.layer()),
                None => format!("step crashed: {e}"),
            };
            (OutcomeStatus::Crashed, diagnostic)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(step = %step.name, panic = %message, "step panicked");
            (OutcomeStatus::Crashed, format!("step crashed: {message}"))
        }
    };

    TestOutcome {
        name: step.name.clone(),
        status,
        diagnostic,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = panic.downcast_ref::<String>() {
        return message.clone();
    }
    "panic with non-string payload".to_string()
}
