//! Response classification.
//!
//! Every exchange lands in exactly one of four categories. The layers are
//! checked outside-in, and an outer failure always hides whatever the inner
//! layers might have said:
//!
//! 1. `transport_error`: no envelope came back at all.
//! 2. `protocol_error`: the envelope carries `error`, or carries neither
//!    `error` nor `result`.
//! 3. `tool_error`: the envelope succeeded but the tool's own result reports
//!    failure (`error` member, `success: false`, or MCP `isError: true`).
//! 4. `success`.

mod content;

pub use content::{first_text_block, EmbeddedJson};

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::TransportFailure;
use crate::protocol::RpcError;
use crate::transport::ExchangeResult;

/// The four outcome categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    TransportError,
    ProtocolError,
    ToolError,
    Success,
}

impl Category {
    /// Name of the layer that produced this category, used as diagnostic prefix.
    pub fn layer(self) -> &'static str {
        match self {
            Self::TransportError => "transport",
            Self::ProtocolError => "protocol",
            Self::ToolError => "tool",
            Self::Success => "success",
        }
    }
}

/// Why the envelope itself failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolFault {
    /// Standard `{code, message}` error object.
    Rpc(RpcError),
    /// An `error` member that is not a standard error object.
    NonStandard(Value),
    /// Neither `result` nor `error` present.
    MissingOutcome,
}

/// Why the tool reported failure inside a successful envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolFault {
    /// The result carries an `error` member; holds its value.
    Error(Value),
    /// The result carries `success: false`; holds the whole result.
    Unsuccessful(Value),
    /// MCP-style `isError: true`; holds the first text block, or the whole
    /// result when there is none.
    Flagged(Value),
}

impl ToolFault {
    pub fn payload(&self) -> &Value {
        match self {
            Self::Error(value) | Self::Unsuccessful(value) | Self::Flagged(value) => value,
        }
    }
}

/// Classified outcome of one exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    TransportError(TransportFailure),
    ProtocolError(ProtocolFault),
    ToolError(ToolFault),
    Success(Value),
}

/// Classify a transport outcome. Never panics, never returns more than one
/// category.
pub fn classify(outcome: ExchangeResult) -> Classification {
    let envelope = match outcome {
        Ok(envelope) => envelope,
        Err(failure) => return Classification::TransportError(failure),
    };

    if let Some(error) = envelope.error {
        return Classification::ProtocolError(match serde_json::from_value::<RpcError>(error.clone()) {
            Ok(rpc) => ProtocolFault::Rpc(rpc),
            Err(_) => ProtocolFault::NonStandard(error),
        });
    }

    match envelope.result {
        Some(result) => classify_result(result),
        None => Classification::ProtocolError(ProtocolFault::MissingOutcome),
    }
}

fn classify_result(result: Value) -> Classification {
    let Some(fields) = result.as_object() else {
        return Classification::Success(result);
    };

    if let Some(error) = fields.get("error") {
        return Classification::ToolError(ToolFault::Error(error.clone()));
    }
    if fields.get("success") == Some(&Value::Bool(false)) {
        return Classification::ToolError(ToolFault::Unsuccessful(result));
    }
    if fields.get("isError") == Some(&Value::Bool(true)) {
        let detail = first_text_block(&result)
            .map(|text| Value::String(text.to_string()))
            .unwrap_or_else(|| result.clone());
        return Classification::ToolError(ToolFault::Flagged(detail));
    }

    Classification::Success(result)
}

impl Classification {
    pub fn category(&self) -> Category {
        match self {
            Self::TransportError(_) => Category::TransportError,
            Self::ProtocolError(_) => Category::ProtocolError,
            Self::ToolError(_) => Category::ToolError,
            Self::Success(_) => Category::Success,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The value relevant to this outcome: the result on success, the nested
    /// error for tool and protocol failures, nothing for transport failures
    /// or envelopes missing both members.
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::TransportError(_) => None,
            Self::ProtocolError(ProtocolFault::Rpc(error)) => serde_json::to_value(error).ok(),
            Self::ProtocolError(ProtocolFault::NonStandard(value)) => Some(value.clone()),
            Self::ProtocolError(ProtocolFault::MissingOutcome) => None,
            Self::ToolError(fault) => Some(fault.payload().clone()),
            Self::Success(value) => Some(value.clone()),
        }
    }

    /// The JSON-RPC error object, when the envelope carried a standard one.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            Self::ProtocolError(ProtocolFault::Rpc(error)) => Some(error),
            _ => None,
        }
    }

    /// Successful result, if any.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// First text block of a successful content-wrapped result.
    pub fn text_content(&self) -> Option<&str> {
        self.result().and_then(first_text_block)
    }

    /// Best-effort decode of JSON embedded in the first text block.
    pub fn embedded_json(&self) -> EmbeddedJson {
        match self {
            Self::Success(result) => EmbeddedJson::decode(result),
            other => EmbeddedJson::unavailable(format!(
                "no result to decode ({})",
                other.category()
            )),
        }
    }

    /// Human-readable line naming the layer that decided the outcome.
    pub fn diagnostic(&self) -> String {
        let layer = self.category().layer();
        match self {
            Self::TransportError(failure) => format!("{layer}: {failure}"),
            Self::ProtocolError(ProtocolFault::Rpc(error)) => {
                format!("{layer}: error {}: {}", error.code, error.message)
            }
            Self::ProtocolError(ProtocolFault::NonStandard(value)) => {
                format!("{layer}: non-standard error member: {value}")
            }
            Self::ProtocolError(ProtocolFault::MissingOutcome) => {
                format!("{layer}: malformed envelope, neither `result` nor `error` present")
            }
            Self::ToolError(ToolFault::Error(value)) => format!("{layer}: {}", display_value(value)),
            Self::ToolError(ToolFault::Unsuccessful(result)) => {
                match result.get("message").or_else(|| result.get("error_message")) {
                    Some(message) => format!("{layer}: success=false: {}", display_value(message)),
                    None => format!("{layer}: success=false"),
                }
            }
            Self::ToolError(ToolFault::Flagged(value)) => {
                format!("{layer}: isError: {}", display_value(value))
            }
            Self::Success(_) => layer.to_string(),
        }
    }
}

/// Strings render bare, everything else as compact JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
