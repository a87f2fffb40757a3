//! Request envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProbeError, Result};

/// Protocol version tag stamped on every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Generic method every named tool invocation is wrapped in.
pub const TOOLS_CALL: &str = "tools/call";

/// Correlation id. Servers echo it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A single JSON-RPC request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Map<String, Value>,
    pub id: RequestId,
}

/// Params of a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    fn into_params(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("name".into(), Value::String(self.name));
        params.insert("arguments".into(), Value::Object(self.arguments));
        params
    }
}

impl RpcRequest {
    /// Build a request for `method`.
    ///
    /// `params` may be an object, `null` (empty mapping), or a string that
    /// holds a JSON object.
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<RequestId>) -> Result<Self> {
        let method = method.into();
        if method.trim().is_empty() {
            return Err(ProbeError::InvalidRequest("method must not be empty".into()));
        }
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method,
            params: coerce_params(params)?,
            id: id.into(),
        })
    }

    /// Build a `tools/call` request invoking `name` with `arguments`.
    pub fn tool_call(name: impl Into<String>, arguments: Value, id: impl Into<RequestId>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProbeError::InvalidRequest("tool name must not be empty".into()));
        }
        let call = ToolCall {
            name,
            arguments: coerce_params(arguments)?,
        };
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: TOOLS_CALL.to_string(),
            params: call.into_params(),
            id: id.into(),
        })
    }

    /// Decode the params back into a [`ToolCall`] when this is a `tools/call` request.
    pub fn as_tool_call(&self) -> Option<ToolCall> {
        if self.method != TOOLS_CALL {
            return None;
        }
        serde_json::from_value(Value::Object(self.params.clone())).ok()
    }

    /// Tool name when this is a `tools/call` request.
    pub fn tool_name(&self) -> Option<&str> {
        if self.method != TOOLS_CALL {
            return None;
        }
        self.params.get("name").and_then(Value::as_str)
    }

    /// Human label used in logs: the tool name for tool calls, else the method.
    pub fn label(&self) -> &str {
        self.tool_name().unwrap_or(&self.method)
    }
}

/// Normalize a params/arguments value into a mapping.
pub fn coerce_params(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Map::new());
            }
            let parsed: Value = serde_json::from_str(trimmed).map_err(|e| {
                ProbeError::InvalidRequest(format!("params must be valid JSON: {e}"))
            })?;
            match parsed {
                Value::String(_) => Err(ProbeError::InvalidRequest(
                    "params must be a JSON object; got a string".into(),
                )),
                other => coerce_params(other),
            }
        }
        other => Err(ProbeError::InvalidRequest(format!(
            "params must be a JSON object; got {other}"
        ))),
    }
}
