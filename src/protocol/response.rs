//! Response envelopes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::request::{RequestId, JSONRPC_VERSION};

/// A decoded reply envelope.
///
/// `result` and `error` are kept as raw values: exactly one of them should
/// be present, but enforcing that is the classifier's job, not the decoder's.
/// A present `"result": null` is `Some(Value::Null)`, distinct from absent.
/// The `jsonrpc` tag is kept as whatever the server sent; it plays no part in
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Standard JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RpcResponse {
    pub fn success(result: Value, id: impl Into<RequestId>) -> Self {
        Self {
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            id: serde_json::to_value(id.into()).ok(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(code: i64, message: impl Into<String>, id: impl Into<RequestId>) -> Self {
        let error = RpcError {
            code,
            message: message.into(),
            data: None,
        };
        Self {
            jsonrpc: Some(Value::from(JSONRPC_VERSION)),
            id: serde_json::to_value(id.into()).ok(),
            result: None,
            error: serde_json::to_value(error).ok(),
        }
    }

    /// Whether the echoed id matches `expected`. A missing id never matches.
    pub fn matches_id(&self, expected: &RequestId) -> bool {
        let Some(id) = self.id.as_ref() else {
            return false;
        };
        match (id, expected) {
            (Value::Number(n), RequestId::Number(e)) => n.as_i64() == Some(*e),
            (Value::String(s), RequestId::String(e)) => s == e,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn present_null_result_is_kept() {
        let response: RpcResponse = serde_json::from_value(json!({"result": null, "id": 1})).unwrap();
        assert_eq!(response.result, Some(Value::Null));
        assert_eq!(response.error, None);
    }

    #[test]
    fn missing_members_decode_as_none() {
        let response: RpcResponse = serde_json::from_value(json!({"jsonrpc": "2.0"})).unwrap();
        assert_eq!(response.result, None);
        assert_eq!(response.error, None);
        assert_eq!(response.id, None);
    }

    #[test]
    fn odd_version_tags_still_decode() {
        for tag in [json!(2.0), json!(null), json!({"v": 2})] {
            let response: RpcResponse =
                serde_json::from_value(json!({"jsonrpc": tag, "id": 1, "result": {"tools": []}})).unwrap();
            assert_eq!(response.result, Some(json!({"tools": []})));
            assert_eq!(response.jsonrpc, Some(tag));
        }
    }

    #[test]
    fn id_matching_respects_type() {
        let response = RpcResponse::success(json!({}), 5);
        assert!(response.matches_id(&RequestId::Number(5)));
        assert!(!response.matches_id(&RequestId::Number(6)));
        assert!(!response.matches_id(&RequestId::String("5".into())));
    }

    #[test]
    fn failure_constructor_produces_standard_error_object() {
        let response = RpcResponse::failure(-32601, "Method not found", 5);
        let error: RpcError = serde_json::from_value(response.error.unwrap()).unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found");
    }
}
