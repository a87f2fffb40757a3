//! Tool-content envelopes: `{"content": [{"type": "text", "text": ...}, ...]}`.

use serde_json::Value;

/// First `{"type": "text"}` block of a content-wrapped result.
pub fn first_text_block(result: &Value) -> Option<&str> {
    result
        .get("content")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))?
        .get("text")?
        .as_str()
}

/// Result of decoding JSON that a tool embedded as text.
///
/// Exactly one of `value` and `diagnostic` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedJson {
    pub value: Option<Value>,
    pub diagnostic: Option<String>,
}

impl EmbeddedJson {
    pub fn decode(result: &Value) -> Self {
        let Some(text) = first_text_block(result) else {
            return Self::unavailable("result has no text content block");
        };
        match serde_json::from_str(text) {
            Ok(value) => Self {
                value: Some(value),
                diagnostic: None,
            },
            Err(e) => Self::unavailable(format!("text content is not JSON: {e}")),
        }
    }

    pub fn unavailable(diagnostic: impl Into<String>) -> Self {
        Self {
            value: None,
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Look up a nested value by path, recording which segment was missing.
    pub fn lookup(&self, path: &[&str]) -> std::result::Result<&Value, String> {
        let mut current = self
            .value
            .as_ref()
            .ok_or_else(|| self.diagnostic.clone().unwrap_or_default())?;
        for segment in path {
            current = current
                .get(segment)
                .ok_or_else(|| format!("embedded JSON has no `{segment}`"))?;
        }
        Ok(current)
    }
}
