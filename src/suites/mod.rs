//! Built-in step scripts for the Godot MCP editor plugin.

mod features;
mod smoke;

pub use features::{features, TEST_ACTION};
pub use smoke::smoke;

use serde_json::Value;

/// Cut `text` to at most `max` characters, on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// `value[key]` as display text, or `N/A`.
pub(crate) fn field_or_na(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}
