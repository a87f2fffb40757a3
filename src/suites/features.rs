//! Project settings, input map and input event tools.
//!
//! The input-map steps create `test_action` on the live editor; the cleanup
//! step removes it again so repeated runs start from the same state.

use serde_json::{json, Value};

use crate::client::ProbeClient;
use crate::error::Result;
use crate::runner::{StepPolicy, Suite, TestStep, Verdict};

/// Action created by this suite and removed by its cleanup step.
pub const TEST_ACTION: &str = "test_action";

const FEATURE_TOOLS: [&str; 10] = [
    "godot_project_get_setting",
    "godot_project_list_settings",
    "godot_input_list_actions",
    "godot_input_add_action",
    "godot_input_get_action",
    "godot_input_add_event",
    "godot_input_remove_action",
    "godot_input_get_constants",
    "godot_input_send_key",
    "godot_input_send_mouse_button",
];

const KEY_SPACE: i64 = 32;
const MOUSE_BUTTON_LEFT: i64 = 1;

pub fn features() -> Suite {
    Suite::new("Godot MCP New Features")
        .step(TestStep::new("List tools (feature tools registered)", registered_tools))
        .step(TestStep::tool(
            "Get project name",
            "godot_project_get_setting",
            json!({"setting_name": "application/config/name"}),
            StepPolicy::TOLERATE_TOOL_ERROR,
        ))
        .step(TestStep::tool(
            "List application settings",
            "godot_project_list_settings",
            json!({"prefix": "application/"}),
            StepPolicy::STRICT,
        ))
        .step(TestStep::tool(
            "List input actions",
            "godot_input_list_actions",
            Value::Null,
            StepPolicy::STRICT,
        ))
        // Warns rather than fails when a previous run left the action behind.
        .step(TestStep::tool(
            "Add test action",
            "godot_input_add_action",
            json!({"action_name": TEST_ACTION, "deadzone": 0.5}),
            StepPolicy::TOLERATE_TOOL_ERROR,
        ))
        .step(TestStep::tool(
            "Get key constants",
            "godot_input_get_constants",
            json!({"type": "keys"}),
            StepPolicy::STRICT,
        ))
        .step(TestStep::new("Fetch Space keycode and bind it to test action", add_space_key))
        .step(TestStep::tool(
            "Get test action details",
            "godot_input_get_action",
            json!({"action_name": TEST_ACTION}),
            StepPolicy::STRICT,
        ))
        // Input events only land when a scene is running.
        .step(TestStep::tool(
            "Send Space key press",
            "godot_input_send_key",
            json!({"keycode": KEY_SPACE, "pressed": true}),
            StepPolicy::TOLERATE_TOOL_ERROR,
        ))
        .step(TestStep::tool(
            "Send mouse click",
            "godot_input_send_mouse_button",
            json!({
                "button_index": MOUSE_BUTTON_LEFT,
                "pressed": true,
                "position_x": 100.0,
                "position_y": 100.0
            }),
            StepPolicy::TOLERATE_TOOL_ERROR,
        ))
        .step(TestStep::tool(
            "Get mouse constants",
            "godot_input_get_constants",
            json!({"type": "mouse"}),
            StepPolicy::STRICT,
        ))
        .cleanup(TestStep::tool(
            "Remove test action",
            "godot_input_remove_action",
            json!({"action_name": TEST_ACTION}),
            StepPolicy::TOLERATE_TOOL_ERROR,
        ))
}

async fn registered_tools(client: ProbeClient) -> Result<Verdict> {
    let exchange = client.call("tools/list", Value::Null).await?;
    let result = match StepPolicy::STRICT.require_success(&exchange) {
        Ok(result) => result,
        Err(verdict) => return Ok(verdict),
    };
    let Some(tools) = result.get("tools").and_then(Value::as_array) else {
        return Ok(Verdict::Fail(format!("tools/list result has no tools array: {result}")));
    };

    let names: Vec<&str> = tools
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str))
        .collect();
    let missing: Vec<&str> = FEATURE_TOOLS
        .iter()
        .copied()
        .filter(|tool| !names.contains(tool))
        .collect();

    if missing.is_empty() {
        Ok(Verdict::Pass(format!(
            "Found {} tools, all {} feature tools registered",
            names.len(),
            FEATURE_TOOLS.len()
        )))
    } else {
        Ok(Verdict::Warn(format!(
            "Found {} tools; not registered: {}",
            names.len(),
            missing.join(", ")
        )))
    }
}

/// Fetches the key constants again, reads `KEY_SPACE` out of them and binds
/// it to the test action.
///
/// The step does its own `godot_input_get_constants` call rather than reuse
/// the "Get key constants" reply, so it stays runnable on its own.
async fn add_space_key(client: ProbeClient) -> Result<Verdict> {
    let constants = client
        .call_tool("godot_input_get_constants", json!({"type": "keys"}))
        .await?;
    if let Err(verdict) = StepPolicy::STRICT.require_success(&constants) {
        return Ok(verdict);
    }

    let decoded = constants.classification.embedded_json();
    let keycode = match decoded.lookup(&["keys", "KEY_SPACE"]) {
        Ok(keycode) => keycode.clone(),
        Err(reason) => return Ok(Verdict::Warn(format!("skipped, no Space keycode: {reason}"))),
    };

    let exchange = client
        .call_tool(
            "godot_input_add_event",
            json!({
                "action_name": TEST_ACTION,
                "event": {"type": "key", "keycode": keycode, "pressed": true}
            }),
        )
        .await?;
    Ok(StepPolicy::TOLERATE_TOOL_ERROR.assess(&exchange))
}
