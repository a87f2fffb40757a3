//! Shared test helpers: an in-memory stand-in for the Godot MCP plugin.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use mcp_probe::client::ProbeClient;
use mcp_probe::config::ProbeConfig;
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Editor state the mock mutates across calls.
#[derive(Debug, Default)]
pub struct GodotState {
    pub scene_open: bool,
    pub actions: BTreeMap<String, Vec<Value>>,
}

pub type SharedState = Arc<Mutex<GodotState>>;

pub const TOOL_NAMES: [&str; 12] = [
    "get_current_scene",
    "godot_editor_get_output",
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

fn text_content(value: Value) -> Value {
    json!({"content": [{"type": "text", "text": value.to_string()}]})
}

fn tool_result(state: &SharedState, name: &str, arguments: &Value) -> Result<Value, (i64, String)> {
    let mut state = state.lock().unwrap();
    let action = arguments
        .get("action_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let result = match name {
        "get_current_scene" if state.scene_open => {
            json!({"path": "res://main.tscn", "name": "Main"})
        }
        "get_current_scene" => json!({"error": "No scene is currently open"}),
        "godot_editor_get_output" => json!({
            "success": true,
            "total_lines": 2,
            "log_path": "user://logs/godot.log",
            "lines": ["Godot Engine v4.3", "MCP server listening"]
        }),
        "godot_project_get_setting" => {
            match arguments.get("setting_name").and_then(Value::as_str) {
                Some("application/config/name") => text_content(json!({"value": "Demo"})),
                _ => json!({"error": "not found"}),
            }
        }
        "godot_project_list_settings" => {
            text_content(json!({"application/config/name": "Demo"}))
        }
        "godot_input_list_actions" => json!({"actions": state.actions.keys().collect::<Vec<_>>()}),
        "godot_input_add_action" => {
            if state.actions.contains_key(&action) {
                json!({"error": format!("Action '{action}' already exists")})
            } else {
                state.actions.insert(action, Vec::new());
                json!({"success": true})
            }
        }
        "godot_input_get_constants" => match arguments.get("type").and_then(Value::as_str) {
            Some("keys") => text_content(json!({"keys": {"KEY_SPACE": 32, "KEY_ENTER": 4194309}})),
            Some("mouse") => text_content(json!({"mouse": {"MOUSE_BUTTON_LEFT": 1}})),
            _ => json!({"error": "unknown constant type"}),
        },
        "godot_input_add_event" => match state.actions.get_mut(&action) {
            Some(events) => {
                events.push(arguments.get("event").cloned().unwrap_or(Value::Null));
                json!({"success": true})
            }
            None => json!({"error": format!("Action '{action}' not found")}),
        },
        "godot_input_get_action" => match state.actions.get(&action) {
            Some(events) => json!({"name": action, "events": events}),
            None => json!({"error": format!("Action '{action}' not found")}),
        },
        "godot_input_remove_action" => match state.actions.remove(&action) {
            Some(_) => json!({"success": true}),
            None => json!({"success": false, "message": format!("Action '{action}' not found")}),
        },
        "godot_input_send_key" | "godot_input_send_mouse_button" => {
            json!({"error": "No running scene to receive input"})
        }
        other => return Err((-32602, format!("Unknown tool: {other}"))),
    };
    Ok(result)
}

/// Responder that answers like the editor plugin does.
pub fn godot_handler(state: SharedState) -> impl Fn(&Request) -> ResponseTemplate + Send + Sync {
    move |request: &Request| {
        let body: Value = request.body_json().unwrap_or_else(|_| json!({}));
        let id = body.get("id").cloned().unwrap_or(Value::Null);
        let method = body.get("method").and_then(Value::as_str).unwrap_or_default();
        let params = body.get("params").cloned().unwrap_or_else(|| json!({}));

        let outcome = match method {
            "initialize" => Ok(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "godot-mcp", "version": "1.0.0"}
            })),
            "tools/list" => Ok(json!({
                "tools": TOOL_NAMES.iter().map(|name| json!({"name": name})).collect::<Vec<_>>()
            })),
            "resources/list" => Ok(json!({"resources": [
                {"uri": "res://main.tscn", "mimeType": "application/x-godot-scene"},
                {"uri": "res://player.gd", "mimeType": "text/x-gdscript"}
            ]})),
            "tools/call" => {
                let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
                let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                tool_result(&state, name, &arguments)
            }
            _ => Err((-32601, "Method not found".to_string())),
        };

        let envelope = match outcome {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, message)) => {
                json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
            }
        };
        ResponseTemplate::new(200).set_body_json(envelope)
    }
}

/// Start a mock plugin and return it with its state.
pub async fn start_godot() -> (MockServer, SharedState) {
    let server = MockServer::start().await;
    let state: SharedState = Arc::new(Mutex::new(GodotState::default()));
    Mock::given(method("POST"))
        .respond_with(godot_handler(state.clone()))
        .mount(&server)
        .await;
    (server, state)
}

pub fn config_for(server: &MockServer) -> ProbeConfig {
    let address = server.address();
    ProbeConfig::builder()
        .host(address.ip().to_string())
        .port(address.port())
        .build()
}

pub fn client_for(server: &MockServer) -> ProbeClient {
    ProbeClient::from_config(&config_for(server)).expect("client should build")
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}
