//! Basic reachability and protocol checks.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::classify::display_value;
use crate::client::ProbeClient;
use crate::error::Result;
use crate::runner::{StepPolicy, Suite, TestStep, Verdict};

use super::{field_or_na, truncate_chars};

const LISTED_TOOLS: usize = 5;
const LISTED_MIME_TYPES: usize = 5;
const SAMPLE_LINES: usize = 3;
const SAMPLE_LINE_CHARS: usize = 80;

/// Initialize, discovery, a couple of read-only tools, and error handling.
pub fn smoke() -> Suite {
    Suite::new("Godot MCP Server Test Suite")
        .step(TestStep::new("Initialize", initialize))
        .step(TestStep::new("List tools", list_tools))
        .step(TestStep::new("Get current scene", current_scene))
        .step(TestStep::new("List resources", list_resources))
        .step(TestStep::new("Get editor output", editor_output))
        .step(TestStep::call(
            "Invalid method (error handling)",
            "invalid_method",
            json!({}),
            StepPolicy::EXPECT_PROTOCOL_ERROR,
        ))
}

async fn initialize(client: ProbeClient) -> Result<Verdict> {
    let exchange = client.call("initialize", json!({})).await?;
    let result = match StepPolicy::STRICT.require_success(&exchange) {
        Ok(result) => result,
        Err(verdict) => return Ok(verdict),
    };

    let Some(version) = result.get("protocolVersion") else {
        return Ok(Verdict::Fail(format!("initialize result has no protocolVersion: {result}")));
    };
    let server = result.get("serverInfo").cloned().unwrap_or(Value::Null);
    Ok(Verdict::Pass(format!(
        "Protocol version: {}\nServer: {} v{}",
        display_value(version),
        field_or_na(&server, "name"),
        field_or_na(&server, "version"),
    )))
}

async fn list_tools(client: ProbeClient) -> Result<Verdict> {
    let exchange = client.call("tools/list", json!({})).await?;
    let result = match StepPolicy::STRICT.require_success(&exchange) {
        Ok(result) => result,
        Err(verdict) => return Ok(verdict),
    };
    let Some(tools) = result.get("tools").and_then(Value::as_array) else {
        return Ok(Verdict::Fail(format!("tools/list result has no tools array: {result}")));
    };

    let mut lines = vec![format!("Found {} tools:", tools.len())];
    lines.extend(
        tools
            .iter()
            .take(LISTED_TOOLS)
            .map(|tool| format!("  - {}", field_or_na(tool, "name"))),
    );
    if tools.len() > LISTED_TOOLS {
        lines.push(format!("  ... and {} more", tools.len() - LISTED_TOOLS));
    }
    Ok(Verdict::Pass(lines.join("\n")))
}

async fn current_scene(client: ProbeClient) -> Result<Verdict> {
    let exchange = client.call_tool("get_current_scene", json!({})).await?;
    // No open scene is a valid editor state.
    let result = match StepPolicy::TOLERATE_TOOL_ERROR.require_success(&exchange) {
        Ok(result) => result,
        Err(Verdict::Warn(diagnostic)) => {
            return Ok(Verdict::Warn(format!("No scene open\n{diagnostic}")))
        }
        Err(verdict) => return Ok(verdict),
    };
    Ok(Verdict::Pass(format!(
        "Scene: {}\nName: {}",
        field_or_na(result, "path"),
        field_or_na(result, "name"),
    )))
}

async fn list_resources(client: ProbeClient) -> Result<Verdict> {
    let exchange = client.call("resources/list", json!({})).await?;
    let result = match StepPolicy::STRICT.require_success(&exchange) {
        Ok(result) => result,
        Err(verdict) => return Ok(verdict),
    };
    let Some(resources) = result.get("resources").and_then(Value::as_array) else {
        return Ok(Verdict::Fail(format!(
            "resources/list result has no resources array: {result}"
        )));
    };

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for resource in resources {
        let mime = resource
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        *by_type.entry(mime.to_string()).or_default() += 1;
    }

    let mut lines = vec![format!("Found {} resources", resources.len())];
    if !by_type.is_empty() {
        lines.push("Types:".to_string());
        lines.extend(
            by_type
                .iter()
                .take(LISTED_MIME_TYPES)
                .map(|(mime, count)| format!("  - {mime}: {count}")),
        );
    }
    Ok(Verdict::Pass(lines.join("\n")))
}

async fn editor_output(client: ProbeClient) -> Result<Verdict> {
    let exchange = client
        .call_tool("godot_editor_get_output", json!({"max_lines": 20}))
        .await?;
    // The tool exists but may have no log yet.
    let result = match StepPolicy::TOLERATE_TOOL_ERROR.require_success(&exchange) {
        Ok(result) => result,
        Err(verdict) => return Ok(verdict),
    };

    let mut lines = vec![
        format!("Total lines: {}", result.get("total_lines").and_then(Value::as_u64).unwrap_or(0)),
        format!("Log path: {}", field_or_na(result, "log_path")),
    ];
    let sample: Vec<&str> = result
        .get("lines")
        .and_then(Value::as_array)
        .map(|lines| lines.iter().filter_map(Value::as_str).take(SAMPLE_LINES).collect())
        .unwrap_or_default();
    if !sample.is_empty() {
        lines.push(format!("Sample (first {} lines):", sample.len()));
        lines.extend(
            sample
                .into_iter()
                .map(|line| format!("  {}", truncate_chars(line, SAMPLE_LINE_CHARS))),
        );
    }
    let report = lines.join("\n");
    if result.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(Verdict::Pass(report))
    } else {
        Ok(Verdict::Warn(format!("reply did not report success: true\n{report}")))
    }
}
