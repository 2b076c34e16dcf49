//! MCP tool definitions and handlers

use super::types::{ToolDefinition, ToolResult};
use crate::commands::{cmd_scan, cmd_status, cmd_sync};
use crate::config::Config;
use crate::notion::PagePublisher;
use crate::scan::Scanner;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "scan_files".to_string(),
            description: "Scan docs and src folders for all project files".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDefinition {
            name: "sync_to_notion".to_string(),
            description: "Sync all project files to Notion Documentation wiki".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to specific file to sync (optional, syncs all if not provided)"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "get_notion_status".to_string(),
            description: "Check Notion integration status and configuration".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
    ]
}

/// Handle a tool call
pub async fn handle_tool_call(
    name: &str,
    arguments: &Map<String, Value>,
    config: &Config,
    scanner: &Scanner,
    publisher: &dyn PagePublisher,
) -> ToolResult {
    match name {
        "scan_files" => ToolResult::json(&cmd_scan(scanner)),
        "sync_to_notion" => handle_sync(arguments, config, scanner, publisher).await,
        "get_notion_status" => ToolResult::json(&cmd_status(config)),
        _ => {
            debug!("Unknown tool requested: {}", name);
            let mut result = ToolResult::json(&json!({ "error": format!("Unknown tool: {}", name) }));
            result.is_error = Some(true);
            result
        }
    }
}

/// Handle sync_to_notion tool
async fn handle_sync(
    arguments: &Map<String, Value>,
    config: &Config,
    scanner: &Scanner,
    publisher: &dyn PagePublisher,
) -> ToolResult {
    if !config.is_configured() {
        return ToolResult::json(&cmd_sync(config, scanner, publisher, None).await);
    }

    let file_path = match arguments.get("file_path") {
        None | Some(Value::Null) => None,
        Some(Value::String(path)) => Some(path.as_str()),
        Some(_) => {
            return ToolResult::json(&json!({
                "success": false,
                "error": "Invalid parameter: file_path must be a string"
            }))
        }
    };

    ToolResult::json(&cmd_sync(config, scanner, publisher, file_path).await)
}
