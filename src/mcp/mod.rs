//! MCP (Model Context Protocol) server implementation
//!
//! Exposes the scan and sync tools over stdio for editor integration.

mod resources;
mod server;
mod tools;
mod types;

pub use resources::{list_resources, read_resource};
pub use server::McpServer;
pub use tools::{get_tool_definitions, handle_tool_call};
pub use types::{McpError, McpRequest, McpResponse, ToolResult};
