//! MCP stdio server implementation

use super::resources::{list_resources, read_resource};
use super::tools::{get_tool_definitions, handle_tool_call};
use super::types::{
    InitializeResult, McpError, McpMessage, McpNotification, McpRequest, McpResponse,
    ServerCapabilities, ServerInfo,
};
use crate::config::Config;
use crate::error::Result;
use crate::notion::{NotionClient, PagePublisher};
use crate::scan::Scanner;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// Protocol versions this server can speak, newest last
const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// MCP Server implementation
pub struct McpServer {
    config: Config,
    scanner: Scanner,
    publisher: Box<dyn PagePublisher>,
}

impl McpServer {
    /// Create a server publishing through the Notion API
    pub fn new(config: Config) -> Result<Self> {
        let publisher = NotionClient::new(&config)?;
        Self::with_publisher(config, Box::new(publisher))
    }

    pub fn with_publisher(config: Config, publisher: Box<dyn PagePublisher>) -> Result<Self> {
        let scanner = Scanner::new(&config)?;
        Ok(Self {
            config,
            scanner,
            publisher,
        })
    }

    /// Run the MCP server loop over stdio
    pub async fn run(&self) -> std::result::Result<(), McpError> {
        info!("MCP server starting on stdio");
        info!("Workspace: {}", self.config.workspace_root.display());
        info!("Notion configured: {}", self.config.is_configured());

        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;

        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC until `reader` is exhausted.
    ///
    /// Requests are handled one at a time, in arrival order.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::result::Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    error!("Received invalid UTF-8: {}", e);
                    Some(McpResponse::error(
                        None,
                        McpError::parse_error(format!("Parse error: invalid UTF-8: {}", e)),
                    ))
                }
            };

            if let Some(response) = response {
                let response_str = serde_json::to_string(&response)?;
                debug!("Sending: {}", response_str);
                writer.write_all(response_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one input line, returning the response to send (if any)
    pub async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            return None;
        }

        debug!("Received: {}", line);

        let message: McpMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                error!("Failed to parse message: {}", e);
                return Some(McpResponse::error(
                    None,
                    McpError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        match message {
            McpMessage::Request(req) => Some(self.handle_request(req).await),
            McpMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            McpMessage::Response(_) => {
                warn!("Unexpected response message received");
                None
            }
        }
    }

    /// Handle an MCP request
    async fn handle_request(&self, request: McpRequest) -> McpResponse {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            return McpResponse::error(
                id,
                McpError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
            );
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": get_tool_definitions() })),
            "tools/call" => self.handle_tools_call(request.params).await,
            "resources/list" => Ok(json!({ "resources": list_resources(&self.scanner) })),
            "resources/read" => self.handle_resources_read(request.params.as_ref()),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            method => Err(McpError::method_not_found(method)),
        };

        match result {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, e),
        }
    }

    /// Handle notifications (fire-and-forget)
    fn handle_notification(&self, notification: McpNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => info!("Request cancelled"),
            _ => debug!("Unknown notification: {}", notification.method),
        }
    }

    fn handle_initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let protocol_version = match requested {
            Some(v) if SUPPORTED_PROTOCOL_VERSIONS.contains(&v) => v,
            _ => SUPPORTED_PROTOCOL_VERSIONS[0],
        };

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: "notion-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        json!(result)
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> std::result::Result<Value, McpError> {
        let params = params.ok_or_else(|| McpError::invalid_params("Missing params"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(McpError::invalid_params("Tool arguments must be an object")),
        };

        debug!("Calling tool: {} with args: {:?}", name, arguments);

        let result = handle_tool_call(
            name,
            &arguments,
            &self.config,
            &self.scanner,
            self.publisher.as_ref(),
        )
        .await;

        Ok(json!(result))
    }

    fn handle_resources_read(&self, params: Option<&Value>) -> std::result::Result<Value, McpError> {
        let uri = params
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::invalid_params("Missing resource uri"))?;

        let contents = read_resource(&self.scanner, uri)?;
        Ok(json!({ "contents": [contents] }))
    }
}
