//! Custom error types for notion-mcp

use thiserror::Error;

/// Main error type for notion-mcp operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid file pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Notion API error: {0}")]
    Notion(String),

    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for notion-mcp
pub type Result<T> = std::result::Result<T, Error>;
