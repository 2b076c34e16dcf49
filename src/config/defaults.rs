//! Default values for configuration

use std::path::PathBuf;

/// Top-level workspace folders searched for project files
pub fn default_scan_folders() -> Vec<String> {
    vec!["docs".to_string(), "src".to_string()]
}

/// File name globs collected from the scan folders
pub fn default_file_patterns() -> Vec<String> {
    [
        "*.md", "*.py", "*.js", "*.ts", "*.tsx", "*.json", "*.yaml", "*.yml", "*.txt",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

/// Folder holding the server's own files, never published
pub fn default_reserved_folder() -> String {
    "notion-mcp".to_string()
}

/// Notion REST API base URL
pub fn default_notion_api_url() -> String {
    "https://api.notion.com/v1".to_string()
}

/// Value sent in the `Notion-Version` header
pub fn default_notion_version() -> String {
    "2025-09-03".to_string()
}

/// Page creation request timeout in seconds
pub fn default_notion_timeout_secs() -> u64 {
    10
}

/// Workspace root when `WORKSPACE_ROOT` is not set
pub fn default_workspace_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
