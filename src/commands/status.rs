//! Status command implementation

use crate::config::Config;
use serde::{Deserialize, Serialize};

/// Configuration snapshot reported to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub configured: bool,
    pub api_key_set: bool,
    pub parent_page_id: String,
    pub workspace_root: String,
    pub scan_folders: Vec<String>,
}

/// Get integration status. Never touches the network.
pub fn cmd_status(config: &Config) -> StatusInfo {
    StatusInfo {
        configured: config.is_configured(),
        api_key_set: config.api_key_set(),
        parent_page_id: config.redacted_parent_page_id(),
        workspace_root: config.workspace_root.display().to_string(),
        scan_folders: config.scan.folders.clone(),
    }
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 notion-mcp Status\n");
    let configured = if status.configured {
        "✓ Configured"
    } else {
        "✗ Not configured (set NOTION_API_KEY and NOTION_PARENT_PAGE_ID)"
    };
    println!("Notion: {}", configured);
    println!(
        "  API key: {}",
        if status.api_key_set { "set" } else { "Not set" }
    );
    println!("  Parent page: {}", status.parent_page_id);
    println!("\nWorkspace: {}", status.workspace_root);
    println!("Scan folders: {}", status.scan_folders.join(", "));
}
