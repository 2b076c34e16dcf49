//! Workspace files exposed as MCP resources

use super::types::{McpError, ResourceContents, ResourceDefinition};
use crate::scan::Scanner;
use std::path::{Component, Path};

const FILE_SCHEME: &str = "file://";
const MIME_TYPE: &str = "text/plain";

/// Every scanned file as a `file://` resource
pub fn list_resources(scanner: &Scanner) -> Vec<ResourceDefinition> {
    scanner
        .find_files()
        .into_iter()
        .map(|file| ResourceDefinition {
            uri: format!("{}{}", FILE_SCHEME, file.abs_path),
            name: file.name,
            mime_type: MIME_TYPE.to_string(),
        })
        .collect()
}

/// Read a workspace file by URI.
///
/// Unreadable files yield empty text, like the sync tools.
pub fn read_resource(scanner: &Scanner, uri: &str) -> Result<ResourceContents, McpError> {
    let raw_path = uri
        .strip_prefix(FILE_SCHEME)
        .ok_or_else(|| McpError::invalid_params(format!("Unsupported resource URI: {}", uri)))?;
    let path = Path::new(raw_path);

    let inside_workspace = path.is_absolute()
        && path.starts_with(scanner.root())
        && !path.components().any(|c| matches!(c, Component::ParentDir));
    if !inside_workspace {
        return Err(McpError::invalid_params(format!(
            "Resource is outside the workspace: {}",
            uri
        )));
    }

    Ok(ResourceContents {
        uri: uri.to_string(),
        mime_type: MIME_TYPE.to_string(),
        text: scanner.read_file(path),
    })
}
