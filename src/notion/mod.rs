//! Notion publishing
//!
//! A [`PagePublisher`] turns file content into a new Notion page. Publishing
//! never fails with an error: every outcome, including missing credentials
//! and transport failures, is reported as a [`PublishResult`].

mod blocks;
mod client;

pub use blocks::{paragraph_blocks, Block, MAX_BLOCKS, MAX_LINES, MAX_LINE_CHARS};
pub use client::NotionClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message returned when publishing without credentials
pub const CREDENTIALS_NOT_SET: &str = "Notion credentials not set";

/// Outcome of a single page creation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishResult {
    pub fn created(page_id: Option<String>, page_url: Option<String>) -> Self {
        Self {
            success: true,
            page_id,
            page_url,
            message: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            page_id: None,
            page_url: None,
            message: None,
            error: Some(error.into()),
        }
    }

    pub fn not_configured() -> Self {
        Self {
            success: false,
            page_id: None,
            page_url: None,
            message: Some(CREDENTIALS_NOT_SET.to_string()),
            error: None,
        }
    }
}

/// Something that can create documentation pages
#[async_trait]
pub trait PagePublisher: Send + Sync {
    /// Create one page titled `title` from `content`.
    ///
    /// `source_path` identifies the originating file for logging.
    async fn create_page(&self, title: &str, content: &str, source_path: &str) -> PublishResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_result_json() {
        assert_eq!(
            serde_json::to_value(PublishResult::created(
                Some("abc".to_string()),
                Some("https://notion.so/abc".to_string())
            ))
            .unwrap(),
            json!({"success": true, "page_id": "abc", "page_url": "https://notion.so/abc"})
        );
        assert_eq!(
            serde_json::to_value(PublishResult::not_configured()).unwrap(),
            json!({"success": false, "message": "Notion credentials not set"})
        );
        assert_eq!(
            serde_json::to_value(PublishResult::failed("timed out")).unwrap(),
            json!({"success": false, "error": "timed out"})
        );
    }
}
