//! Sync command implementation
//!
//! Publishes either one named file or every scanned file. Pages are always
//! created fresh; syncing twice produces duplicate pages.

use crate::config::Config;
use crate::notion::{PagePublisher, PublishResult};
use crate::scan::Scanner;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Returned when publishing is requested without credentials
pub const CREDENTIALS_NOT_CONFIGURED: &str = "Notion credentials not configured. Set NOTION_API_KEY and NOTION_PARENT_PAGE_ID environment variables.";

/// Result of a sync request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SyncResponse {
    /// Rejected before any page was created
    Failed(SyncFailure),
    /// A single named file was published
    Page(PublishResult),
    /// Every scanned file was published
    Batch(SyncBatch),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub success: bool,
    pub error: String,
}

/// Outcome of a full sync.
///
/// `success` is true even when individual pages failed; check each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBatch {
    pub success: bool,
    pub synced: usize,
    pub results: Vec<FileSyncResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSyncResult {
    /// Path relative to the workspace root
    pub file: String,
    pub result: PublishResult,
}

impl SyncResponse {
    fn failed(error: impl Into<String>) -> Self {
        SyncResponse::Failed(SyncFailure {
            success: false,
            error: error.into(),
        })
    }

    /// Number of pages that failed to publish
    pub fn failures(&self) -> usize {
        match self {
            SyncResponse::Failed(_) => 1,
            SyncResponse::Page(result) => usize::from(!result.success),
            SyncResponse::Batch(batch) => batch
                .results
                .iter()
                .filter(|r| !r.result.success)
                .count(),
        }
    }
}

/// Sync one file (when `file_path` is non-empty) or the whole workspace
pub async fn cmd_sync(
    config: &Config,
    scanner: &Scanner,
    publisher: &dyn PagePublisher,
    file_path: Option<&str>,
) -> SyncResponse {
    cmd_sync_with_progress(config, scanner, publisher, file_path, |_, _| {}).await
}

/// Like [`cmd_sync`], calling `on_file(result, total)` after each page of a full sync
pub async fn cmd_sync_with_progress<F>(
    config: &Config,
    scanner: &Scanner,
    publisher: &dyn PagePublisher,
    file_path: Option<&str>,
    on_file: F,
) -> SyncResponse
where
    F: FnMut(&FileSyncResult, usize),
{
    if !config.is_configured() {
        warn!("Sync requested without Notion credentials");
        return SyncResponse::failed(CREDENTIALS_NOT_CONFIGURED);
    }

    match file_path.filter(|p| !p.is_empty()) {
        Some(path) => sync_file(scanner, publisher, path).await,
        None => SyncResponse::Batch(sync_all(scanner, publisher, on_file).await),
    }
}

async fn sync_file(scanner: &Scanner, publisher: &dyn PagePublisher, file_path: &str) -> SyncResponse {
    let abs_path = scanner.resolve(file_path);
    if !abs_path.exists() {
        return SyncResponse::failed(format!("File not found: {}", file_path));
    }

    let content = scanner.read_file(&abs_path);
    let title = abs_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string());

    SyncResponse::Page(publisher.create_page(&title, &content, file_path).await)
}

async fn sync_all<F>(scanner: &Scanner, publisher: &dyn PagePublisher, mut on_file: F) -> SyncBatch
where
    F: FnMut(&FileSyncResult, usize),
{
    let files = scanner.find_files();
    let total = files.len();
    info!("Syncing {} files to Notion", total);

    let mut results = Vec::with_capacity(total);
    for file in files {
        let content = scanner.read_file(Path::new(&file.abs_path));
        let result = publisher.create_page(&file.title(), &content, &file.path).await;
        let entry = FileSyncResult {
            file: file.path,
            result,
        };
        on_file(&entry, total);
        results.push(entry);
    }

    let failed = results.iter().filter(|r| !r.result.success).count();
    info!("Synced {} files ({} failed)", results.len(), failed);

    SyncBatch {
        success: true,
        synced: results.len(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingPublisher {
        calls: Mutex<Vec<(String, String, String)>>,
        fail_on: Option<String>,
    }

    impl RecordingPublisher {
        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PagePublisher for RecordingPublisher {
        async fn create_page(&self, title: &str, content: &str, source_path: &str) -> PublishResult {
            self.calls.lock().unwrap().push((
                title.to_string(),
                content.to_string(),
                source_path.to_string(),
            ));
            if self.fail_on.as_deref() == Some(title) {
                return PublishResult::failed("boom");
            }
            PublishResult::created(Some(format!("id-{}", title)), None)
        }
    }

    fn workspace(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (relative, content) in files {
            let path = tmp.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        tmp
    }

    fn configured(root: &Path) -> Config {
        Config::default()
            .with_workspace_root(root)
            .unwrap()
            .with_credentials(Some("secret_x".to_string()), Some("parent".to_string()))
    }

    #[tokio::test]
    async fn test_sync_all_publishes_each_file_in_order() {
        let tmp = workspace(&[
            ("docs/a.md", "alpha"),
            ("docs/b.txt", "beta"),
            ("src/c.py", "gamma"),
        ]);
        let config = configured(tmp.path());
        let scanner = Scanner::new(&config).unwrap();
        let publisher = RecordingPublisher::default();

        let response = cmd_sync(&config, &scanner, &publisher, None).await;

        let SyncResponse::Batch(batch) = response else {
            panic!("expected a batch response");
        };
        assert!(batch.success);
        assert_eq!(batch.synced, 3);
        let files: Vec<_> = batch.results.iter().map(|r| r.file.as_str()).collect();
        let expected: Vec<String> = ["docs/a.md", "docs/b.txt", "src/c.py"]
            .iter()
            .map(|p| Path::new(p).to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, expected);

        let calls = publisher.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, "a.md");
        assert_eq!(calls[0].1, "alpha");
        assert_eq!(calls[2].0, "c.py");
    }

    #[tokio::test]
    async fn test_batch_reports_success_despite_failures() {
        let tmp = workspace(&[("docs/a.md", "alpha"), ("docs/b.md", "beta")]);
        let config = configured(tmp.path());
        let scanner = Scanner::new(&config).unwrap();
        let publisher = RecordingPublisher {
            fail_on: Some("a.md".to_string()),
            ..Default::default()
        };

        let response = cmd_sync(&config, &scanner, &publisher, Some("")).await;

        assert_eq!(response.failures(), 1);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["synced"], json!(2));
        assert_eq!(value["results"][0]["result"], json!({"success": false, "error": "boom"}));
        assert_eq!(value["results"][1]["result"]["success"], json!(true));
    }

    #[tokio::test]
    async fn test_missing_credentials_publish_nothing() {
        let tmp = workspace(&[("docs/a.md", "alpha")]);
        let config = Config::default().with_workspace_root(tmp.path()).unwrap();
        let scanner = Scanner::new(&config).unwrap();
        let publisher = RecordingPublisher::default();

        for file_path in [None, Some("docs/a.md")] {
            let response = cmd_sync(&config, &scanner, &publisher, file_path).await;
            assert_eq!(
                serde_json::to_value(&response).unwrap(),
                json!({"success": false, "error": CREDENTIALS_NOT_CONFIGURED})
            );
        }
        assert!(publisher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_file_sync() {
        let tmp = workspace(&[("notes/todo.md", "- item")]);
        let config = configured(tmp.path());
        let scanner = Scanner::new(&config).unwrap();
        let publisher = RecordingPublisher::default();

        let response = cmd_sync(&config, &scanner, &publisher, Some("notes/todo.md")).await;

        assert_eq!(
            response,
            SyncResponse::Page(PublishResult::created(Some("id-todo.md".to_string()), None))
        );
        assert_eq!(
            publisher.calls(),
            vec![(
                "todo.md".to_string(),
                "- item".to_string(),
                "notes/todo.md".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_single_file_not_found() {
        let tmp = workspace(&[]);
        let config = configured(tmp.path());
        let scanner = Scanner::new(&config).unwrap();
        let publisher = RecordingPublisher::default();

        let response = cmd_sync(&config, &scanner, &publisher, Some("docs/missing.md")).await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "error": "File not found: docs/missing.md"})
        );
        assert!(publisher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_file() {
        let tmp = workspace(&[("docs/a.md", "a"), ("docs/b.md", "b")]);
        let config = configured(tmp.path());
        let scanner = Scanner::new(&config).unwrap();
        let publisher = RecordingPublisher::default();
        let mut seen = Vec::new();

        cmd_sync_with_progress(&config, &scanner, &publisher, None, |entry, total| {
            seen.push((entry.file.clone(), total));
        })
        .await;

        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, total)| *total == 2));
    }
}
