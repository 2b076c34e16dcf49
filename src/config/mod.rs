//! Configuration management for notion-mcp
//!
//! Scan and API settings can come from an optional TOML file. Credentials and
//! the workspace root are never read from that file: they come from the
//! environment or the matching CLI flags. The resulting [`Config`] is built
//! once at startup and shared read-only afterwards.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Environment variable holding the Notion integration secret
pub const ENV_API_KEY: &str = "NOTION_API_KEY";
/// Environment variable holding the page new pages are created under
pub const ENV_PARENT_PAGE_ID: &str = "NOTION_PARENT_PAGE_ID";
/// Environment variable overriding the workspace root
pub const ENV_WORKSPACE_ROOT: &str = "WORKSPACE_ROOT";

/// Main configuration structure
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Notion integration secret
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Parent page id for created pages
    #[serde(skip)]
    pub parent_page_id: Option<String>,

    /// Absolute path of the workspace being published
    #[serde(skip)]
    pub workspace_root: PathBuf,

    /// Workspace scanning configuration
    #[serde(default)]
    pub scan: ScanConfig,

    /// Notion API configuration
    #[serde(default)]
    pub notion: NotionConfig,
}

/// Workspace scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Top-level folders to search, in order
    #[serde(default = "default_scan_folders")]
    pub folders: Vec<String>,

    /// File name globs, in order
    #[serde(default = "default_file_patterns")]
    pub patterns: Vec<String>,

    /// Path segment that excludes a file from every scan
    #[serde(default = "default_reserved_folder")]
    pub reserved_folder: String,
}

/// Notion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// API base URL
    #[serde(default = "default_notion_api_url")]
    pub api_url: String,

    /// `Notion-Version` header value
    #[serde(default = "default_notion_version")]
    pub version: String,

    /// Request timeout in seconds
    #[serde(default = "default_notion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            folders: default_scan_folders(),
            patterns: default_file_patterns(),
            reserved_folder: default_reserved_folder(),
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_url: default_notion_api_url(),
            version: default_notion_version(),
            timeout_secs: default_notion_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            parent_page_id: None,
            workspace_root: default_workspace_root(),
            scan: ScanConfig::default(),
            notion: NotionConfig::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("parent_page_id", &self.redacted_parent_page_id())
            .field("workspace_root", &self.workspace_root)
            .field("scan", &self.scan)
            .field("notion", &self.notion)
            .finish()
    }
}

impl Config {
    /// Load configuration: the TOML file when given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Parse scan and API settings from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(Self {
            workspace_root: default_workspace_root(),
            ..config
        })
    }

    /// Apply credentials and workspace root from a variable lookup.
    ///
    /// Empty values count as unset.
    pub fn apply_env_with<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(lookup(ENV_API_KEY));
        let parent_page_id = non_empty(lookup(ENV_PARENT_PAGE_ID));
        let config = self.with_credentials(api_key, parent_page_id);
        match non_empty(lookup(ENV_WORKSPACE_ROOT)) {
            Some(root) => config.with_workspace_root(root),
            None => Ok(config),
        }
    }

    /// Replace credentials; `None` or empty values keep the current ones.
    pub fn with_credentials(mut self, api_key: Option<String>, parent_page_id: Option<String>) -> Self {
        if let Some(key) = non_empty(api_key) {
            self.api_key = Some(key);
        }
        if let Some(id) = non_empty(parent_page_id) {
            self.parent_page_id = Some(id);
        }
        self
    }

    /// Set the workspace root, resolving relative paths against the current directory.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        self.workspace_root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.folders.is_empty() {
            return Err(Error::Config("scan.folders must not be empty".to_string()));
        }
        if self.scan.patterns.is_empty() {
            return Err(Error::Config("scan.patterns must not be empty".to_string()));
        }
        if self.scan.reserved_folder.is_empty() {
            return Err(Error::Config(
                "scan.reserved_folder must not be empty".to_string(),
            ));
        }
        for pattern in &self.scan.patterns {
            Glob::new(pattern)?;
        }
        Url::parse(&self.notion.api_url)
            .map_err(|e| Error::Config(format!("Invalid notion.api_url: {}", e)))?;
        if self.notion.timeout_secs == 0 {
            return Err(Error::Config(
                "notion.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Both the API key and the parent page id are present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.parent_page_id.is_some()
    }

    pub fn api_key_set(&self) -> bool {
        self.api_key.is_some()
    }

    /// First 8 characters of the parent page id followed by `...`, or `Not set`
    pub fn redacted_parent_page_id(&self) -> String {
        match &self.parent_page_id {
            Some(id) => format!("{}...", id.chars().take(8).collect::<String>()),
            None => "Not set".to_string(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.notion.timeout_secs)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.folders, vec!["docs", "src"]);
        assert_eq!(config.scan.patterns.len(), 9);
        assert_eq!(config.scan.reserved_folder, "notion-mcp");
        assert_eq!(config.notion.api_url, "https://api.notion.com/v1");
        assert_eq!(config.notion.version, "2025-09-03");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_credentials() {
        let config = Config::default()
            .apply_env_with(lookup(&[
                (ENV_API_KEY, "secret_abc"),
                (ENV_PARENT_PAGE_ID, "0123456789abcdef"),
                (ENV_WORKSPACE_ROOT, "/srv/project"),
            ]))
            .unwrap();

        assert!(config.is_configured());
        assert!(config.api_key_set());
        assert_eq!(config.workspace_root, PathBuf::from("/srv/project"));
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let config = Config::default()
            .apply_env_with(lookup(&[(ENV_API_KEY, ""), (ENV_PARENT_PAGE_ID, "abc")]))
            .unwrap();

        assert!(!config.api_key_set());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_relative_workspace_root_is_absolute() {
        let config = Config::default().with_workspace_root("project").unwrap();
        assert!(config.workspace_root.is_absolute());
        assert!(config.workspace_root.ends_with("project"));
    }

    #[test]
    fn test_redacted_parent_page_id() {
        let mut config = Config::default();
        assert_eq!(config.redacted_parent_page_id(), "Not set");

        config.parent_page_id = Some("0123456789abcdef".to_string());
        assert_eq!(config.redacted_parent_page_id(), "01234567...");

        config.parent_page_id = Some("abc".to_string());
        assert_eq!(config.redacted_parent_page_id(), "abc...");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = Config::default().with_credentials(
            Some("secret_very_private".to_string()),
            Some("0123456789abcdef".to_string()),
        );
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret_very_private"));
        assert!(!rendered.contains("0123456789abcdef"));
    }

    #[test]
    fn test_toml_file_overrides_scan_settings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notion-mcp.toml");
        std::fs::write(
            &path,
            r#"
[scan]
folders = ["guides"]
patterns = ["*.rst"]

[notion]
timeout_secs = 3
"#,
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.scan.folders, vec!["guides"]);
        assert_eq!(config.scan.patterns, vec!["*.rst"]);
        assert_eq!(config.scan.reserved_folder, "notion-mcp");
        assert_eq!(config.notion.timeout_secs, 3);
        assert_eq!(config.notion.version, "2025-09-03");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.scan.folders.clear();
        assert!(config.validate().is_err());
        config.scan.folders = default_scan_folders();

        config.scan.patterns = vec!["*.{md".to_string()];
        assert!(config.validate().is_err());
        config.scan.patterns = default_file_patterns();

        config.notion.api_url = "not a url".to_string();
        assert!(config.validate().is_err());
        config.notion.api_url = default_notion_api_url();

        config.notion.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.notion.timeout_secs = 10;

        assert!(config.validate().is_ok());
    }
}
