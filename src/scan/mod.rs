//! Workspace scanning
//!
//! Collects the project files that get published: every file under the
//! configured top-level folders whose name matches one of the configured
//! globs, minus hidden files and anything inside the reserved folder.

use crate::config::Config;
use crate::error::{Error, Result};
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

/// A matched workspace file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the workspace root
    pub path: String,
    /// Absolute path on disk
    pub abs_path: String,
    /// File name without its extension
    pub name: String,
    /// Extension including the leading dot, or empty
    pub extension: String,
}

impl FileEntry {
    fn new(root: &Path, abs_path: &Path) -> Option<Self> {
        let relative = abs_path.strip_prefix(root).ok()?;
        let name = abs_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = abs_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Some(Self {
            path: relative.to_string_lossy().into_owned(),
            abs_path: abs_path.to_string_lossy().into_owned(),
            name,
            extension,
        })
    }

    /// Page title used when the file is published
    pub fn title(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }
}

/// Scans the workspace root for publishable files
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    folders: Vec<String>,
    matchers: Vec<GlobMatcher>,
    reserved_folder: String,
}

impl Scanner {
    pub fn new(config: &Config) -> Result<Self> {
        let matchers = config
            .scan
            .patterns
            .iter()
            .map(|p| Glob::new(p).map(|g| g.compile_matcher()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            root: config.workspace_root.clone(),
            folders: config.scan.folders.clone(),
            matchers,
            reserved_folder: config.scan.reserved_folder.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find all matching files.
    ///
    /// Results are grouped by folder, then by pattern. A file matching two
    /// patterns is listed twice.
    pub fn find_files(&self) -> Vec<FileEntry> {
        let mut files = Vec::new();

        for folder in &self.folders {
            let folder_path = self.root.join(folder);
            if !folder_path.is_dir() {
                debug!("Scan folder {} does not exist", folder_path.display());
                continue;
            }

            for matcher in &self.matchers {
                for entry in WalkDir::new(&folder_path).min_depth(1).sort_by_file_name() {
                    let entry = match entry {
                        Ok(e) => e,
                        Err(e) => {
                            debug!("Skipping unreadable entry: {}", e);
                            continue;
                        }
                    };

                    let path = entry.path();
                    if !matcher.is_match(entry.file_name()) || !path.is_file() {
                        continue;
                    }
                    if self.is_excluded(path) {
                        continue;
                    }
                    if let Some(file) = FileEntry::new(&self.root, path) {
                        files.push(file);
                    }
                }
            }
        }

        debug!("Found {} files under {}", files.len(), self.root.display());
        files
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(false);
        if hidden {
            return true;
        }

        path.strip_prefix(&self.root)
            .map(|relative| {
                relative
                    .components()
                    .any(|c| c.as_os_str() == self.reserved_folder.as_str())
            })
            .unwrap_or(true)
    }

    /// Read a file as UTF-8, returning an empty string on failure.
    ///
    /// The failure is logged; use [`Scanner::try_read_file`] to observe it.
    pub fn read_file(&self, abs_path: &Path) -> String {
        match self.try_read_file(abs_path) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read file {}: {}", abs_path.display(), e);
                String::new()
            }
        }
    }

    pub fn try_read_file(&self, abs_path: &Path) -> Result<String> {
        if abs_path.is_dir() {
            return Err(Error::InvalidPath(format!(
                "{} is a directory",
                abs_path.display()
            )));
        }
        Ok(std::fs::read_to_string(abs_path)?)
    }

    /// Resolve a caller-supplied path against the workspace root
    pub fn resolve(&self, file_path: &str) -> PathBuf {
        self.root.join(file_path)
    }
}
