//! Scan command implementation

use crate::scan::{FileEntry, Scanner};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Files found in the workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub success: bool,
    pub count: usize,
    pub files: Vec<FileEntry>,
}

/// Scan the workspace
pub fn cmd_scan(scanner: &Scanner) -> ScanReport {
    info!("Scanning {}", scanner.root().display());

    let files = scanner.find_files();
    ScanReport {
        success: true,
        count: files.len(),
        files,
    }
}

/// Print scan results to console
pub fn print_scan_report(report: &ScanReport) {
    println!("\n📂 Found {} files\n", report.count);
    for file in &report.files {
        println!("  {}", file.path);
    }
}
