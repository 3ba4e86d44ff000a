use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Plain-text report produced by `/reports/compliance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub report: String,
    pub filename: String,
}

impl ComplianceReport {
    /// Service-provided filename reduced to its final component, so a
    /// hostile name cannot escape the target directory.
    pub fn safe_filename(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "compliance_report_{}.txt",
                    chrono::Local::now().format("%Y%m%d_%H%M%S")
                )
            })
    }

    /// Write the report text into `dir`, returning the file written
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(self.safe_filename());
        std::fs::write(&path, &self.report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(path)
    }
}
