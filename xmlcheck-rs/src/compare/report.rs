//! Comparison report written as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::differ::Difference;
use crate::error::Result;

/// Outcome of comparing a template document with a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Template path as given by the caller.
    pub template: String,
    /// Candidate path as given by the caller.
    pub compare: String,
    /// True when no difference remains after filtering.
    pub equal: bool,
    pub differences: Vec<Difference>,
}

impl ComparisonReport {
    pub fn new(template: &Path, compare: &Path, differences: Vec<Difference>) -> Self {
        ComparisonReport {
            template: template.display().to_string(),
            compare: compare.display().to_string(),
            equal: differences.is_empty(),
            differences,
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report to `path`, creating missing parent directories.
    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        info!(
            path = %path.display(),
            equal = self.equal,
            differences = self.differences.len(),
            "comparison report written"
        );
        Ok(path.to_path_buf())
    }
}
