//! Per-file validation verdicts.

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::schema::{ValidationIssue, ValidationOutcome};
use crate::constants::{STATUS_ERROR, STATUS_SUCCESS};
use crate::error::{Error, Result};

/// What the validator writes for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Verdict {
    /// `{"status": "[success]", "file": ...}`
    Valid { status: &'static str, file: String },
    /// `{"status": "[error]", "file": ..., "errors": [...]}`
    Invalid {
        status: &'static str,
        file: String,
        errors: Vec<ValidationIssue>,
    },
    /// `{"error": ...}` when the file could not be checked.
    Fault { error: String },
}

impl Verdict {
    pub fn from_outcome(file: impl Into<String>, outcome: ValidationOutcome) -> Self {
        if outcome.valid {
            Verdict::Valid {
                status: STATUS_SUCCESS,
                file: file.into(),
            }
        } else {
            Verdict::Invalid {
                status: STATUS_ERROR,
                file: file.into(),
                errors: outcome.errors,
            }
        }
    }

    pub fn fault(error: &Error) -> Self {
        Verdict::Fault {
            error: error.to_string(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
