//! Batch XSD validation of an import directory.
//!
//! Every `*.xml` file is checked on its own and gets its own JSON verdict in
//! the export directory. A file that cannot be read, parsed or written is
//! recorded and the batch moves on.

mod schema;
mod verdict;

pub use schema::{
    SchemaValidator, UnavailableSchema, ValidationIssue, ValidationOutcome, XsdSchema,
};
pub use verdict::Verdict;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::constants::{JSON_EXTENSION, XML_EXTENSION};
use crate::error::Result;

/// Counts of what happened to each file in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub valid: usize,
    pub invalid: usize,
    pub faulted: usize,
    /// Verdicts that could not be written.
    pub unwritten: usize,
}

impl BatchSummary {
    /// Number of files processed.
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.faulted
    }

    fn count(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Valid { .. } => self.valid += 1,
            Verdict::Invalid { .. } => self.invalid += 1,
            Verdict::Fault { .. } => self.faulted += 1,
        }
    }
}

/// Validates every `*.xml` file in `import_dir` against the XSD at
/// `schema_path`, writing one verdict per file into `export_dir`.
///
/// A schema that fails to load turns every file into a fault verdict. Only a
/// missing or unreadable import directory fails the whole call.
pub fn validate_files(
    schema_path: &Path,
    import_dir: &Path,
    export_dir: &Path,
) -> Result<BatchSummary> {
    match XsdSchema::from_file(schema_path) {
        Ok(mut schema) => validate_batch(&mut schema, import_dir, export_dir),
        Err(e) => {
            error!(schema = %schema_path.display(), error = %e, "schema could not be loaded");
            validate_batch(&mut UnavailableSchema::from_error(&e), import_dir, export_dir)
        }
    }
}

/// Runs `validator` over the import directory.
pub fn validate_batch<V: SchemaValidator>(
    validator: &mut V,
    import_dir: &Path,
    export_dir: &Path,
) -> Result<BatchSummary> {
    fs::create_dir_all(export_dir)?;
    let mut summary = BatchSummary::default();

    for xml_path in list_xml_files(import_dir)? {
        let file = xml_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let export_path = export_dir.join(&file).with_extension(JSON_EXTENSION);

        let verdict = match check_file(validator, &xml_path, &file) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(file = %file, error = %e, "error processing file");
                Verdict::fault(&e)
            }
        };
        summary.count(&verdict);

        if let Err(e) = verdict.write(&export_path) {
            error!(file = %file, path = %export_path.display(), error = %e, "verdict not written");
            summary.unwritten += 1;
        }
    }

    info!(
        valid = summary.valid,
        invalid = summary.invalid,
        faulted = summary.faulted,
        "validation batch finished"
    );
    Ok(summary)
}

fn check_file<V: SchemaValidator>(validator: &mut V, path: &Path, file: &str) -> Result<Verdict> {
    let xml = fs::read_to_string(path)?;
    let outcome = validator.validate(&xml)?;
    if outcome.valid {
        info!(file = %file, "validation successful");
    } else {
        warn!(file = %file, errors = outcome.errors.len(), "validation failed");
    }
    Ok(Verdict::from_outcome(file, outcome))
}

/// Files directly inside `dir` whose name ends in `.xml`, sorted by name.
fn list_xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{XML_EXTENSION}");
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_xml = entry.file_name().to_string_lossy().ends_with(&suffix);
        if is_xml && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
