//! Count-based structural comparison of two XML documents.
//!
//! Both documents are reduced to a [`CanonicalMap`], a multiset of canonical
//! element keys. Keys whose counts differ become [`Difference`]s, and
//! differences beneath an added or removed attribute-identified element are
//! folded into that element's own difference.
//!
//! Sibling order is not compared, only how often each kind of element occurs.

mod canonical;
mod collate;
mod differ;
mod report;

pub use canonical::{extract_entries, node_path, CanonicalKey, CanonicalMap, Detail, Entry};
pub use collate::locale_cmp;
pub use differ::{diff, filter_diffs, Difference};
pub use report::ComparisonReport;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{IgnoreSet, Workspace};
use crate::error::Result;
use crate::node::Document;
use crate::xml::XmlParser;

/// Compares two parsed documents and returns the filtered differences.
pub fn compare_trees(
    template: &Document,
    compare: &Document,
    ignore: &IgnoreSet,
) -> Vec<Difference> {
    let template_map = extract_entries(template.root_element(), ignore);
    let compare_map = extract_entries(compare.root_element(), ignore);
    debug!(
        template_keys = template_map.len(),
        template_elements = template_map.total(),
        compare_keys = compare_map.len(),
        compare_elements = compare_map.total(),
        "canonical maps built"
    );

    let diffs = diff(&template_map, &compare_map);
    let found = diffs.len();
    let filtered = filter_diffs(diffs);
    debug!(found, reported = filtered.len(), "differences filtered");
    filtered
}

/// Compares two documents given as strings.
///
/// # Examples
/// ```rust
/// use xmlcheck::compare::compare_documents;
/// use xmlcheck::config::IgnoreSet;
///
/// let diffs = compare_documents(
///     r#"<Patient ID="1"><Name>Anna</Name></Patient>"#,
///     r#"<Patient ID="1"><Name>Anna</Name><Name>Berta</Name></Patient>"#,
///     &IgnoreSet::default(),
/// )?;
/// assert_eq!(diffs.len(), 1);
/// assert_eq!(diffs[0].value.as_deref(), Some("Berta"));
/// # Ok::<(), xmlcheck::Error>(())
/// ```
pub fn compare_documents(
    template: &str,
    compare: &str,
    ignore: &IgnoreSet,
) -> Result<Vec<Difference>> {
    let parser = XmlParser::new();
    let template = parser.parse_str(template)?;
    let compare = parser.parse_str(compare)?;
    Ok(compare_trees(&template, &compare, ignore))
}

/// A written comparison report and where it went.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub report: ComparisonReport,
    pub report_path: PathBuf,
}

impl ComparisonOutcome {
    pub fn is_equal(&self) -> bool {
        self.report.equal
    }
}

/// Compares two files and writes `<template>_vs_<compare>.json` into the
/// workspace's export directory.
///
/// Either document failing to load aborts the comparison before anything is
/// written.
pub fn compare_files(
    template_path: &Path,
    compare_path: &Path,
    ignore: &IgnoreSet,
    workspace: &Workspace,
) -> Result<ComparisonOutcome> {
    let parser = XmlParser::new();
    let template = parser.parse_file(template_path)?;
    let compare = parser.parse_file(compare_path)?;

    let differences = compare_trees(&template, &compare, ignore);
    let report = ComparisonReport::new(template_path, compare_path, differences);
    let report_path = report.write(&workspace.report_path(template_path, compare_path))?;

    Ok(ComparisonOutcome {
        report,
        report_path,
    })
}
