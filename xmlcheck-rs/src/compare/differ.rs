//! Count differences between two canonical maps.

use std::collections::BTreeSet;

use serde::Serialize;

use super::canonical::{CanonicalKey, CanonicalMap};
use super::collate::locale_cmp;

/// A canonical key whose occurrence count differs between the documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// Key the counts belong to. Not part of the written report.
    #[serde(skip)]
    pub key: CanonicalKey,
    /// Leaf text of the representative occurrence, `None` for attribute entries.
    pub value: Option<String>,
    /// Path of the representative occurrence.
    pub path: String,
    /// Occurrences in the template document.
    pub template: usize,
    /// Occurrences in the compared document.
    pub compare: usize,
}

impl Difference {
    /// True for attribute-identified elements (`value` is `None`).
    pub fn is_attribute_entry(&self) -> bool {
        self.value.is_none()
    }
}

/// Lists every key whose count differs, sorted by path.
///
/// The representative occurrence is taken from the side with more
/// occurrences. Differences on the same path are ordered by key.
pub fn diff(template: &CanonicalMap, compare: &CanonicalMap) -> Vec<Difference> {
    let keys: BTreeSet<&CanonicalKey> = template.keys().chain(compare.keys()).collect();

    let mut diffs: Vec<Difference> = keys
        .into_iter()
        .filter_map(|key| {
            let template_count = template.count(key);
            let compare_count = compare.count(key);
            if template_count == compare_count {
                return None;
            }
            let source = if template_count > compare_count {
                template.get(key)
            } else {
                compare.get(key)
            };
            let detail = source.and_then(|e| e.representative())?;
            Some(Difference {
                key: key.clone(),
                value: detail.value.clone(),
                path: detail.path.clone(),
                template: template_count,
                compare: compare_count,
            })
        })
        .collect();

    diffs.sort_by(|a, b| locale_cmp(&a.path, &b.path).then_with(|| a.key.cmp(&b.key)));
    diffs
}

/// Drops differences that lie beneath an attribute-entry difference.
///
/// When an attribute-identified element is added or removed, everything under
/// it differs too; only the element itself is kept.
pub fn filter_diffs(diffs: Vec<Difference>) -> Vec<Difference> {
    let bases: BTreeSet<String> = diffs
        .iter()
        .filter(|d| d.is_attribute_entry())
        .map(|d| d.path.clone())
        .collect();

    diffs
        .into_iter()
        .filter(|d| {
            !bases
                .iter()
                .any(|base| d.path != *base && is_beneath(&d.path, base))
        })
        .collect()
}

fn is_beneath(path: &str, base: &str) -> bool {
    path.strip_prefix(base)
        .is_some_and(|rest| rest.starts_with('/'))
}
