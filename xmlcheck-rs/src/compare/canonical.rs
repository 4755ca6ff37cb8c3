//! Canonical multiset representation of a document.
//!
//! Every element is reduced to a key built from its name, its filtered and
//! sorted attributes and, for leaves, its trimmed text. Elements sharing a key
//! are counted together regardless of where they sit in the tree.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::collate::locale_cmp;
use crate::config::IgnoreSet;
use crate::constants::{ATTR_SEPARATOR, ID_ATTRIBUTE, KEY_SEPARATOR};
use crate::node::{NodeRef, XmlAttribute};

/// Position-independent identity of an element: `name|attrs|text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Builds a key from its three segments.
    pub fn new(name: &str, attrs: &str, text: &str) -> Self {
        CanonicalKey(format!(
            "{name}{KEY_SEPARATOR}{attrs}{KEY_SEPARATOR}{text}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One occurrence of a key in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    /// Slash-separated path from the root element to the occurrence.
    pub path: String,
    /// Leaf text, `None` for attribute-identified elements.
    pub value: Option<String>,
}

/// All occurrences of one key in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub count: usize,
    pub details: Vec<Detail>,
}

impl Entry {
    fn record(&mut self, detail: Detail) {
        self.count += 1;
        self.details.push(detail);
    }

    /// The occurrence reported when this entry's count differs.
    pub fn representative(&self) -> Option<&Detail> {
        self.details.first()
    }
}

/// Canonical key to entry, one map per document.
#[derive(Debug, Clone, Default)]
pub struct CanonicalMap {
    entries: FxHashMap<CanonicalKey, Entry>,
}

impl CanonicalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Occurrence count of `key`, zero when absent.
    pub fn count(&self, key: &CanonicalKey) -> usize {
        self.entries.get(key).map_or(0, |e| e.count)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &Entry)> {
        self.entries.iter()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.values().map(|e| e.count).sum()
    }

    fn record(&mut self, key: CanonicalKey, detail: Detail) {
        self.entries.entry(key).or_default().record(detail);
    }
}

/// Walks the tree under `root` depth-first and counts every element.
///
/// An element is recorded under `name|attrs|` when it has non-ignored
/// attributes, and under `name|attrs|text` when it has no child elements.
/// Elements named in `ignore` are skipped with their whole subtree.
pub fn extract_entries(root: &NodeRef, ignore: &IgnoreSet) -> CanonicalMap {
    let mut map = CanonicalMap::new();
    traverse(root, ignore, &mut map);
    map
}

fn traverse(node: &NodeRef, ignore: &IgnoreSet, map: &mut CanonicalMap) {
    let (name, attrs_string, has_attrs, child_elems) = {
        let inner = node.borrow();
        let Some(element) = inner.element() else {
            return;
        };
        if ignore.contains(element.name()) {
            return;
        }

        let mut attrs: Vec<&XmlAttribute> = element
            .attributes()
            .iter()
            .filter(|a| !ignore.contains(a.name()))
            .collect();
        attrs.sort_by(|a, b| locale_cmp(a.name(), b.name()));
        let attrs_string = attrs
            .iter()
            .map(|a| format!("{}={}", a.name(), a.value()))
            .collect::<Vec<_>>()
            .join(&ATTR_SEPARATOR.to_string());

        (
            element.name().to_string(),
            attrs_string,
            !attrs.is_empty(),
            inner.child_elements(),
        )
    };

    if has_attrs {
        map.record(
            CanonicalKey::new(&name, &attrs_string, ""),
            Detail {
                path: node_path(node),
                value: None,
            },
        );
    }

    if child_elems.is_empty() {
        let text = node.borrow().text_content().trim().to_string();
        map.record(
            CanonicalKey::new(&name, &attrs_string, &text),
            Detail {
                path: node_path(node),
                value: Some(text),
            },
        );
    } else {
        for child in &child_elems {
            traverse(child, ignore, map);
        }
    }
}

/// Builds `/Root/Parent[@ID="7"]/Node` by following parent links upwards.
pub fn node_path(node: &NodeRef) -> String {
    let mut parts = Vec::new();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        let inner = n.borrow();
        let Some(element) = inner.element() else {
            break;
        };
        let mut segment = element.name().to_string();
        if let Some(id) = element.attribute(ID_ATTRIBUTE) {
            segment.push_str(&format!("[@{ID_ATTRIBUTE}=\"{id}\"]"));
        }
        parts.push(segment);
        current = inner.parent().upgrade();
    }
    parts.reverse();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn entries(xml: &str, ignore: &IgnoreSet) -> CanonicalMap {
        let doc = parse_str(xml).unwrap();
        extract_entries(doc.root_element(), ignore)
    }

    fn key(name: &str, attrs: &str, text: &str) -> CanonicalKey {
        CanonicalKey::new(name, attrs, text)
    }

    #[test]
    fn test_key_format() {
        assert_eq!(key("Name", "", "Anna").as_str(), "Name||Anna");
        assert_eq!(key("Code", "a=1&b=2", "").to_string(), "Code|a=1&b=2|");
    }

    #[test]
    fn test_leaf_entries_and_paths() {
        let map = entries(
            r#"<Patient ID="1"><Name> Anna </Name><Name>Anna</Name></Patient>"#,
            &IgnoreSet::empty(),
        );

        let names = map.get(&key("Name", "", "Anna")).unwrap();
        assert_eq!(names.count, 2);
        assert_eq!(
            names.details[0],
            Detail {
                path: r#"/Patient[@ID="1"]/Name"#.to_string(),
                value: Some("Anna".to_string()),
            }
        );

        let patient = map.get(&key("Patient", "ID=1", "")).unwrap();
        assert_eq!(patient.count, 1);
        assert_eq!(patient.details[0].value, None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_container_without_attributes_is_waypoint() {
        let map = entries("<a><b><c>x</c></b></a>", &IgnoreSet::empty());
        assert_eq!(map.len(), 1);
        assert_eq!(map.total(), 1);
        assert_eq!(map.get(&key("c", "", "x")).unwrap().details[0].path, "/a/b/c");
    }

    #[test]
    fn test_container_with_attributes_recorded_once() {
        let map = entries(r#"<a><b kind="x"><c>1</c><c>2</c></b></a>"#, &IgnoreSet::empty());
        assert_eq!(map.count(&key("b", "kind=x", "")), 1);
        assert_eq!(map.count(&key("c", "", "1")), 1);
        assert_eq!(map.count(&key("c", "", "2")), 1);
        assert_eq!(map.total(), 3);
    }

    #[test]
    fn test_attribute_leaf_recorded_under_both_keys() {
        let map = entries(r#"<a><code v="7">text</code></a>"#, &IgnoreSet::empty());
        assert_eq!(map.count(&key("code", "v=7", "")), 1);
        assert_eq!(map.count(&key("code", "v=7", "text")), 1);
    }

    #[test]
    fn test_empty_attribute_leaf_shares_key() {
        let map = entries(r#"<a><flag on="1"/></a>"#, &IgnoreSet::empty());
        let entry = map.get(&key("flag", "on=1", "")).unwrap();
        assert_eq!(entry.count, 2);
        assert_eq!(entry.details[0].value, None);
        assert_eq!(entry.details[1].value, Some(String::new()));
    }

    #[test]
    fn test_attribute_order_is_canonical() {
        let a = entries(r#"<r><x b="2" a="1" C="3">t</x></r>"#, &IgnoreSet::empty());
        let b = entries(r#"<r><x C="3" a="1" b="2">t</x></r>"#, &IgnoreSet::empty());
        for map in [&a, &b] {
            assert_eq!(map.count(&key("x", "a=1&b=2&C=3", "")), 1);
            assert_eq!(map.count(&key("x", "a=1&b=2&C=3", "t")), 1);
        }
    }

    #[test]
    fn test_ignored_elements_are_pruned() {
        let ignore = IgnoreSet::new(["Header"]);
        let map = entries(
            r#"<r><Header ID="9"><Sent>today</Sent></Header><Body>x</Body></r>"#,
            &ignore,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.count(&key("Body", "", "x")), 1);
    }

    #[test]
    fn test_ignored_attributes_are_filtered() {
        let ignore = IgnoreSet::new(["Software_ID"]);
        let map = entries(r#"<r Software_ID="abc"><v>1</v></r>"#, &ignore);
        assert_eq!(map.len(), 1);
        assert_eq!(map.count(&key("v", "", "1")), 1);
    }

    #[test]
    fn test_root_ignored_yields_nothing() {
        let map = entries("<r><v>1</v></r>", &IgnoreSet::new(["r"]));
        assert!(map.is_empty());
    }

    #[test]
    fn test_leaf_text_includes_comments_and_cdata_neighbours() {
        let map = entries("<r><v> a<!-- c --><![CDATA[b]]> </v></r>", &IgnoreSet::empty());
        assert_eq!(map.count(&key("v", "", "ab")), 1);
    }

    #[test]
    fn test_path_uses_local_names() {
        let map = entries(
            r#"<ns:r xmlns:ns="urn:x"><ns:v ID="a">1</ns:v></ns:r>"#,
            &IgnoreSet::empty(),
        );
        let entry = map.get(&key("v", "ID=a", "1")).unwrap();
        assert_eq!(entry.details[0].path, r#"/r/v[@ID="a"]"#);
    }
}
