//! Comparison options and the directory layout shared by both pipelines.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{
    DEFAULT_IGNORE_LIST, DEFAULT_SCHEMA_FILE, EXPORT_DIR, IMPORT_DIR, JSON_EXTENSION, SCHEMA_DIR,
};
use crate::error::Result;

/// Element and attribute names the comparator skips.
///
/// An element whose name is in the set is pruned together with its subtree;
/// an attribute whose name is in the set is left out of canonical keys.
///
/// # Examples
/// ```rust
/// use xmlcheck::config::IgnoreSet;
///
/// let ignore = IgnoreSet::new(["Timestamp", "Software_ID", "Timestamp"]);
/// assert!(ignore.contains("Timestamp"));
/// assert_eq!(ignore.names().len(), 2);
/// assert!(IgnoreSet::default().contains("schemaLocation"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    names: Vec<String>,
}

impl IgnoreSet {
    /// Builds a set from names, keeping first-seen order and dropping repeats.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IgnoreSet { names: Vec::new() };
        for name in names {
            let name = name.into();
            if !set.names.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    /// A set that ignores nothing.
    pub fn empty() -> Self {
        IgnoreSet { names: Vec::new() }
    }

    /// Returns true if `name` is ignored.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Ignored names in first-seen order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        IgnoreSet::new(DEFAULT_IGNORE_LIST.iter().copied())
    }
}

/// Schema, import and export directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    schema_dir: PathBuf,
    import_dir: PathBuf,
    export_dir: PathBuf,
}

impl Workspace {
    pub fn new(
        schema_dir: impl Into<PathBuf>,
        import_dir: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Workspace {
            schema_dir: schema_dir.into(),
            import_dir: import_dir.into(),
            export_dir: export_dir.into(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    pub fn import_dir(&self) -> &Path {
        &self.import_dir
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Schema used when the caller names none.
    pub fn default_schema(&self) -> PathBuf {
        self.schema_dir.join(DEFAULT_SCHEMA_FILE)
    }

    /// Creates all three directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.schema_dir, &self.import_dir, &self.export_dir] {
            if !dir.exists() {
                debug!(dir = %dir.display(), "creating directory");
            }
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Where the comparison report of `template` against `compare` is written.
    pub fn report_path(&self, template: &Path, compare: &Path) -> PathBuf {
        self.export_dir.join(format!(
            "{}_vs_{}.{}",
            report_stem(template),
            report_stem(compare),
            JSON_EXTENSION
        ))
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new(SCHEMA_DIR, IMPORT_DIR, EXPORT_DIR)
    }
}

/// File name with a trailing `.xml` removed; other extensions are kept.
fn report_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".xml") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}
