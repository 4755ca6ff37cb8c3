//! xmlcheck - XML comparison and schema validation
//!
//! This library provides two independent pipelines over XML documents.
//!
//! # Comparison
//!
//! Two documents are reduced to multisets of canonical element keys built
//! from the element name, its attributes (sorted, minus ignored names) and,
//! for leaves, its trimmed text. Keys whose counts differ are reported with a
//! representative path, and differences nested under an added or removed
//! attribute-identified element are folded into that element.
//!
//! ```rust
//! use xmlcheck::{compare_documents, IgnoreSet};
//!
//! let diffs = compare_documents(
//!     r#"<Fall ID="1"><Code system="a">X</Code></Fall>"#,
//!     r#"<Fall ID="1"><Code system="a">X</Code></Fall>"#,
//!     &IgnoreSet::default(),
//! )?;
//! assert!(diffs.is_empty());
//! # Ok::<(), xmlcheck::Error>(())
//! ```
//!
//! # Validation
//!
//! Every `*.xml` file of an import directory is validated against an XSD
//! (through libxml2) and receives its own JSON verdict. Faults are recorded
//! per file and never stop the batch.

pub mod compare;
pub mod config;
pub mod constants;
pub mod error;
pub mod node;
pub mod validate;
pub mod xml;

// Re-export commonly used types
pub use compare::{
    compare_documents, compare_files, compare_trees, ComparisonOutcome, ComparisonReport,
    Difference,
};
pub use config::{IgnoreSet, Workspace};
pub use constants::*;
pub use error::{Error, Result};
pub use node::{Document, NodeInner, NodeRef, XmlContent, XmlElement, XmlText};
pub use validate::{
    validate_batch, validate_files, BatchSummary, SchemaValidator, Verdict, XsdSchema,
};
pub use xml::{parse_file, parse_str, XmlParser};
