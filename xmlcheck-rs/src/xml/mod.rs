//! XML parsing.
//!
//! Documents are read with quick-xml into the read-only tree of [`crate::node`].

mod parser;

pub use parser::{parse_file, parse_str, XmlParser};
