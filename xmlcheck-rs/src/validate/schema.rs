//! XSD validation backed by libxml2.

use std::path::Path;

use libxml::{
    error::StructuredError,
    parser::Parser,
    schemas::{SchemaParserContext, SchemaValidationContext},
};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::constants::UNKNOWN_LINE;
use crate::error::{Error, Result};

/// One schema violation reported for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub message: String,
    /// 1-based line, written as `"unknown"` when absent.
    #[serde(serialize_with = "serialize_line")]
    pub line: Option<u32>,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>, line: Option<u32>) -> Self {
        ValidationIssue {
            message: message.into(),
            line,
        }
    }
}

impl From<StructuredError> for ValidationIssue {
    fn from(se: StructuredError) -> Self {
        let message = se
            .message
            .as_deref()
            .map(str::trim_end)
            .unwrap_or("schema validation error")
            .to_string();
        let line = se.line.and_then(|l| u32::try_from(l).ok()).filter(|l| *l > 0);
        ValidationIssue { message, line }
    }
}

fn serialize_line<S: Serializer>(
    line: &Option<u32>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match line {
        Some(line) => serializer.serialize_u32(*line),
        None => serializer.serialize_str(UNKNOWN_LINE),
    }
}

/// Result of checking one document against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        ValidationOutcome {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<ValidationIssue>) -> Self {
        ValidationOutcome {
            valid: false,
            errors,
        }
    }
}

/// Something that checks document text against a schema.
///
/// `Err` means the document could not be checked at all (not well-formed,
/// schema unavailable); schema violations are an `Ok` outcome.
pub trait SchemaValidator {
    fn validate(&mut self, xml: &str) -> Result<ValidationOutcome>;
}

/// A compiled XSD.
pub struct XsdSchema {
    context: SchemaValidationContext,
}

impl XsdSchema {
    /// Loads and compiles the schema at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        // libxml gives no useful message for a missing file
        if !path.exists() {
            return Err(Error::Schema(format!("File not found: {}", path.display())));
        }
        let xsd_path = path
            .to_str()
            .ok_or_else(|| Error::Schema(format!("Invalid XSD path: {}", path.display())))?;

        let mut parser_ctx = SchemaParserContext::from_file(xsd_path);
        let context = SchemaValidationContext::from_parser(&mut parser_ctx).map_err(|errors| {
            let messages: Vec<String> = errors
                .into_iter()
                .map(|e| ValidationIssue::from(e).message)
                .collect();
            Error::Schema(format!("{}: {}", path.display(), messages.join("; ")))
        })?;
        debug!(path = %path.display(), "schema loaded");

        Ok(XsdSchema { context })
    }
}

impl SchemaValidator for XsdSchema {
    fn validate(&mut self, xml: &str) -> Result<ValidationOutcome> {
        // libxml recovers from some malformed input, so well-formedness is
        // checked with the crate's own parser first
        crate::xml::parse_str(xml)?;
        let document = Parser::default()
            .parse_string(xml)
            .map_err(|e| Error::Parse(format!("Failed to parse XML: {:?}", e)))?;

        match self.context.validate_document(&document) {
            Ok(()) => Ok(ValidationOutcome::valid()),
            Err(errors) => Ok(ValidationOutcome::invalid(
                errors.into_iter().map(ValidationIssue::from).collect(),
            )),
        }
    }
}

/// Stands in for a schema that failed to load; every check is a fault.
#[derive(Debug, Clone)]
pub struct UnavailableSchema {
    reason: String,
}

impl UnavailableSchema {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableSchema {
            reason: reason.into(),
        }
    }

    /// Keeps the message of a failed [`XsdSchema::from_file`].
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Schema(reason) => UnavailableSchema::new(reason.clone()),
            other => UnavailableSchema::new(other.to_string()),
        }
    }
}

impl SchemaValidator for UnavailableSchema {
    fn validate(&mut self, _xml: &str) -> Result<ValidationOutcome> {
        Err(Error::Schema(self.reason.clone()))
    }
}
