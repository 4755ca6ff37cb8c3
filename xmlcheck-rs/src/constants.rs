//! Constants used throughout xmlcheck.

/// Element and attribute names skipped by the comparator unless the caller
/// supplies its own list.
pub const DEFAULT_IGNORE_LIST: &[&str] = &[
    "xmlns:xsi",
    "xmlns:xsd",
    "Schema_Version",
    "schemaLocation",
    "xmlns",
    "Absender_ID",
    "Software_ID",
    "Software_Version",
];

/// Attribute whose value disambiguates a path segment (`Name[@ID="..."]`).
pub const ID_ATTRIBUTE: &str = "ID";

/// Separator between the name, attribute and text parts of a canonical key.
pub const KEY_SEPARATOR: char = '|';

/// Separator between `name=value` pairs inside a canonical key.
pub const ATTR_SEPARATOR: char = '&';

/// Directory holding XSD files.
pub const SCHEMA_DIR: &str = "schema";

/// Directory scanned for documents to validate.
pub const IMPORT_DIR: &str = "imports";

/// Directory receiving verdicts and comparison reports.
pub const EXPORT_DIR: &str = "exports";

/// Schema used by `validate` when none is given.
pub const DEFAULT_SCHEMA_FILE: &str = "oBDS_v3.0.3.xsd";

/// Extension of documents picked up by the validator.
pub const XML_EXTENSION: &str = "xml";

/// Extension of written verdicts and reports.
pub const JSON_EXTENSION: &str = "json";

/// Status written for a document that passed schema validation.
pub const STATUS_SUCCESS: &str = "[success]";

/// Status written for a document that failed schema validation.
pub const STATUS_ERROR: &str = "[error]";

/// Line placeholder when the validator reports no line number.
pub const UNKNOWN_LINE: &str = "unknown";
