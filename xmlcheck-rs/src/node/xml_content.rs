//! Payloads carried by tree nodes: elements and text runs.

/// What a non-document node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    Element(XmlElement),
    /// Character data and CDATA.
    Text(XmlText),
}

impl XmlContent {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            XmlContent::Text(_) => None,
        }
    }
}

/// Strips a namespace prefix from a qualified name.
pub fn local_part(qname: &str) -> &str {
    match qname.rsplit_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

/// A single attribute in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    qname: String,
    value: String,
}

impl XmlAttribute {
    /// Creates an attribute from its qualified name and unescaped value.
    pub fn new(qname: impl Into<String>, value: impl Into<String>) -> Self {
        XmlAttribute {
            qname: qname.into(),
            value: value.into(),
        }
    }

    /// Local name of the attribute (`xsi:schemaLocation` -> `schemaLocation`).
    pub fn name(&self) -> &str {
        local_part(&self.qname)
    }

    /// Qualified name as written in the source.
    pub fn qname(&self) -> &str {
        &self.qname
    }

    /// Attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Element name plus its attributes in document order.
///
/// Namespace declarations are not stored as attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// The qualified name of the element (e.g., "Patient", "ns:Patient").
    qname: String,
    /// Attributes in document order.
    attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    pub fn new(qname: impl Into<String>, attributes: Vec<XmlAttribute>) -> Self {
        XmlElement {
            qname: qname.into(),
            attributes,
        }
    }

    /// Returns the local name of the element.
    pub fn name(&self) -> &str {
        local_part(&self.qname)
    }

    /// Name as written, prefix included.
    pub fn qname(&self) -> &str {
        &self.qname
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Looks up an attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .map(XmlAttribute::value)
    }
}

impl std::fmt::Display for XmlElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.qname)?;
        for attr in &self.attributes {
            write!(f, " {}=\"{}\"", attr.qname, attr.value)?;
        }
        write!(f, ">")
    }
}

/// A run of character data with entities already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlText {
    text: String,
}

impl XmlText {
    pub fn new(text: impl Into<String>) -> Self {
        XmlText { text: text.into() }
    }

    /// Returns the text, entities already resolved.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for XmlText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
