//! XML parser that builds node trees.
//!
//! This parser uses quick-xml's streaming API to build a read-only node tree.
//! Text is kept verbatim (entities resolved, whitespace untouched) so that the
//! comparator decides how to trim leaf content. Comments, processing
//! instructions and the DOCTYPE leave no nodes; general entities declared in
//! an internal DTD subset are expanded as text.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::node::{
    new_node, Document, NodeInner, NodeRef, XmlAttribute, XmlContent, XmlElement, XmlText,
};

/// Internal-subset entity name to replacement text.
type Entities = FxHashMap<String, String>;

const ENTITY_DECL: &str = "<!ENTITY";

/// XML parser that builds node trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlParser;

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser
    }

    /// Parses XML from a string.
    pub fn parse_str(&self, xml: &str) -> Result<Document> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file. Parse errors carry the file path.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        debug!(path = %path.display(), "parsing document");
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader).map_err(|e| e.with_path(path))
    }

    /// Parses XML from a quick-xml Reader.
    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<Document> {
        let document = new_node(None);
        let mut node_stack: Vec<NodeRef> = vec![document.clone()];
        let mut current_text: Option<String> = None;
        let mut entities = Entities::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    flush_text(&mut current_text, &node_stack)?;
                    let element = self.parse_element(e, reader, &entities)?;
                    let node = attach_element(element, &node_stack)?;
                    node_stack.push(node);
                }
                Ok(Event::End(_)) => {
                    flush_text(&mut current_text, &node_stack)?;
                    node_stack.pop();
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing tag - handle like Start + End
                    flush_text(&mut current_text, &node_stack)?;
                    let element = self.parse_element(e, reader, &entities)?;
                    attach_element(element, &node_stack)?;
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    current_text
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    current_text
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let resolved = resolve_reference(name, &entities)?;
                    current_text
                        .get_or_insert_with(String::new)
                        .push_str(&resolved);
                }
                Ok(Event::DocType(ref e)) => {
                    let doctype = String::from_utf8_lossy(e.as_ref());
                    declare_entities(&doctype, &mut entities);
                    debug!(count = entities.len(), "internal entities declared");
                }
                Ok(Event::Comment(_)) | Ok(Event::Decl(_)) | Ok(Event::PI(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e)),
            }
            buf.clear();
        }

        flush_text(&mut current_text, &node_stack)?;
        if node_stack.len() > 1 {
            let open = node_stack
                .last()
                .and_then(|n| n.borrow().element().map(|e| e.qname().to_string()))
                .unwrap_or_default();
            return Err(Error::Parse(format!(
                "unexpected end of document, element <{}> is not closed",
                open
            )));
        }

        Document::new(document).ok_or_else(|| Error::Parse("document has no root element".into()))
    }

    /// Parses an element's name and attributes, dropping namespace declarations.
    fn parse_element<R: BufRead>(
        &self,
        e: &BytesStart,
        reader: &Reader<R>,
        entities: &Entities,
    ) -> Result<XmlElement> {
        let name = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr
                .unescape_value_with(|name: &str| lookup_entity(entities, name))
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            attributes.push(XmlAttribute::new(key, value));
        }

        Ok(XmlElement::new(name, attributes))
    }
}

/// Adds an element under the current parent, enforcing a single root element.
fn attach_element(element: XmlElement, node_stack: &[NodeRef]) -> Result<NodeRef> {
    let parent = node_stack
        .last()
        .ok_or_else(|| Error::Parse(format!("unexpected element {}", element)))?;
    if node_stack.len() == 1 && !parent.borrow().child_elements().is_empty() {
        return Err(Error::Parse(format!(
            "document has more than one root element (found {})",
            element
        )));
    }
    let node = new_node(Some(XmlContent::Element(element)));
    NodeInner::add_child_to_ref(parent, node.clone());
    Ok(node)
}

/// Moves accumulated text into a text node under the current parent.
///
/// Whitespace between top-level constructs is dropped; any other text outside
/// the root element is an error.
fn flush_text(current_text: &mut Option<String>, node_stack: &[NodeRef]) -> Result<()> {
    let Some(text) = current_text.take() else {
        return Ok(());
    };
    if text.is_empty() {
        return Ok(());
    }
    if node_stack.len() <= 1 {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::Parse(format!(
            "text outside of the root element: {:?}",
            text.trim()
        )));
    }
    if let Some(parent) = node_stack.last() {
        NodeInner::add_child_to_ref(parent, new_node(Some(XmlContent::Text(XmlText::new(text)))));
    }
    Ok(())
}

/// Records every `<!ENTITY name "value">` of a DOCTYPE's internal subset.
///
/// Parameter and external entities are skipped. The first declaration of a
/// name wins; a value may refer to entities declared before it.
fn declare_entities(doctype: &str, entities: &mut Entities) {
    let mut rest = doctype;
    while let Some(start) = rest.find(ENTITY_DECL) {
        rest = rest[start + ENTITY_DECL.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let body = &rest[1..];
        let Some(close) = body.find(quote) else {
            break;
        };
        let raw = &body[..close];
        rest = &body[close + 1..];

        if name.is_empty() || entities.contains_key(name) {
            continue;
        }
        let value = unescape_with(raw, |n: &str| lookup_entity(entities, n))
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string());
        entities.insert(name.to_string(), value);
    }
}

fn lookup_entity<'a>(entities: &'a Entities, name: &str) -> Option<&'a str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

/// Resolves a character reference (`#38`, `#x26`), a predefined entity
/// (`amp`) or an entity declared in the internal subset.
fn resolve_reference(name: &str, entities: &Entities) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::Parse(format!("invalid character reference &{};", name)));
    }
    lookup_entity(entities, name)
        .map(str::to_string)
        .ok_or_else(|| Error::Parse(format!("undefined entity &{};", name)))
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    XmlParser::new().parse_file(path)
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<Document> {
    XmlParser::new().parse_str(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_name(doc: &Document) -> String {
        doc.root_element()
            .borrow()
            .element()
            .unwrap()
            .qname()
            .to_string()
    }

    #[test]
    fn test_parse_simple_xml() {
        let doc = parse_str(r#"<?xml version="1.0"?><root><child>text</child></root>"#).unwrap();
        assert_eq!(root_name(&doc), "root");

        let root = doc.root_element().borrow();
        assert_eq!(root.child_count(), 1);
        let child = root.children()[0].borrow();
        assert_eq!(child.element().unwrap().name(), "child");
        assert_eq!(child.text_content(), "text");
    }

    #[test]
    fn test_parse_with_attributes() {
        let doc = parse_str(r#"<root id="foo" class="a &amp; b">content</root>"#).unwrap();
        let root = doc.root_element().borrow();
        let element = root.element().unwrap();
        assert_eq!(element.attribute("id"), Some("foo"));
        assert_eq!(element.attribute("class"), Some("a & b"));
    }

    #[test]
    fn test_namespace_declarations_are_not_attributes() {
        let xml = r#"<r:root xmlns:r="urn:r" xmlns="urn:d" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:r r.xsd"/>"#;
        let doc = parse_str(xml).unwrap();
        let root = doc.root_element().borrow();
        let element = root.element().unwrap();
        assert_eq!(element.name(), "root");
        assert_eq!(element.attributes().len(), 1);
        assert_eq!(element.attributes()[0].name(), "schemaLocation");
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let doc = parse_str("<root>  hello   world  </root>").unwrap();
        assert_eq!(doc.root_element().borrow().text_content(), "  hello   world  ");
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = parse_str("<root>a &lt; b &#x26; c<![CDATA[ <d> ]]>&#65;</root>").unwrap();
        assert_eq!(doc.root_element().borrow().text_content(), "a < b & c <d> A");
    }

    #[test]
    fn test_comments_leave_no_nodes() {
        let doc = parse_str("<root>a<!-- note -->b<a/></root>").unwrap();
        let root = doc.root_element().borrow();
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.text_content(), "ab");
    }

    #[test]
    fn test_internal_subset_entities() {
        let xml = r#"<!DOCTYPE r [
  <!ENTITY % skipped "p">
  <!ENTITY org "Klinik &amp; Co">
  <!ENTITY who 'Dr. &org;'>
  <!ENTITY ext SYSTEM "ext.txt">
  <!ENTITY org "ignored">
]>
<r by="&who;"><a>&org;</a><b>x&#65;&who;</b></r>"#;
        let doc = parse_str(xml).unwrap();
        let root = doc.root_element().borrow();
        assert_eq!(root.element().unwrap().attribute("by"), Some("Dr. Klinik & Co"));

        let children = root.child_elements();
        assert_eq!(children[0].borrow().text_content(), "Klinik & Co");
        assert_eq!(children[1].borrow().text_content(), "xADr. Klinik & Co");
    }

    #[test]
    fn test_undeclared_entity_is_rejected() {
        let err = parse_str(r#"<!DOCTYPE r [<!ENTITY e "x">]><r>&f;</r>"#).unwrap_err();
        assert!(err.to_string().contains("undefined entity &f;"));
        assert!(parse_str(r#"<!DOCTYPE r [<!ENTITY e "x">]><r>&e;</r>"#).is_ok());
    }

    #[test]
    fn test_empty_element() {
        let doc = parse_str("<root><empty /></root>").unwrap();
        let root = doc.root_element().borrow();
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.children()[0].borrow().child_count(), 0);
    }

    #[test]
    fn test_parent_links() {
        let doc = parse_str("<a><b><c>deep</c></b></a>").unwrap();
        let b = doc.root_element().borrow().children()[0].clone();
        let c = b.borrow().children()[0].clone();
        let parent = c.borrow().parent().upgrade().unwrap();
        assert!(std::rc::Rc::ptr_eq(&parent, &b));
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(parse_str("").is_err());
        assert!(parse_str("<a><b></a>").is_err());
        assert!(parse_str("<a>").is_err());
        assert!(parse_str("<a/><b/>").is_err());
        assert!(parse_str("<a/>trailing").is_err());
        assert!(parse_str("<a>&nbsp;</a>").is_err());
        assert!(parse_str(r#"<a x="1" x="2"/>"#).is_err());
    }

    #[test]
    fn test_parse_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xml");
        std::fs::write(&path, "<a><b></a>").unwrap();

        let err = parse_file(&path).unwrap_err();
        assert!(matches!(err, Error::ParseFile { .. }));
        assert!(err.to_string().contains("broken.xml"));
    }
}
