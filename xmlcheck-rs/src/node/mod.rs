//! Node structures for XML tree representation.
//!
//! A parsed document is a tree of `NodeInner` values behind `Rc<RefCell<..>>`.
//! Children are owned by their parent; each child keeps a weak reference back
//! to its parent so paths can be rebuilt from any node. The parser builds
//! under a content-less document node; a [`Document`] keeps only the root
//! element, so the root's parent link is empty.

mod xml_content;

pub use xml_content::{local_part, XmlAttribute, XmlContent, XmlElement, XmlText};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared handle to a tree node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// A weak back-reference to a node.
pub type WeakNodeRef = Weak<RefCell<NodeInner>>;

/// Wraps `content` in a fresh, parentless node.
pub fn new_node(content: Option<XmlContent>) -> NodeRef {
    Rc::new(RefCell::new(NodeInner::new(content)))
}

/// One node of a parsed tree.
///
/// The document node has no content and no parent; every other node holds an
/// element or a text run.
#[derive(Debug)]
pub struct NodeInner {
    children: Vec<NodeRef>,
    content: Option<XmlContent>,
    parent: WeakNodeRef,
}

impl NodeInner {
    /// Creates a detached node with the given content.
    pub fn new(content: Option<XmlContent>) -> Self {
        NodeInner {
            children: Vec::new(),
            content,
            parent: Weak::new(),
        }
    }

    /// Returns the element content, if this is an element node.
    pub fn element(&self) -> Option<&XmlElement> {
        self.content.as_ref().and_then(XmlContent::as_element)
    }

    /// Returns true if this node holds an element.
    pub fn is_element(&self) -> bool {
        self.element().is_some()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// All children, text runs included.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns the direct children that are elements, in document order.
    pub fn child_elements(&self) -> Vec<NodeRef> {
        self.children
            .iter()
            .filter(|c| c.borrow().is_element())
            .cloned()
            .collect()
    }

    pub fn parent(&self) -> &WeakNodeRef {
        &self.parent
    }

    /// Concatenates all descendant text in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(XmlContent::Text(t)) = &self.content {
            out.push_str(t.text());
        }
        for child in &self.children {
            child.borrow().collect_text(out);
        }
    }
}

impl NodeInner {
    /// Appends `child_ref` to `parent_ref` and points it back at its parent.
    pub fn add_child_to_ref(parent_ref: &NodeRef, child_ref: NodeRef) {
        child_ref.borrow_mut().parent = Rc::downgrade(parent_ref);
        parent_ref.borrow_mut().children.push(child_ref);
    }
}

/// A parsed, well-formed document.
#[derive(Debug, Clone)]
pub struct Document {
    root: NodeRef,
}

impl Document {
    /// Wraps a document node. Returns `None` when it has no element child.
    pub fn new(node: NodeRef) -> Option<Self> {
        let root = node.borrow().child_elements().into_iter().next()?;
        Some(Document { root })
    }

    /// The root element.
    pub fn root_element(&self) -> &NodeRef {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str) -> NodeRef {
        new_node(Some(XmlContent::Element(XmlElement::new(name, Vec::new()))))
    }

    fn text(value: &str) -> NodeRef {
        new_node(Some(XmlContent::Text(XmlText::new(value))))
    }

    #[test]
    fn test_add_child_links_parent() {
        let parent = element("parent");
        let child1 = element("child1");
        let child2 = element("child2");

        NodeInner::add_child_to_ref(&parent, child1.clone());
        NodeInner::add_child_to_ref(&parent, child2.clone());

        assert_eq!(parent.borrow().child_count(), 2);
        assert!(Rc::ptr_eq(&parent.borrow().children()[1], &child2));

        let back = child2.borrow().parent().upgrade().unwrap();
        assert!(Rc::ptr_eq(&back, &parent));
    }

    #[test]
    fn test_child_elements_skip_text() {
        let parent = element("parent");
        NodeInner::add_child_to_ref(&parent, text("lead"));
        NodeInner::add_child_to_ref(&parent, element("a"));
        NodeInner::add_child_to_ref(&parent, text("tail"));

        let elements = parent.borrow().child_elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].borrow().element().unwrap().name(), "a");
    }

    #[test]
    fn test_text_content_is_recursive() {
        let parent = element("p");
        let inner = element("b");
        NodeInner::add_child_to_ref(&parent, text("Hello "));
        NodeInner::add_child_to_ref(&inner, text("big"));
        NodeInner::add_child_to_ref(&parent, inner);
        NodeInner::add_child_to_ref(&parent, text(" world"));

        assert_eq!(parent.borrow().text_content(), "Hello big world");
    }

    #[test]
    fn test_document_requires_root_element() {
        let doc = new_node(None);
        assert!(Document::new(doc.clone()).is_none());

        let root = element("root");
        NodeInner::add_child_to_ref(&doc, root.clone());
        let document = Document::new(doc).unwrap();
        assert!(Rc::ptr_eq(document.root_element(), &root));
    }
}
