//! Arena-backed HTML tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Each node
//! carries parent / first-child / last-child / previous-sibling / next-sibling
//! links, so removal and insertion are O(1) and never invalidate the ids of
//! unrelated nodes.
//!
//! # Modules
//!
//! - `parse`: html5ever `TreeSink` that builds a [`Document`]
//! - `render`: HTML serializer (compact and pretty)
//! - `error`: [`DomError`]

mod error;
mod parse;
mod render;

use html5ever::{LocalName, Namespace, QualName};

pub use error::DomError;
pub use parse::parse;
pub use render::{RenderOptions, render};

/// HTML namespace URL.
pub const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single attribute. `value == None` is a boolean attribute (`<html amp>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Element payload.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<Attr>,
}

impl Element {
    /// Local tag name (`"img"`, `"amp-img"`, ...).
    #[inline]
    pub fn tag(&self) -> &str {
        &self.name.local
    }

    /// Whether the element is in the HTML namespace.
    #[inline]
    pub fn is_html(&self) -> bool {
        &*self.name.ns == HTML_NS
    }

    /// First attribute with the given key.
    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    data: NodeData,
}

impl Node {
    const fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            data,
        }
    }
}

/// An HTML document tree.
///
/// Detached nodes stay in the arena but are unreachable from [`Document::root`].
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    #[inline]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<Attr>) -> NodeId {
        let name = QualName::new(None, Namespace::from(HTML_NS), LocalName::from(tag));
        self.create_element_qualified(name, attrs)
    }

    pub(crate) fn create_element_qualified(&mut self, name: QualName, attrs: Vec<Attr>) -> NodeId {
        self.push(NodeData::Element(Element { name, attrs }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    pub fn create_doctype(
        &mut self,
        name: impl Into<String>,
        public_id: impl Into<String>,
        system_id: impl Into<String>,
    ) -> NodeId {
        self.push(NodeData::Doctype {
            name: name.into(),
            public_id: public_id.into(),
            system_id: system_id.into(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    #[inline]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    #[inline]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).data {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).data {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// Local tag name if `id` is an element.
    #[inline]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    #[inline]
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    /// Iterate direct children in order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// Iterate `id` and all of its descendants in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: Some(id),
        }
    }

    /// First element with `tag` in document order.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root()).find(|&id| self.is_tag(id, tag))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Unlink `id` from its parent and siblings. Its own subtree is untouched.
    pub fn detach(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        let parent = node.parent.take();
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();

        match next {
            Some(next) => self.node_mut(next).prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent).last_child = prev;
                }
            }
        }
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent).first_child = next;
                }
            }
        }
    }

    /// Append `child` as the last child of `parent`, moving it if already linked.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.node(parent).last_child;

        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.prev_sibling = last;

        match last {
            Some(last) => {
                debug_assert!(self.node(last).next_sibling.is_none());
                self.node_mut(last).next_sibling = Some(child);
            }
            None => {
                debug_assert!(self.node(parent).first_child.is_none());
                self.node_mut(parent).first_child = Some(child);
            }
        }
        self.node_mut(parent).last_child = Some(child);
    }

    /// Insert `child` immediately before `sibling`, moving it if already linked.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        self.detach(child);
        let parent = self.node(sibling).parent;
        let prev = self.node(sibling).prev_sibling;

        let node = self.node_mut(child);
        node.parent = parent;
        node.prev_sibling = prev;
        node.next_sibling = Some(sibling);

        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(child),
            None => {
                if let Some(parent) = parent {
                    self.node_mut(parent).first_child = Some(child);
                }
            }
        }
        self.node_mut(sibling).prev_sibling = Some(child);
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let mut next = self.first_child(from);
        while let Some(child) = next {
            next = self.next_sibling(child);
            self.append_child(to, child);
        }
    }

    /// Change an element's local name in place. Attributes and children are kept.
    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let Some(elem) = self.element_mut(id) {
            elem.name.local = LocalName::from(tag);
        }
    }

    /// Replace an element's whole attribute list.
    pub fn replace_attrs(&mut self, id: NodeId, attrs: Vec<Attr>) {
        if let Some(elem) = self.element_mut(id) {
            elem.attrs = attrs;
        }
    }

    /// Append `text` to `parent`, merging into a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.last_child(parent)
            && let NodeData::Text(existing) = &mut self.node_mut(last).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text);
        self.append_child(parent, node);
    }
}

/// Iterator over direct children.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = self.doc.first_child(current).or_else(|| {
            let mut node = current;
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(next) = self.doc.next_sibling(node) {
                    return Some(next);
                }
                node = self.doc.parent(node)?;
            }
        });

        Some(current)
    }
}
