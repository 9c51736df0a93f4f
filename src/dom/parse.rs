//! html5ever tree sink that builds a [`Document`].
//!
//! Template contents are attached as ordinary children of the `<template>`
//! element, and processing instructions (never produced by the HTML tokenizer)
//! are kept as comments.

use std::borrow::Cow;

use html5ever::interface::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    Attribute, ExpandedName, LocalName, Namespace, ParseOpts, QualName, parse_document,
};

use super::{Attr, Document, DomError, HTML_NS, NodeData, NodeId};

/// Parse an HTML document.
pub fn parse(text: &str) -> Result<Document, DomError> {
    parse_document(Sink::new(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut text.as_bytes())
        .map_err(DomError::Parse)
}

fn convert_attr(attr: Attribute) -> Attr {
    let name = match &attr.name.prefix {
        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
        None => attr.name.local.to_string(),
    };
    Attr {
        name,
        value: Some(attr.value.to_string()),
    }
}

struct Sink {
    doc: Document,
    /// Returned from `elem_name` for non-element handles.
    placeholder: QualName,
}

impl Sink {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            placeholder: QualName::new(None, Namespace::from(HTML_NS), LocalName::from("")),
        }
    }

    fn text_of(&mut self, id: Option<NodeId>) -> Option<&mut String> {
        match &mut self.doc.nodes[id?.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl TreeSink for Sink {
    type Handle = NodeId;
    type Output = Document;

    fn finish(self) -> Document {
        self.doc
    }

    fn parse_error(&mut self, _msg: Cow<'static, str>) {}

    fn get_document(&mut self) -> NodeId {
        self.doc.root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
        match self.doc.data(*target) {
            NodeData::Element(elem) => elem.name.expanded(),
            _ => self.placeholder.expanded(),
        }
    }

    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> NodeId {
        let attrs = attrs.into_iter().map(convert_attr).collect();
        self.doc.create_element_qualified(name, attrs)
    }

    fn create_comment(&mut self, text: StrTendril) -> NodeId {
        self.doc.create_comment(text.to_string())
    }

    fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> NodeId {
        self.doc.create_comment(format!("?{target} {data}"))
    }

    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(node) => self.doc.append_child(*parent, node),
            NodeOrText::AppendText(text) => self.doc.append_text(*parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        if self.doc.parent(*element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let doctype = self.doc.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        let root = self.doc.root();
        self.doc.append_child(root, doctype);
    }

    fn get_template_contents(&mut self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&mut self, _mode: QuirksMode) {}

    fn append_before_sibling(&mut self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(node) => self.doc.insert_before(*sibling, node),
            NodeOrText::AppendText(text) => {
                let prev = self.doc.prev_sibling(*sibling);
                if let Some(existing) = self.text_of(prev) {
                    existing.push_str(&text);
                    return;
                }
                let node = self.doc.create_text(text.to_string());
                self.doc.insert_before(*sibling, node);
            }
        }
    }

    fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Attribute>) {
        let Some(elem) = self.doc.element_mut(*target) else {
            return;
        };
        for attr in attrs.into_iter().map(convert_attr) {
            if !elem.has_attr(&attr.name) {
                elem.attrs.push(attr);
            }
        }
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        self.doc.detach(*target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        self.doc.reparent_children(*node, *new_parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_tags(doc: &Document, id: NodeId) -> Vec<String> {
        doc.children(id)
            .filter_map(|c| doc.tag(c).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_parse_implied_structure() {
        let doc = parse("<p>hi").unwrap();
        let html = doc.find_element("html").expect("implied html");
        assert_eq!(child_tags(&doc, html), vec!["head", "body"]);
        assert!(doc.find_element("p").is_some());
    }

    #[test]
    fn test_parse_doctype_node() {
        let doc = parse("<!DOCTYPE html><html></html>").unwrap();
        let first = doc.first_child(doc.root()).unwrap();
        match doc.data(first) {
            NodeData::Doctype { name, .. } => assert_eq!(name, "html"),
            other => panic!("expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_no_doctype() {
        let doc = parse("<html><body></body></html>").unwrap();
        let has_doctype = doc
            .descendants(doc.root())
            .any(|id| matches!(doc.data(id), NodeData::Doctype { .. }));
        assert!(!has_doctype);
    }

    #[test]
    fn test_parse_attributes_in_order() {
        let doc = parse(r#"<img src="a.jpg" alt="x" width=10>"#).unwrap();
        let img = doc.find_element("img").unwrap();
        let names: Vec<_> = doc
            .element(img)
            .unwrap()
            .attrs
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["src", "alt", "width"]);
    }

    #[test]
    fn test_parse_merges_adjacent_text() {
        let doc = parse("<p>a &amp; b</p>").unwrap();
        let p = doc.find_element("p").unwrap();
        assert_eq!(doc.children(p).count(), 1);
        let text = doc.first_child(p).unwrap();
        assert!(matches!(doc.data(text), NodeData::Text(t) if t == "a & b"));
    }

    #[test]
    fn test_parse_template_children_inline() {
        let doc = parse("<template><span>t</span></template>").unwrap();
        let template = doc.find_element("template").unwrap();
        assert_eq!(child_tags(&doc, template), vec!["span"]);
    }

    #[test]
    fn test_parse_script_in_head() {
        let doc = parse(r#"<html><head><script src="x.js"></script></head></html>"#).unwrap();
        let head = doc.find_element("head").unwrap();
        assert_eq!(child_tags(&doc, head), vec!["script"]);
    }
}
