//! Charset meta injector.
//!
//! Runs after [`AmpRewriter`](super::AmpRewriter) because only the full walk
//! knows whether the document already declares a charset. Appends
//! `<meta charset="utf-8">` to the first `<head>` in document order; a document
//! without a `<head>` is left as is.

use super::Transform;
use super::amp::Traversal;
use crate::dom::{Attr, Document};

pub const CHARSET: &str = "utf-8";

pub struct CharsetInjector<'a> {
    traversal: &'a mut Traversal,
}

impl<'a> CharsetInjector<'a> {
    pub fn new(traversal: &'a mut Traversal) -> Self {
        Self { traversal }
    }
}

impl Transform for CharsetInjector<'_> {
    fn transform(self, mut doc: Document) -> Document {
        if !self.traversal.facts.needs_charset {
            return doc;
        }

        let Some(head) = doc.find_element("head") else {
            return doc;
        };
        let meta = doc.create_element("meta", vec![Attr::new("charset", CHARSET)]);
        doc.append_child(head, meta);
        self.traversal.stats.charset_injected = true;
        doc
    }
}
