//! Single-pass AMP rewriter.
//!
//! Walks the tree depth-first in pre-order and applies, per element:
//!
//! | Tag                              | Rewrite                                  |
//! |----------------------------------|------------------------------------------|
//! | `html`                           | attributes replaced by a bare `amp`      |
//! | `head`                           | boilerplate `<style>` + `<noscript>` appended |
//! | `img`, `iframe`, `video`, `audio`| renamed to `amp-*`                       |
//! | `meta[charset]`                  | recorded, no change                      |
//! | `script`                         | detached with its subtree                |
//!
//! A `<!DOCTYPE html>` node is recorded as well. The recorded facts drive the
//! charset injector and the doctype finalizer that run afterwards.

use super::Transform;
use super::boilerplate::{noscript_fragment, style_fragment};
use crate::dom::{Attr, Document, NodeData, NodeId};

/// Media tags and their AMP custom-element replacements.
const MEDIA_TAGS: &[(&str, &str)] = &[
    ("img", "amp-img"),
    ("iframe", "amp-iframe"),
    ("video", "amp-video"),
    ("audio", "amp-audio"),
];

/// Document-level facts collected by the walk. Each flag only goes true -> false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentFacts {
    /// No `<meta charset>` seen yet.
    pub needs_charset: bool,
    /// No `<!DOCTYPE html>` seen yet.
    pub needs_doctype: bool,
}

impl Default for DocumentFacts {
    fn default() -> Self {
        Self {
            needs_charset: true,
            needs_doctype: true,
        }
    }
}

/// What the rewrite changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    /// Media elements renamed to `amp-*`.
    pub renamed: usize,
    /// `<script>` elements removed (subtrees not counted).
    pub scripts_removed: usize,
    /// `<head>` elements that received boilerplate.
    pub heads: usize,
    /// Whether a `<meta charset>` was injected after the walk.
    pub charset_injected: bool,
}

/// Traversal context threaded through one document's transforms.
///
/// Create one per document; nothing in it is shared between runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    pub facts: DocumentFacts,
    pub stats: RewriteStats,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Root,
    Head,
    Media(&'static str),
    Meta,
    Keep,
}

impl Rule {
    fn for_tag(tag: &str) -> Self {
        match tag {
            "html" => Self::Root,
            "head" => Self::Head,
            "meta" => Self::Meta,
            _ => MEDIA_TAGS
                .iter()
                .find(|(from, _)| *from == tag)
                .map_or(Self::Keep, |&(_, to)| Self::Media(to)),
        }
    }
}

/// Rewrites an arbitrary HTML tree toward the AMP document structure.
pub struct AmpRewriter<'a> {
    traversal: &'a mut Traversal,
}

impl<'a> AmpRewriter<'a> {
    pub fn new(traversal: &'a mut Traversal) -> Self {
        Self { traversal }
    }

    fn visit(&mut self, doc: &mut Document, id: NodeId) {
        if !self.apply(doc, id) {
            return;
        }

        let mut next = doc.first_child(id);
        while let Some(child) = next {
            // Read before visiting: the child may detach itself.
            next = doc.next_sibling(child);
            self.visit(doc, child);
        }
    }

    /// Apply the node's rule. Returns `false` if the node was detached.
    fn apply(&mut self, doc: &mut Document, id: NodeId) -> bool {
        let rule = match doc.data(id) {
            NodeData::Element(elem) => Rule::for_tag(elem.tag()),
            NodeData::Doctype { name, .. } => {
                if name == "html" {
                    self.traversal.facts.needs_doctype = false;
                }
                return true;
            }
            _ => return true,
        };

        match rule {
            Rule::Root => doc.replace_attrs(id, vec![Attr::boolean("amp")]),
            Rule::Head => {
                let style = style_fragment(doc);
                doc.append_child(id, style);
                let noscript = noscript_fragment(doc);
                doc.append_child(id, noscript);
                self.traversal.stats.heads += 1;
            }
            Rule::Media(amp_tag) => {
                doc.rename(id, amp_tag);
                self.traversal.stats.renamed += 1;
            }
            Rule::Meta => {
                if doc.element(id).is_some_and(|e| e.has_attr("charset")) {
                    self.traversal.facts.needs_charset = false;
                }
            }
            Rule::Keep => {}
        }

        if doc.is_tag(id, "script") {
            doc.detach(id);
            self.traversal.stats.scripts_removed += 1;
            return false;
        }
        true
    }
}

impl Transform for AmpRewriter<'_> {
    fn transform(mut self, mut doc: Document) -> Document {
        let root = doc.root();
        self.visit(&mut doc, root);
        doc
    }
}
