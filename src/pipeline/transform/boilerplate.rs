//! AMP boilerplate fragments.
//!
//! Each call allocates a fresh detached subtree, so the two fragments never
//! share nodes with each other, with an earlier run, or with the input tree.

use crate::dom::{Attr, Document, NodeId};

/// Marker attribute carried by both boilerplate `<style>` elements.
pub const BOILERPLATE_ATTR: &str = "amp-boilerplate";

/// Hides the body until the AMP runtime has started.
pub const STYLE_CSS: &str = "body{-webkit-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-moz-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-ms-animation:-amp-start 8s steps(1,end) 0s 1 normal both;animation:-amp-start 8s steps(1,end) 0s 1 normal both}@-webkit-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-moz-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-ms-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-o-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}";

/// Keeps the body visible when scripting is disabled.
pub const NOSCRIPT_CSS: &str =
    "body{-webkit-animation:none;-moz-animation:none;-ms-animation:none;animation:none}";

fn boilerplate_style(doc: &mut Document, css: &str) -> NodeId {
    let style = doc.create_element("style", vec![Attr::boolean(BOILERPLATE_ATTR)]);
    let text = doc.create_text(css);
    doc.append_child(style, text);
    style
}

/// `<style amp-boilerplate>…</style>`
pub fn style_fragment(doc: &mut Document) -> NodeId {
    boilerplate_style(doc, STYLE_CSS)
}

/// `<noscript><style amp-boilerplate>…</style></noscript>`
pub fn noscript_fragment(doc: &mut Document) -> NodeId {
    let noscript = doc.create_element("noscript", Vec::new());
    let style = boilerplate_style(doc, NOSCRIPT_CSS);
    doc.append_child(noscript, style);
    noscript
}
