//! AMP document transforms.
//!
//! # Modules
//!
//! - `amp`: single-pass rewriter (root marker, boilerplate, media, scripts)
//! - `boilerplate`: the two mandated `<head>` fragments
//! - `charset`: post-pass `<meta charset>` injection

mod amp;
pub mod boilerplate;
mod charset;

use crate::dom::Document;

pub use amp::{AmpRewriter, DocumentFacts, RewriteStats, Traversal};
pub use charset::CharsetInjector;

/// A whole-document rewrite step.
pub trait Transform: Sized {
    fn transform(self, doc: Document) -> Document;
}
