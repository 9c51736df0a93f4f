//! HTML -> AMP processing pipeline.
//!
//! ```text
//! text ─parse─> Document ─AmpRewriter─> ─CharsetInjector─> ─render─> ─doctype─> text
//! ```
//!
//! Every call to [`compile`] owns its tree and its [`Traversal`], so documents
//! can be compiled from many threads at once without coordination.

pub mod doctype;
pub mod transform;

use crate::dom::{self, Document, DomError, RenderOptions};

pub use transform::{
    AmpRewriter, CharsetInjector, DocumentFacts, RewriteStats, Transform, Traversal,
};

// =============================================================================
// Types
// =============================================================================

/// Result of the compilation pipeline.
#[derive(Debug)]
pub struct CompileOutput {
    /// Serialized AMP document.
    pub html: String,
    /// Facts collected by the rewrite walk.
    pub facts: DocumentFacts,
    /// What the transforms changed.
    pub stats: RewriteStats,
}

/// Chains transforms over one document.
pub struct Pipeline {
    doc: Document,
}

impl Pipeline {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    #[inline]
    pub fn pipe<T: Transform>(self, transform: T) -> Self {
        Self {
            doc: transform.transform(self.doc),
        }
    }

    #[inline]
    pub fn into_inner(self) -> Document {
        self.doc
    }
}

// =============================================================================
// Compilation
// =============================================================================

/// Convert an HTML document to AMP HTML.
pub fn compile(input: &str, options: &RenderOptions) -> Result<CompileOutput, DomError> {
    let doc = dom::parse(input)?;
    let mut traversal = Traversal::default();

    let doc = Pipeline::new(doc)
        .pipe(AmpRewriter::new(&mut traversal))
        .pipe(CharsetInjector::new(&mut traversal))
        .into_inner();

    let html = dom::render(&doc, options)?;
    let html = doctype::finalize(html, traversal.facts.needs_doctype, options.pretty);

    Ok(CompileOutput {
        html,
        facts: traversal.facts,
        stats: traversal.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::doctype::AMP_DOCTYPE;

    const STYLE_OPEN: &str = "<style amp-boilerplate>";
    const NOSCRIPT_OPEN: &str = "<noscript><style amp-boilerplate>";
    const CHARSET_META: &str = r#"<meta charset="utf-8">"#;

    fn amp(input: &str) -> CompileOutput {
        compile(input, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let out = amp(
            r#"<html><head><script src="x.js"></script></head><body><img src="a.jpg"></body></html>"#,
        );
        let html = &out.html;

        assert!(html.starts_with(AMP_DOCTYPE));
        assert!(html.contains("<html amp>"));
        assert!(!html.contains("<script"));
        assert!(html.contains(r#"<amp-img src="a.jpg">"#));
        assert!(!html.contains("<img"));
        assert!(html.contains(STYLE_OPEN));
        assert!(html.contains(NOSCRIPT_OPEN));
        assert!(html.contains(CHARSET_META));

        let head_end = html.find("</head>").unwrap();
        assert!(html.find(CHARSET_META).unwrap() < head_end);
        assert!(html.find(STYLE_OPEN).unwrap() < html.find(NOSCRIPT_OPEN).unwrap());
        assert!(html.find(NOSCRIPT_OPEN).unwrap() < html.find(CHARSET_META).unwrap());
    }

    #[test]
    fn test_exact_compact_output() {
        let out = amp("<html><head></head><body><p>x</p></body></html>");
        let expected = format!(
            "{AMP_DOCTYPE}<html amp><head><style amp-boilerplate>{}</style><noscript><style amp-boilerplate>{}</style></noscript>{CHARSET_META}</head><body><p>x</p></body></html>",
            transform::boilerplate::STYLE_CSS,
            transform::boilerplate::NOSCRIPT_CSS,
        );
        assert_eq!(out.html, expected);
    }

    #[test]
    fn test_existing_charset_not_duplicated() {
        let out = amp(r#"<html><head><meta charset="utf-8"></head><body></body></html>"#);
        assert_eq!(out.html.matches("charset").count(), 1);
        assert!(!out.facts.needs_charset);
        assert!(!out.stats.charset_injected);
    }

    #[test]
    fn test_declared_doctype_not_duplicated() {
        let out = amp("<!DOCTYPE html><html><head></head><body></body></html>");
        assert!(out.html.starts_with("<!DOCTYPE html><html amp>"));
        assert_eq!(out.html.matches("<!DOCTYPE").count(), 1);
    }

    #[test]
    fn test_lowercase_doctype_recognized() {
        let out = amp("<!doctype html><p>x</p>");
        assert_eq!(out.html.matches("<!DOCTYPE html>").count(), 1);
        assert!(!out.facts.needs_doctype);
    }

    #[test]
    fn test_doctype_name_decides_prefix() {
        let out = amp(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"><html></html>"#,
        );
        // The parsed doctype name is "html", so no prefix is added.
        assert!(!out.facts.needs_doctype);

        let out = amp("<!DOCTYPE math><html></html>");
        assert!(out.facts.needs_doctype);
        assert!(out.html.starts_with("<!DOCTYPE html><!DOCTYPE math>"));
    }

    #[test]
    fn test_root_attributes_discarded() {
        let out = amp(r#"<html lang="en" dir="ltr"><body></body></html>"#);
        assert!(out.html.contains("<html amp>"));
        assert!(!out.html.contains("lang="));
    }

    #[test]
    fn test_media_attributes_preserved() {
        let out = amp(
            r#"<body><video src="v.mp4" width="640"><track kind="captions"></video><iframe src="https://example.com" frameborder="0"></iframe></body>"#,
        );
        assert!(out.html.contains(
            r#"<amp-video src="v.mp4" width="640"><track kind="captions"></amp-video>"#
        ));
        assert!(out.html.contains(
            r#"<amp-iframe src="https://example.com" frameborder="0"></amp-iframe>"#
        ));
        assert_eq!(out.stats.renamed, 2);
    }

    #[test]
    fn test_second_run_duplicates_boilerplate() {
        let first = amp("<html><head></head><body></body></html>");
        let second = amp(&first.html);

        // Re-parsed boolean attributes come back as `amp-boilerplate=""`.
        assert_eq!(second.html.matches("<style amp-boilerplate").count(), 4);
        assert_eq!(second.stats.heads, 1);
        assert_eq!(second.html.matches(NOSCRIPT_OPEN).count(), 2);
        assert_eq!(second.html.matches(CHARSET_META).count(), 1);
        assert_eq!(second.html.matches(AMP_DOCTYPE).count(), 1);
        assert_ne!(first.html, second.html);
    }

    #[test]
    fn test_escaped_markup_in_svg_stays_text() {
        let out = amp("<svg><style>&lt;/style&gt;&lt;img src=x onerror=alert(1)&gt;</style></svg>");
        assert!(out.html.contains("&lt;img src=x onerror=alert(1)&gt;"));

        let reparsed = dom::parse(&out.html).unwrap();
        let live_img = reparsed
            .descendants(reparsed.root())
            .any(|id| reparsed.is_tag(id, "img"));
        assert!(!live_img);
    }

    #[test]
    fn test_parser_always_supplies_head() {
        let out = amp("<p>hello</p>");
        assert_eq!(out.stats.heads, 1);
        assert!(out.stats.charset_injected);
        assert!(out.html.contains(CHARSET_META));
    }

    #[test]
    fn test_pretty_output() {
        let out = compile(
            "<html><head><script></script></head><body><h1>Test</h1><img src=a.jpg></body></html>",
            &RenderOptions {
                pretty: true,
                indent: 2,
            },
        )
        .unwrap();

        let lines: Vec<_> = out.html.lines().collect();
        assert_eq!(lines[0], AMP_DOCTYPE);
        assert_eq!(lines[1], "<html amp>");
        assert_eq!(lines[2], "  <head>");
        assert!(lines.contains(&"    <h1>Test</h1>"));
        assert!(lines.contains(&r#"    <amp-img src="a.jpg"></amp-img>"#));
        assert_eq!(*lines.last().unwrap(), "</html>");
    }

    #[test]
    fn test_independent_runs_share_nothing() {
        let inputs = ["<p>a</p>", r#"<meta charset="utf-8"><p>b</p>"#];
        let outputs: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| s.spawn(move || amp(input)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(outputs[0].facts.needs_charset);
        assert!(!outputs[1].facts.needs_charset);
    }
}
