//! HTML serializer.
//!
//! Compact mode follows the HTML fragment serialization algorithm. Pretty mode
//! re-indents block structure and drops whitespace-only text; it never adds or
//! removes elements.

use std::borrow::Cow;
use std::fmt::Write;

use super::{Document, DomError, Element, NodeData, NodeId};

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indent nested elements, one node per line.
    pub pretty: bool,
    /// Spaces per nesting level in pretty mode.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
        }
    }
}

/// Serialize the whole document.
pub fn render(doc: &Document, options: &RenderOptions) -> Result<String, DomError> {
    let mut out = String::new();
    let mut writer = Writer {
        doc,
        out: &mut out,
        indent: options.indent,
    };
    if options.pretty {
        writer.pretty_children(doc.root(), 0)?;
    } else {
        writer.compact(doc.root())?;
    }
    Ok(out)
}

// =============================================================================
// Element classification
// =============================================================================

/// HTML elements that never have an end tag.
#[inline]
fn is_void_element(elem: &Element) -> bool {
    elem.is_html()
        && matches!(
            elem.tag(),
            "area"
                | "base"
                | "basefont"
                | "bgsound"
                | "br"
                | "col"
                | "embed"
                | "frame"
                | "hr"
                | "img"
                | "input"
                | "keygen"
                | "link"
                | "meta"
                | "param"
                | "source"
                | "track"
                | "wbr"
        )
}

/// HTML elements whose text children are written without escaping.
///
/// `noscript` is included because the parser runs with scripting enabled and
/// reads its content as raw text. Foreign (SVG, MathML) elements always escape.
#[inline]
fn is_raw_text_element(elem: &Element) -> bool {
    elem.is_html()
        && matches!(
            elem.tag(),
            "style"
                | "script"
                | "xmp"
                | "iframe"
                | "noembed"
                | "noframes"
                | "noscript"
                | "plaintext"
        )
}

/// Elements whose content is whitespace-sensitive in pretty mode.
#[inline]
fn is_preformatted(elem: &Element) -> bool {
    is_raw_text_element(elem) || (elem.is_html() && matches!(elem.tag(), "pre" | "textarea"))
}

// =============================================================================
// Escaping
// =============================================================================

fn escape_with<'a>(s: &'a str, in_attr: bool) -> Cow<'a, str> {
    let needs = |c: char| match c {
        '&' | '\u{a0}' => true,
        '"' => in_attr,
        '<' | '>' => !in_attr,
        _ => false,
    };
    if !s.contains(needs) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            '"' if in_attr => result.push_str("&quot;"),
            '<' if !in_attr => result.push_str("&lt;"),
            '>' if !in_attr => result.push_str("&gt;"),
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[inline]
fn escape_text(s: &str) -> Cow<'_, str> {
    escape_with(s, false)
}

#[inline]
fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, true)
}

/// Quote a doctype identifier, switching to single quotes if it holds a `"`.
fn quoted(id: &str) -> String {
    if id.contains('"') {
        format!("'{id}'")
    } else {
        format!("\"{id}\"")
    }
}

// =============================================================================
// Writer
// =============================================================================

struct Writer<'a> {
    doc: &'a Document,
    out: &'a mut String,
    indent: usize,
}

impl Writer<'_> {
    fn open_tag(&mut self, elem: &Element) -> std::fmt::Result {
        write!(self.out, "<{}", elem.tag())?;
        for attr in &elem.attrs {
            match &attr.value {
                Some(value) => write!(self.out, " {}=\"{}\"", attr.name, escape_attr(value))?,
                None => write!(self.out, " {}", attr.name)?,
            }
        }
        self.out.push('>');
        Ok(())
    }

    fn leaf(&mut self, data: &NodeData, raw: bool) -> std::fmt::Result {
        match data {
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => {
                write!(self.out, "<!DOCTYPE {name}")?;
                if !public_id.is_empty() {
                    write!(self.out, " PUBLIC {}", quoted(public_id))?;
                    if !system_id.is_empty() {
                        write!(self.out, " {}", quoted(system_id))?;
                    }
                } else if !system_id.is_empty() {
                    write!(self.out, " SYSTEM {}", quoted(system_id))?;
                }
                self.out.push('>');
                Ok(())
            }
            NodeData::Comment(text) => write!(self.out, "<!--{text}-->"),
            NodeData::Text(text) if raw => {
                self.out.push_str(text);
                Ok(())
            }
            NodeData::Text(text) => {
                self.out.push_str(&escape_text(text));
                Ok(())
            }
            NodeData::Document | NodeData::Element(_) => Ok(()),
        }
    }

    fn compact(&mut self, id: NodeId) -> std::fmt::Result {
        let doc = self.doc;
        match doc.data(id) {
            NodeData::Document => {
                for child in doc.children(id) {
                    self.compact(child)?;
                }
                Ok(())
            }
            NodeData::Element(elem) => {
                self.open_tag(elem)?;
                if is_void_element(elem) {
                    return Ok(());
                }
                let raw = is_raw_text_element(elem);
                for child in doc.children(id) {
                    match doc.data(child) {
                        data @ NodeData::Text(_) => self.leaf(data, raw)?,
                        _ => self.compact(child)?,
                    }
                }
                write!(self.out, "</{}>", elem.tag())
            }
            data => self.leaf(data, false),
        }
    }

    fn newline_indent(&mut self, depth: usize) {
        self.out.push('\n');
        self.pad(depth);
    }

    fn pad(&mut self, depth: usize) {
        for _ in 0..depth * self.indent {
            self.out.push(' ');
        }
    }

    /// Whether every child is text (or there are none).
    fn text_only(&self, id: NodeId) -> bool {
        self.doc
            .children(id)
            .all(|c| matches!(self.doc.data(c), NodeData::Text(_)))
    }

    fn pretty_children(&mut self, parent: NodeId, depth: usize) -> std::fmt::Result {
        let doc = self.doc;
        for child in doc.children(parent) {
            if let NodeData::Text(text) = doc.data(child)
                && text.trim().is_empty()
            {
                continue;
            }
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.pad(depth);
            self.pretty(child, depth)?;
        }
        Ok(())
    }

    fn pretty(&mut self, id: NodeId, depth: usize) -> std::fmt::Result {
        let doc = self.doc;
        let elem = match doc.data(id) {
            NodeData::Element(elem) => elem,
            NodeData::Text(text) => {
                self.out.push_str(&escape_text(text.trim()));
                return Ok(());
            }
            data => return self.leaf(data, false),
        };

        self.open_tag(elem)?;
        let tag = elem.tag();
        if is_void_element(elem) {
            return Ok(());
        }

        if is_preformatted(elem) {
            let raw = is_raw_text_element(elem);
            for child in doc.children(id) {
                match doc.data(child) {
                    data @ NodeData::Text(_) => self.leaf(data, raw)?,
                    _ => self.compact(child)?,
                }
            }
        } else if self.text_only(id) {
            for child in doc.children(id) {
                if let NodeData::Text(text) = doc.data(child) {
                    self.out.push_str(&escape_text(text.trim()));
                }
            }
        } else {
            self.pretty_children(id, depth + 1)?;
            self.newline_indent(depth);
        }

        write!(self.out, "</{tag}>")
    }
}
