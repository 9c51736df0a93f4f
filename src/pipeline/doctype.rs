//! Doctype finalizer.
//!
//! Applied to serialized text, not to the tree: the output only needs to
//! start with the literal AMP doctype.

pub const AMP_DOCTYPE: &str = "<!DOCTYPE html>";

/// Prefix `html` with [`AMP_DOCTYPE`] when the document did not declare one.
///
/// Compact output gets the bare prefix. Pretty output puts the doctype on its
/// own line.
pub fn finalize(html: String, needs_doctype: bool, pretty: bool) -> String {
    if !needs_doctype {
        return html;
    }
    let separator = if pretty && !html.is_empty() { "\n" } else { "" };
    format!("{AMP_DOCTYPE}{separator}{html}")
}
