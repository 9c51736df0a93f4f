//! `[format]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [format]
//! pretty = true    # One node per line, indented
//! indent = 2       # Spaces per nesting level
//! ```

use serde::{Deserialize, Serialize};

use crate::dom::RenderOptions;

/// Largest accepted `format.indent`.
pub const MAX_INDENT: usize = 8;

/// Output formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Pretty-print the output.
    pub pretty: bool,

    /// Spaces per nesting level when `pretty` is set.
    pub indent: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            pretty: defaults.pretty,
            indent: defaults.indent,
        }
    }
}

impl FormatConfig {
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            pretty: self.pretty,
            indent: self.indent,
        }
    }
}
