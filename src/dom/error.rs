//! Tree construction and serialization errors.

use thiserror::Error;

/// Fatal errors from parsing or rendering a document.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to parse HTML input")]
    Parse(#[source] std::io::Error),

    #[error("failed to serialize HTML output")]
    Render(#[from] std::fmt::Error),
}
