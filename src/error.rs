//! The unified error type for all pipeline operations.
//!
//! Each render stage wraps its failures with a stage label and the
//! underlying message; errors are propagated to the caller immediately
//! and never retried here. Font problems are deliberately absent: they
//! are warnings inside the resolver, not errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The external DSL compiler rejected the input; the message is
    /// passed through verbatim.
    #[error("DSL compile error: {0}")]
    Compile(String),
    #[error("deck parse error: {0}")]
    Parse(#[from] easel_model::ParseError),
    #[error("render error: {0}")]
    Render(#[from] easel_render_core::RenderError),
    #[error("unsupported output format: '{0}'")]
    UnsupportedFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fixture catalog error: {0}")]
    Catalog(String),
    #[error("fixture catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
