//! Renderer errors.

use thiserror::Error;

/// Errors of the raster pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("No view for document {0}")]
    UnknownDocument(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
