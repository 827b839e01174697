//! Application errors.

use thiserror::Error;
use versemark_core::config::ConfigError;
use versemark_core::host::HostError;
use versemark_core::storage::StorageError;
use versemark_render::RenderError;

/// Errors surfaced by the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Invalid session: {0}")]
    Session(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
