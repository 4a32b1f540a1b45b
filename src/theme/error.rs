//! Theme engine error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    /// Template parsing or rendering error, with its cause chain
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Reading an override template failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
