//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;
use tripstack_core::ConstructError;

/// Result type alias for the CLI crate.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur while synthesizing or inspecting the stack.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid stack declaration: {0}")]
    Construct(#[from] ConstructError),

    #[error("Asset path '{}' does not exist", .0.display())]
    AssetNotFound(PathBuf),

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidConfig {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Template '{}' is not valid JSON: {source}", path.display())]
    InvalidTemplate {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
