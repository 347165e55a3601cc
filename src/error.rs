//! Terrain error handling
//!
//! Crate-wide error type plus the context helpers the collaborator
//! boundaries use to tag failures with the operation that produced them.

use std::path::PathBuf;

/// Crate-wide result type
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Terrain errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    #[error("Invalid configuration field {field}: {reason}")]
    Config { field: String, reason: String },

    #[error("Failed to read config {path:?}: {error}")]
    ConfigIo { path: PathBuf, error: String },

    #[error("Failed to parse config {path:?}: {error}")]
    ConfigParse { path: PathBuf, error: String },

    #[error("Physics operation {operation} failed: {error}")]
    Physics { operation: String, error: String },

    #[error("Render operation {operation} failed: {error}")]
    Render { operation: String, error: String },

    #[error("Invalid tracked position: {x}")]
    InvalidTrackedPosition { x: f64 },

    #[error("Terrain has been disposed")]
    Disposed,

    #[error("Unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },

    #[error("Invalid seed string: {input}")]
    InvalidSeed { input: String },
}

/// Error context for collaborator calls
pub trait TerrainErrorContext<T> {
    fn physics_context(self, operation: &str) -> TerrainResult<T>;
    fn render_context(self, operation: &str) -> TerrainResult<T>;
}

impl<T, E> TerrainErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn physics_context(self, operation: &str) -> TerrainResult<T> {
        self.map_err(|e| TerrainError::Physics {
            operation: operation.to_string(),
            error: e.to_string(),
        })
    }

    fn render_context(self, operation: &str) -> TerrainResult<T> {
        self.map_err(|e| TerrainError::Render {
            operation: operation.to_string(),
            error: e.to_string(),
        })
    }
}

/// Create a config validation error
pub fn invalid_config(field: &str, reason: impl std::fmt::Display) -> TerrainError {
    TerrainError::Config {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
