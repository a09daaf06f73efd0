//! Error types for slipway-core.

use crate::types::ConflictKind;
use thiserror::Error;

/// Result type alias using slipway-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for slipway operations
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (detected before any side effect)
    #[error("Invalid name '{0}': must match ^[a-z0-9]([a-z0-9-]*[a-z0-9])?$ and be at most 63 characters")]
    InvalidName(String),

    #[error("Namespace '{0}' is reserved for the cluster")]
    ReservedNamespace(String),

    // Conflict errors
    #[error("Project '{name}' already exists ({kind})")]
    Conflict { name: String, kind: ConflictKind },

    // Lookup errors
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    // Provisioning errors
    #[error("Failed to apply {resource}: {message}")]
    Provisioning { resource: String, message: String },

    #[error("Timed out waiting for {resource} to become ready after {attempts} attempts")]
    Timeout { resource: String, attempts: u32 },

    // External tool errors
    #[error("{tool} not found. Install {tool} to use Slipway.")]
    ToolNotFound { tool: String },

    #[error("Command failed: {cmd}\n{stderr}")]
    CommandFailed { cmd: String, stderr: String },

    // Repository host errors
    #[error("Repository host error: {0}")]
    RepoHost(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a command failure
    pub fn command_failed(cmd: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            cmd: cmd.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a fatal provisioning error for a named resource
    pub fn provisioning(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provisioning {
            resource: resource.into(),
            message: message.into(),
        }
    }
}
