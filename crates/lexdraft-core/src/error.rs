//! Error types for the Lexdraft editing core.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Lexdraft workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
///
/// A suggestion that no longer matches the document is deliberately *not* an
/// error: it is reported as `SuggestionOutcome::NotFound`.
#[derive(Error, Debug, Clone, Serialize)]
pub enum LexdraftError {
    /// The document cannot be saved as-is (e.g. its resolved title is empty).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found upstream, with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The identity is not open in the editing session
    #[error("Document '{id}' is not open")]
    NotOpen { id: String },

    /// Closing a document with unsaved changes requires explicit confirmation
    #[error("Document '{id}' has unsaved changes; confirm to discard them")]
    CloseGuard { id: String },

    /// Failure reported by the persistence collaborator (load/create/update/export)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LexdraftError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a NotOpen error
    pub fn not_open(id: impl ToString) -> Self {
        Self::NotOpen { id: id.to_string() }
    }

    /// Creates a CloseGuard error
    pub fn close_guard(id: impl ToString) -> Self {
        Self::CloseGuard { id: id.to_string() }
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_not_open(&self) -> bool {
        matches!(self, Self::NotOpen { .. })
    }

    pub fn is_close_guard(&self) -> bool {
        matches!(self, Self::CloseGuard { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LexdraftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LexdraftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LexdraftError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LexdraftError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Collaborators built on `anyhow` surface as persistence failures.
impl From<anyhow::Error> for LexdraftError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// A type alias for `Result<T, LexdraftError>`.
pub type Result<T> = std::result::Result<T, LexdraftError>;
