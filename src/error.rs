use thiserror::Error;

/// Main error type for the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The EPUB parser collaborator could not supply metadata.
    #[error("Metadata extraction failed: {0}")]
    MetadataExtractionFailed(String),

    /// Local or remote lookup miss.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No authenticated session for a remote operation.
    #[error("No authenticated session")]
    Unauthenticated,

    /// Network or backend error, distinct from "no data".
    #[error("Remote backend unavailable: {0}")]
    RemoteUnavailable(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (local storage, invariant violations).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether this error represents a missing resource rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
