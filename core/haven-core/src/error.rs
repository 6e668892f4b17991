//! Error types for haven-core operations.
//!
//! Only construction-time seams (medium setup, pump spawning) surface errors.
//! The polling paths never return errors to the host; they degrade to
//! "act as if absent" and log through `tracing`.

/// All errors that can occur in haven-core operations.
#[derive(Debug, thiserror::Error)]
pub enum HavenError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using HavenError.
pub type Result<T> = std::result::Result<T, HavenError>;
