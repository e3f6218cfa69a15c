// Profiling error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while planning or driving a profiled workload
#[derive(Error, Debug)]
pub enum ProfilingError {
    /// The profiling backend could not be directed to start or stop
    #[error("Profiler backend rejected '{directive}': {reason}")]
    BackendCommunication {
        /// Command string of the failed directive
        directive: String,
        /// Backend-reported cause
        reason: String,
    },

    /// No writable output directory could be resolved
    #[error("Cannot create output directory {}: {source}", path.display())]
    Resolution {
        /// Directory that could not be created
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed profiling metadata
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Structured metadata could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfilingError {
    /// Create a backend communication error for a directive
    pub fn backend(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendCommunication {
            directive: directive.into(),
            reason: reason.into(),
        }
    }

    /// Whether the backend failed, as opposed to local resolution or config loading
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::BackendCommunication { .. })
    }
}

/// Result type for profiling operations
pub type Result<T> = std::result::Result<T, ProfilingError>;
