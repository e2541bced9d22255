//! Global error handling for dirsnap
//!
//! A single error type covers configuration, traversal, per-file reads and
//! output serialization.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for dirsnap operations
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Invalid flag or flag combination, detected before traversal
    #[error("Configuration error: {0}")]
    Config(String),

    /// Root path missing or not a directory
    #[error("Traversal error: {0}")]
    Traversal(String),

    /// A single file could not be read; recovered by the scanner
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Format-specific encoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Output sink errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SnapshotError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            _ => 1,
        }
    }
}

/// Specialized Result type for dirsnap operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Creates a SnapshotError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::SnapshotError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
