//! Error types for the separation pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from supervising the external separation tool.
#[derive(Error, Debug)]
pub enum SeparationError {
    /// The tool binary was missing or could not be executed.
    #[error("Failed to spawn '{tool}': {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran but exited non-zero.
    #[error("'{tool}' failed with exit code {exit_code}")]
    ToolFailed { tool: String, exit_code: i32 },

    /// The tool claimed success but left no candidate output directory.
    #[error("No separation output found under {0}")]
    OutputNotFound(PathBuf),

    /// File I/O error while supervising the run.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl SeparationError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for separation operations.
pub type SeparationResult<T> = Result<T, SeparationError>;
