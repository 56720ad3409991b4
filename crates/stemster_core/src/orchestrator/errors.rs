//! Error types for the job orchestrator.
//!
//! Each fatal condition keeps its origin as a `#[source]` so failures
//! always surface the underlying cause, never a bare "something went
//! wrong". Process failures additionally carry the full captured log on
//! the outcome itself.

use thiserror::Error;

use crate::convert::ConversionError;
use crate::models::ParameterError;
use crate::repository::RepositoryError;
use crate::separation::SeparationError;

/// A separation job failed.
#[derive(Error, Debug)]
pub enum JobError {
    /// Parameters failed validation before anything ran.
    #[error("Invalid job parameters: {0}")]
    Parameters(#[from] ParameterError),

    /// Spawn failure, non-zero exit, or missing output directory.
    #[error(transparent)]
    Separation(#[from] SeparationError),

    /// Staging or other repository I/O failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Requested format conversion failed for at least one stem.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Result type for orchestrator operations.
pub type JobResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn separation_failures_keep_their_cause() {
        let err = JobError::from(SeparationError::ToolFailed {
            tool: "demucs".to_string(),
            exit_code: 1,
        });
        assert!(err.to_string().contains("demucs"));
        assert!(err.to_string().contains("exit code 1"));
    }

    #[test]
    fn parameter_failures_are_prefixed() {
        let err = JobError::from(ParameterError::NoStemsSelected);
        assert!(err.to_string().starts_with("Invalid job parameters"));
        assert!(err.source().is_some());
    }
}
