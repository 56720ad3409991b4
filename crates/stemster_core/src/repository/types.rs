//! Repository types and errors.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the track repository and archive cache.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Invalid track name: {0:?}")]
    InvalidTrackName(String),

    #[error("Unsupported upload format: {0:?} (accepted: mp3, wav, flac)")]
    UnsupportedUploadFormat(String),

    #[error("Archive error for track '{track}': {source}")]
    Archive {
        track: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl RepositoryError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A named, persisted collection of stem files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Name derived from the original upload's base filename.
    pub name: String,
    /// Stem file paths, sorted by filename.
    pub stem_files: Vec<PathBuf>,
    /// Last-modified timestamp of the track directory.
    pub modified: SystemTime,
}

impl Track {
    /// Local timestamp for display.
    pub fn modified_local(&self) -> chrono::DateTime<chrono::Local> {
        self.modified.into()
    }
}

/// Expected archive location for a track: `<stems>/<name>.zip`,
/// sibling to the track's stem directory.
pub fn archive_path(stems_dir: &Path, track_name: &str) -> PathBuf {
    stems_dir.join(format!("{track_name}.zip"))
}
