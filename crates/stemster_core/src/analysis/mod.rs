//! Audio traits analysis boundary.
//!
//! Key/tempo estimation is an external collaborator: the pipeline only
//! depends on this trait, and failures are downgraded to a warning on
//! the job outcome rather than aborting the run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The 12 pitch-class names an estimated key is drawn from.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Estimated musical traits of an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTraits {
    /// One of [`PITCH_CLASSES`].
    pub key: String,
    /// Estimated tempo in beats per minute. Always positive.
    pub tempo_bpm: f64,
}

/// Analysis failed. Non-fatal for the pipeline.
#[derive(Error, Debug)]
#[error("Audio analysis failed: {0}")]
pub struct AnalysisError(pub String);

/// Estimates key and tempo for an audio file.
pub trait TrackAnalyzer: Send + Sync {
    fn analyze(&self, path: &Path) -> Result<AudioTraits, AnalysisError>;
}
