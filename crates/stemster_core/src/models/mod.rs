//! Data model: enums and job structures shared across the crate.

mod enums;
mod jobs;

pub use enums::{Device, ExportFormat, JobStage, SeparationModel, StemKind};
pub use jobs::{derive_track_name, JobOutcome, JobParameters, ParameterError, MAX_SHIFTS};
