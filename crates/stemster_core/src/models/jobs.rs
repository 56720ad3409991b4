//! Job-related data structures (parameters, outcomes).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::{Device, ExportFormat, JobStage, SeparationModel, StemKind};

/// Maximum value of the shifts quality/speed trade-off.
pub const MAX_SHIFTS: u32 = 10;

/// Errors from validating job parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("overlap must be within [0.0, 1.0], got {0}")]
    OverlapOutOfRange(f64),

    #[error("shifts must be within [1, {MAX_SHIFTS}], got {0}")]
    ShiftsOutOfRange(u32),

    #[error("at least one stem must be selected")]
    NoStemsSelected,

    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("cannot derive a track name from input: {0}")]
    UnnamableInput(PathBuf),
}

/// Immutable per-run configuration for one separation job.
///
/// Built with defaults matching the interactive UI (one shift, 0.25
/// overlap, CPU, all four stems, lossless output) and validated just
/// before the job starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    /// Separation model passed to `-n`.
    pub model: SeparationModel,
    /// Number of random shifts (quality vs speed), `--shifts`.
    pub shifts: u32,
    /// Window overlap fraction in [0, 1], `--overlap`.
    pub overlap: f64,
    /// Compute device, `-d`.
    pub device: Device,
    /// Path to the uploaded input file.
    pub input_path: PathBuf,
    /// Stems the caller wants out of this run. Never empty.
    pub stems: Vec<StemKind>,
    /// Format the staged track should end up in.
    pub export_format: ExportFormat,
}

impl JobParameters {
    /// Create parameters for the given input with default settings.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            model: SeparationModel::default(),
            shifts: 1,
            overlap: 0.25,
            device: Device::default(),
            input_path: input_path.into(),
            stems: StemKind::all().to_vec(),
            export_format: ExportFormat::default(),
        }
    }

    pub fn with_model(mut self, model: SeparationModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_shifts(mut self, shifts: u32) -> Self {
        self.shifts = shifts;
        self
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_stems(mut self, stems: Vec<StemKind>) -> Self {
        self.stems = stems;
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    /// Validate the invariants documented on each field.
    ///
    /// The input file must exist at invocation time, not at build time.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(0.0..=1.0).contains(&self.overlap) {
            return Err(ParameterError::OverlapOutOfRange(self.overlap));
        }
        if self.shifts < 1 || self.shifts > MAX_SHIFTS {
            return Err(ParameterError::ShiftsOutOfRange(self.shifts));
        }
        if self.stems.is_empty() {
            return Err(ParameterError::NoStemsSelected);
        }
        if !self.input_path.is_file() {
            return Err(ParameterError::InputNotFound(self.input_path.clone()));
        }
        self.track_name()?;
        Ok(())
    }

    /// Track name derived from the upload's base filename.
    ///
    /// `song.final.wav` becomes `song.final`; collisions with an
    /// existing track overwrite it.
    pub fn track_name(&self) -> Result<String, ParameterError> {
        derive_track_name(&self.input_path)
            .ok_or_else(|| ParameterError::UnnamableInput(self.input_path.clone()))
    }

    /// Argument vector for the external tool.
    ///
    /// The order is part of the tool's command-line contract:
    /// `-n <model> --shifts <int> --overlap <float> -d <cpu|cuda> <input>`.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-n".to_string(),
            self.model.as_str().to_string(),
            "--shifts".to_string(),
            self.shifts.to_string(),
            "--overlap".to_string(),
            self.overlap.to_string(),
            "-d".to_string(),
            self.device.as_str().to_string(),
            self.input_path.display().to_string(),
        ]
    }
}

/// Derive a track name from a file path by stripping the last extension.
pub fn derive_track_name(path: &Path) -> Option<String> {
    let name = path.file_stem()?.to_string_lossy().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Terminal result of one separation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Terminal stage: `Succeeded` or `Failed`.
    pub stage: JobStage,
    /// Wall-clock duration of the run in seconds.
    pub elapsed_seconds: f64,
    /// Final stem directory. Present iff the job succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stem_dir: Option<PathBuf>,
    /// Every line the external tool emitted, in order.
    pub log_lines: Vec<String>,
    /// Most recent lines, bounded by the configured tail length.
    /// This is the excerpt callers show when a job fails.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log_tail: Vec<String>,
    /// Non-fatal problems (for example a failed key/tempo analysis).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Why the job failed. Present iff the job failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.stage == JobStage::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn args_follow_tool_contract_order() {
        let params = JobParameters::new("/music/song.wav")
            .with_model(SeparationModel::MdxExtra)
            .with_shifts(3)
            .with_overlap(0.5)
            .with_device(Device::Cuda);

        assert_eq!(
            params.to_args(),
            vec![
                "-n",
                "mdx_extra",
                "--shifts",
                "3",
                "--overlap",
                "0.5",
                "-d",
                "cuda",
                "/music/song.wav",
            ]
        );
    }

    #[test]
    fn overlap_bounds_enforced() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.wav");
        fs::write(&input, b"riff").unwrap();

        let params = JobParameters::new(&input).with_overlap(1.5);
        assert_eq!(
            params.validate(),
            Err(ParameterError::OverlapOutOfRange(1.5))
        );

        let params = JobParameters::new(&input).with_overlap(1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn shifts_bounds_enforced() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.wav");
        fs::write(&input, b"riff").unwrap();

        assert!(JobParameters::new(&input).with_shifts(0).validate().is_err());
        assert!(JobParameters::new(&input)
            .with_shifts(MAX_SHIFTS + 1)
            .validate()
            .is_err());
        assert!(JobParameters::new(&input)
            .with_shifts(MAX_SHIFTS)
            .validate()
            .is_ok());
    }

    #[test]
    fn missing_input_rejected() {
        let params = JobParameters::new("/nonexistent/song.wav");
        assert!(matches!(
            params.validate(),
            Err(ParameterError::InputNotFound(_))
        ));
    }

    #[test]
    fn empty_stem_selection_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.wav");
        fs::write(&input, b"riff").unwrap();

        let params = JobParameters::new(&input).with_stems(Vec::new());
        assert_eq!(params.validate(), Err(ParameterError::NoStemsSelected));
    }

    #[test]
    fn track_name_strips_last_extension_only() {
        assert_eq!(
            derive_track_name(Path::new("/uploads/my song.mp3")),
            Some("my song".to_string())
        );
        assert_eq!(
            derive_track_name(Path::new("/uploads/take.2.wav")),
            Some("take.2".to_string())
        );
    }
}
