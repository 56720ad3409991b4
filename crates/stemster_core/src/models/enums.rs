//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Demucs model used for source separation.
///
/// The set is closed: these are the models the bundled Demucs
/// installation ships with, and the value is passed verbatim to the
/// tool's `-n` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationModel {
    #[default]
    Htdemucs,
    Demucs48Hq,
    MdxExtra,
}

impl SeparationModel {
    /// Name as understood by the Demucs command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeparationModel::Htdemucs => "htdemucs",
            SeparationModel::Demucs48Hq => "demucs48_hq",
            SeparationModel::MdxExtra => "mdx_extra",
        }
    }

    /// All supported models.
    pub fn all() -> [SeparationModel; 3] {
        [
            SeparationModel::Htdemucs,
            SeparationModel::Demucs48Hq,
            SeparationModel::MdxExtra,
        ]
    }
}

impl std::fmt::Display for SeparationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SeparationModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "htdemucs" => Ok(SeparationModel::Htdemucs),
            "demucs48_hq" => Ok(SeparationModel::Demucs48Hq),
            "mdx_extra" => Ok(SeparationModel::MdxExtra),
            other => Err(format!("unknown separation model: {other}")),
        }
    }
}

/// Compute device passed to the tool's `-d` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda),
            other => Err(format!("unknown device: {other}")),
        }
    }
}

/// On-disk format of a track's stem files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless WAV, as produced by the tool.
    #[default]
    Wav,
    /// Compressed MP3, transcoded after staging.
    Mp3,
}

impl ExportFormat {
    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Wav => "wav",
            ExportFormat::Mp3 => "mp3",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wav" => Ok(ExportFormat::Wav),
            "mp3" => Ok(ExportFormat::Mp3),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// One isolated audio component produced by separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemKind {
    Vocals,
    Drums,
    Bass,
    Other,
}

impl StemKind {
    /// Base filename the tool writes for this stem.
    pub fn file_stem(&self) -> &'static str {
        match self {
            StemKind::Vocals => "vocals",
            StemKind::Drums => "drums",
            StemKind::Bass => "bass",
            StemKind::Other => "other",
        }
    }

    /// The full four-stem set.
    pub fn all() -> [StemKind; 4] {
        [
            StemKind::Vocals,
            StemKind::Drums,
            StemKind::Bass,
            StemKind::Other,
        ]
    }
}

impl std::fmt::Display for StemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

impl std::str::FromStr for StemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vocals" => Ok(StemKind::Vocals),
            "drums" => Ok(StemKind::Drums),
            "bass" => Ok(StemKind::Bass),
            "other" => Ok(StemKind::Other),
            other => Err(format!("unknown stem: {other}")),
        }
    }
}

/// Lifecycle stage of a separation job.
///
/// `Running` is entered on successful process spawn. A job leaves it
/// for `Failed` when the process exits non-zero or no output directory
/// is found, and for `Succeeded` only after staging (and any requested
/// conversion) completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Succeeded | JobStage::Failed)
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStage::Pending => write!(f, "pending"),
            JobStage::Running => write!(f, "running"),
            JobStage::Succeeded => write!(f, "succeeded"),
            JobStage::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_round_trip() {
        for model in SeparationModel::all() {
            let parsed: SeparationModel = model.as_str().parse().unwrap();
            assert_eq!(parsed, model);
        }
    }

    #[test]
    fn unknown_model_rejected() {
        assert!("spleeter".parse::<SeparationModel>().is_err());
    }

    #[test]
    fn terminal_stages() {
        assert!(!JobStage::Pending.is_terminal());
        assert!(!JobStage::Running.is_terminal());
        assert!(JobStage::Succeeded.is_terminal());
        assert!(JobStage::Failed.is_terminal());
    }

    #[test]
    fn stem_set_is_complete() {
        let names: Vec<&str> = StemKind::all().iter().map(|s| s.file_stem()).collect();
        assert_eq!(names, vec!["vocals", "drums", "bass", "other"]);
    }
}
