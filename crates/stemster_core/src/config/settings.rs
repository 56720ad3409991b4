//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every directory the pipeline touches flows from here; there are no
//! module-level path constants, so tests run against isolated temporary
//! base directories.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::{Device, SeparationModel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Directory layout.
    #[serde(default)]
    pub paths: PathSettings,

    /// External separation tool configuration.
    #[serde(default)]
    pub separation: SeparationSettings,

    /// Format conversion configuration.
    #[serde(default)]
    pub conversion: ConversionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Raw upload files: `<base>/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.base().join(&self.paths.uploads_folder)
    }

    /// Canonical per-track stem directories: `<base>/stems`.
    pub fn stems_dir(&self) -> PathBuf {
        self.base().join(&self.paths.stems_folder)
    }

    /// The external tool's own scratch output tree, one subdirectory
    /// per model: `<base>/backend/demucs/separated`.
    pub fn separated_root(&self) -> PathBuf {
        self.base().join(&self.paths.separated_folder)
    }

    /// Working directory the tool is launched from.
    pub fn tool_workdir(&self) -> PathBuf {
        self.base().join(&self.separation.tool_workdir)
    }

    /// Directory for per-job log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.base().join(&self.logging.logs_folder)
    }

    fn base(&self) -> PathBuf {
        PathBuf::from(&self.paths.base_dir)
    }
}

/// Directory layout, all relative to a configured base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Base directory all other folders hang off.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Folder for raw input files.
    #[serde(default = "default_uploads_folder")]
    pub uploads_folder: String,

    /// Folder for canonical per-track stem directories.
    #[serde(default = "default_stems_folder")]
    pub stems_folder: String,

    /// The external tool's scratch output tree.
    #[serde(default = "default_separated_folder")]
    pub separated_folder: String,
}

fn default_base_dir() -> String {
    ".".to_string()
}

fn default_uploads_folder() -> String {
    "uploads".to_string()
}

fn default_stems_folder() -> String {
    "stems".to_string()
}

fn default_separated_folder() -> String {
    "backend/demucs/separated".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            uploads_folder: default_uploads_folder(),
            stems_folder: default_stems_folder(),
            separated_folder: default_separated_folder(),
        }
    }
}

/// External separation tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationSettings {
    /// Path or name of the tool binary.
    #[serde(default = "default_tool_binary")]
    pub tool_binary: String,

    /// Working directory the tool runs in, relative to the base dir.
    #[serde(default = "default_tool_workdir")]
    pub tool_workdir: String,

    /// Default model for new jobs.
    #[serde(default)]
    pub default_model: SeparationModel,

    /// Default compute device for new jobs.
    #[serde(default)]
    pub default_device: Device,

    /// Default number of random shifts for new jobs.
    #[serde(default = "default_shifts")]
    pub default_shifts: u32,

    /// Default window overlap fraction for new jobs.
    #[serde(default = "default_overlap")]
    pub default_overlap: f64,
}

fn default_tool_binary() -> String {
    "demucs".to_string()
}

fn default_tool_workdir() -> String {
    "backend/demucs".to_string()
}

fn default_shifts() -> u32 {
    1
}

fn default_overlap() -> f64 {
    0.25
}

impl Default for SeparationSettings {
    fn default() -> Self {
        Self {
            tool_binary: default_tool_binary(),
            tool_workdir: default_tool_workdir(),
            default_model: SeparationModel::default(),
            default_device: Device::default(),
            default_shifts: default_shifts(),
            default_overlap: default_overlap(),
        }
    }
}

/// Format conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Path or name of the ffmpeg binary used for transcoding.
    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,

    /// LAME VBR quality (0 best .. 9 worst). Fixed per run.
    #[serde(default = "default_mp3_quality")]
    pub mp3_quality: u32,
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_mp3_quality() -> u32 {
    2
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            ffmpeg_binary: default_ffmpeg_binary(),
            mp3_quality: default_mp3_quality(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Number of recent tool-output lines kept for error diagnosis.
    #[serde(default = "default_tail_lines")]
    pub tail_lines: u32,

    /// Prefix captured lines with a local timestamp.
    #[serde(default)]
    pub show_timestamps: bool,

    /// Write a per-job log file alongside the in-memory capture.
    #[serde(default)]
    pub write_job_logs: bool,

    /// Folder for per-job log files, relative to the base dir.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_tail_lines() -> u32 {
    40
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            tail_lines: default_tail_lines(),
            show_timestamps: false,
            write_job_logs: false,
            logs_folder: default_logs_folder(),
        }
    }
}

/// Identifies a settings section for atomic section-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Separation,
    Conversion,
    Logging,
}

impl ConfigSection {
    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Separation => "separation",
            ConfigSection::Conversion => "conversion",
            ConfigSection::Logging => "logging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_original_layout() {
        let settings = Settings::default();
        assert_eq!(settings.uploads_dir(), PathBuf::from("./uploads"));
        assert_eq!(settings.stems_dir(), PathBuf::from("./stems"));
        assert_eq!(
            settings.separated_root(),
            PathBuf::from("./backend/demucs/separated")
        );
        assert_eq!(settings.tool_workdir(), PathBuf::from("./backend/demucs"));
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.separation.tool_binary, "demucs");
        assert_eq!(settings.conversion.mp3_quality, 2);
        assert_eq!(settings.logging.tail_lines, 40);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: Settings =
            toml::from_str("[paths]\nbase_dir = \"/srv/stemster\"\n").unwrap();
        assert_eq!(settings.paths.base_dir, "/srv/stemster");
        assert_eq!(settings.paths.stems_folder, "stems");
        assert_eq!(settings.stems_dir(), PathBuf::from("/srv/stemster/stems"));
    }
}
