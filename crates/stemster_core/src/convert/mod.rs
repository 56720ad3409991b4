//! Stem format conversion via ffmpeg.
//!
//! Transcodes lossless stems to MP3 at a fixed quality after staging.
//! Every file is processed independently; failures are collected and
//! surfaced as one partial-failure error instead of silently leaving a
//! mixed-format track behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::config::ConversionSettings;
use crate::models::ExportFormat;

/// Conversion failed for some or all stem files.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("{} of {} stem files failed to convert", failed.len(), failed.len() + converted.len())]
    Partial {
        /// Files that were converted (originals already removed).
        converted: Vec<PathBuf>,
        /// Files that failed, with the underlying cause.
        failed: Vec<(PathBuf, String)>,
    },
}

/// Result type for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Transcodes staged stem files between formats.
pub struct FormatConverter {
    ffmpeg: String,
    mp3_quality: u32,
}

impl FormatConverter {
    pub fn new(settings: &ConversionSettings) -> Self {
        Self {
            ffmpeg: settings.ffmpeg_binary.clone(),
            mp3_quality: settings.mp3_quality,
        }
    }

    /// Convert the given stem files to the target format.
    ///
    /// A no-op when the target is lossless or the set is empty: the
    /// input paths come back unchanged and nothing touches the
    /// filesystem. Otherwise each WAV file is re-encoded next to
    /// itself and the original is removed on success.
    pub fn convert(
        &self,
        stem_files: &[PathBuf],
        target: ExportFormat,
    ) -> ConversionResult<Vec<PathBuf>> {
        if target == ExportFormat::Wav || stem_files.is_empty() {
            return Ok(stem_files.to_vec());
        }

        let mut converted = Vec::new();
        let mut failed = Vec::new();

        for stem in stem_files {
            if stem.extension().and_then(|e| e.to_str()) != Some("wav") {
                // Already compressed; nothing to do for this file.
                converted.push(stem.clone());
                continue;
            }

            let output = stem.with_extension(target.extension());
            match self.transcode(stem, &output) {
                Ok(()) => converted.push(output),
                Err(message) => failed.push((stem.clone(), message)),
            }
        }

        if failed.is_empty() {
            Ok(converted)
        } else {
            Err(ConversionError::Partial { converted, failed })
        }
    }

    fn transcode(&self, input: &Path, output: &Path) -> Result<(), String> {
        let result = Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-codec:a")
            .arg("libmp3lame")
            .arg("-qscale:a")
            .arg(self.mp3_quality.to_string())
            .arg(output)
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.ffmpeg))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(format!(
                "{} exited with code {}: {}",
                self.ffmpeg,
                result.status.code().unwrap_or(-1),
                stderr.trim()
            ));
        }

        fs::remove_file(input).map_err(|e| format!("failed to remove original: {e}"))?;

        tracing::debug!("Converted {} -> {}", input.display(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter_with(ffmpeg: &str) -> FormatConverter {
        FormatConverter {
            ffmpeg: ffmpeg.to_string(),
            mp3_quality: 2,
        }
    }

    #[test]
    fn empty_set_is_a_noop() {
        let converter = converter_with("/nonexistent/ffmpeg");
        let result = converter.convert(&[], ExportFormat::Mp3).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn lossless_target_is_a_noop() {
        let converter = converter_with("/nonexistent/ffmpeg");
        let files = vec![PathBuf::from("/stems/song/vocals.wav")];
        let result = converter.convert(&files, ExportFormat::Wav).unwrap();
        assert_eq!(result, files);
    }

    #[cfg(unix)]
    mod with_fake_ffmpeg {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::tempdir;

        // Args are: -y -i <input> -codec:a libmp3lame -qscale:a <q> <output>
        fn write_fake_ffmpeg(dir: &Path, body: &str) -> String {
            let path = dir.join("ffmpeg");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path.display().to_string()
        }

        fn write_stems(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
            names
                .iter()
                .map(|name| {
                    let path = dir.join(name);
                    fs::write(&path, b"riff").unwrap();
                    path
                })
                .collect()
        }

        #[test]
        fn converts_and_removes_originals() {
            let dir = tempdir().unwrap();
            let ffmpeg = write_fake_ffmpeg(dir.path(), "cp \"$3\" \"$8\"");
            let stems = write_stems(dir.path(), &["vocals.wav", "drums.wav"]);

            let converter = converter_with(&ffmpeg);
            let mut result = converter.convert(&stems, ExportFormat::Mp3).unwrap();
            result.sort();

            assert_eq!(
                result,
                vec![dir.path().join("drums.mp3"), dir.path().join("vocals.mp3")]
            );
            assert!(!dir.path().join("vocals.wav").exists());
            assert!(!dir.path().join("drums.wav").exists());
        }

        #[test]
        fn one_bad_file_surfaces_as_partial_failure() {
            let dir = tempdir().unwrap();
            let ffmpeg = write_fake_ffmpeg(
                dir.path(),
                "case \"$3\" in *drums*) exit 1;; esac\ncp \"$3\" \"$8\"",
            );
            let stems = write_stems(dir.path(), &["vocals.wav", "drums.wav", "bass.wav"]);

            let converter = converter_with(&ffmpeg);
            let err = converter.convert(&stems, ExportFormat::Mp3).unwrap_err();

            let ConversionError::Partial { converted, failed } = err;
            assert_eq!(converted.len(), 2);
            assert_eq!(failed.len(), 1);
            assert!(failed[0].0.ends_with("drums.wav"));
            // The failed original must survive for diagnosis.
            assert!(dir.path().join("drums.wav").exists());
        }

        #[test]
        fn missing_ffmpeg_fails_every_file() {
            let dir = tempdir().unwrap();
            let stems = write_stems(dir.path(), &["vocals.wav"]);

            let converter = converter_with("/nonexistent/ffmpeg");
            let err = converter.convert(&stems, ExportFormat::Mp3).unwrap_err();

            let ConversionError::Partial { converted, failed } = err;
            assert!(converted.is_empty());
            assert_eq!(failed.len(), 1);
        }
    }
}
