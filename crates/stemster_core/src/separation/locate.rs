//! Locating the tool's freshly written output directory.
//!
//! The tool names its output subdirectory non-deterministically, and a
//! stale subdirectory from a previous run may coexist with the new one.
//! Resolution therefore picks the most recently modified subdirectory.
//! This heuristic is only correct while at most one job per model is in
//! flight; the orchestrator holds a per-model lock for exactly that
//! reason.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::models::SeparationModel;

use super::types::{SeparationError, SeparationResult};

/// Resolve the directory the tool just wrote under `<root>/<model>/`.
///
/// Must be called immediately after the process exits successfully.
/// Fails with [`SeparationError::OutputNotFound`] when zero candidate
/// subdirectories exist.
pub fn resolve_output_dir(
    separated_root: &Path,
    model: SeparationModel,
) -> SeparationResult<PathBuf> {
    let model_root = separated_root.join(model.as_str());

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    if model_root.is_dir() {
        let entries = fs::read_dir(&model_root)
            .map_err(|e| SeparationError::io("reading separation output root", e))?;

        for entry in entries {
            let entry = entry.map_err(|e| SeparationError::io("reading output entry", e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|e| SeparationError::io("reading output mtime", e))?;

            match newest {
                Some((best, _)) if best >= modified => {}
                _ => newest = Some((modified, path)),
            }
        }
    }

    match newest {
        Some((_, path)) => {
            tracing::debug!("Resolved separation output: {}", path.display());
            Ok(path)
        }
        None => Err(SeparationError::OutputNotFound(model_root)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn picks_most_recent_of_many() {
        let dir = tempdir().unwrap();
        let model_root = dir.path().join("htdemucs");

        // Distinct mtimes; creation order is oldest first.
        for name in ["run_a", "run_b", "run_c"] {
            fs::create_dir_all(model_root.join(name)).unwrap();
            sleep(Duration::from_millis(20));
        }

        let resolved = resolve_output_dir(dir.path(), SeparationModel::Htdemucs).unwrap();
        assert_eq!(resolved, model_root.join("run_c"));
    }

    #[test]
    fn stale_run_loses_to_fresh_run() {
        let dir = tempdir().unwrap();
        let model_root = dir.path().join("htdemucs");
        fs::create_dir_all(model_root.join("stale")).unwrap();
        sleep(Duration::from_millis(20));
        fs::create_dir_all(model_root.join("fresh")).unwrap();
        // Touching the fresh dir bumps its mtime past the stale one.
        fs::write(model_root.join("fresh/vocals.wav"), b"riff").unwrap();

        let resolved = resolve_output_dir(dir.path(), SeparationModel::Htdemucs).unwrap();
        assert_eq!(resolved, model_root.join("fresh"));
    }

    #[test]
    fn zero_candidates_is_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("htdemucs")).unwrap();

        let result = resolve_output_dir(dir.path(), SeparationModel::Htdemucs);
        assert!(matches!(result, Err(SeparationError::OutputNotFound(_))));
    }

    #[test]
    fn missing_model_root_is_not_found() {
        let dir = tempdir().unwrap();
        let result = resolve_output_dir(dir.path(), SeparationModel::MdxExtra);
        assert!(matches!(result, Err(SeparationError::OutputNotFound(_))));
    }

    #[test]
    fn plain_files_are_not_candidates() {
        let dir = tempdir().unwrap();
        let model_root = dir.path().join("htdemucs");
        fs::create_dir_all(&model_root).unwrap();
        fs::write(model_root.join("stray.log"), b"noise").unwrap();

        let result = resolve_output_dir(dir.path(), SeparationModel::Htdemucs);
        assert!(matches!(result, Err(SeparationError::OutputNotFound(_))));
    }
}
