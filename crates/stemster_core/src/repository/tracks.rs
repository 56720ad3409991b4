//! Canonical on-disk track layout and its owner.
//!
//! The repository is the only code that mutates `stems/`. Staging is an
//! unconditional overwrite: the previous track's contents are gone the
//! moment a new job with the same derived name succeeds. To keep a
//! crash from leaving a half-merged track, the new directory is moved
//! next to its destination first and renamed into place only after the
//! old track is removed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::locks::NamedLocks;

use super::types::{archive_path, RepositoryError, RepositoryResult, Track};

/// Upload extensions the pipeline accepts.
pub const ACCEPTED_UPLOAD_EXTENSIONS: [&str; 3] = ["mp3", "wav", "flac"];

/// Sole owner of the uploads and stems directories.
pub struct TrackRepository {
    uploads_dir: PathBuf,
    stems_dir: PathBuf,
    locks: Arc<NamedLocks>,
}

impl TrackRepository {
    pub fn new(settings: &Settings) -> Self {
        Self::with_locks(
            settings.uploads_dir(),
            settings.stems_dir(),
            Arc::new(NamedLocks::new()),
        )
    }

    /// Create a repository sharing a lock registry with other components.
    pub fn with_locks(
        uploads_dir: impl Into<PathBuf>,
        stems_dir: impl Into<PathBuf>,
        locks: Arc<NamedLocks>,
    ) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            stems_dir: stems_dir.into(),
            locks,
        }
    }

    /// The shared per-track lock registry.
    pub fn locks(&self) -> Arc<NamedLocks> {
        Arc::clone(&self.locks)
    }

    pub fn stems_dir(&self) -> &Path {
        &self.stems_dir
    }

    /// Write a raw upload into the uploads area and return its path.
    pub fn save_upload(&self, bytes: &[u8], file_name: &str) -> RepositoryResult<PathBuf> {
        validate_name(file_name)?;
        let extension = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
            return Err(RepositoryError::UnsupportedUploadFormat(
                file_name.to_string(),
            ));
        }
        fs::create_dir_all(&self.uploads_dir)
            .map_err(|e| RepositoryError::io("creating uploads directory", e))?;

        let path = self.uploads_dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| RepositoryError::io("writing upload", e))?;

        tracing::info!("Saved upload: {}", path.display());
        Ok(path)
    }

    /// Move a freshly produced output directory into the canonical
    /// location under `track_name`, replacing any existing track.
    ///
    /// The resulting directory contains exactly the files of this run;
    /// nothing is merged with a prior run.
    pub fn stage(&self, source_dir: &Path, track_name: &str) -> RepositoryResult<Track> {
        let lock = self.locks.acquire(&track_lock_name(track_name));
        let _guard = lock.lock();
        self.stage_unlocked(source_dir, track_name)
    }

    /// [`stage`](Self::stage) without acquiring the track lock.
    ///
    /// The caller must already hold this track's lock.
    pub(crate) fn stage_unlocked(
        &self,
        source_dir: &Path,
        track_name: &str,
    ) -> RepositoryResult<Track> {
        validate_name(track_name)?;

        fs::create_dir_all(&self.stems_dir)
            .map_err(|e| RepositoryError::io("creating stems directory", e))?;

        // Move adjacent first so the final rename stays on one filesystem.
        let staging = self.stems_dir.join(format!(".{track_name}.staging"));
        if staging.exists() {
            fs::remove_dir_all(&staging)
                .map_err(|e| RepositoryError::io("clearing stale staging directory", e))?;
        }
        move_dir(source_dir, &staging)?;

        let final_dir = self.stems_dir.join(track_name);
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)
                .map_err(|e| RepositoryError::io("removing previous track", e))?;
        }

        fs::rename(&staging, &final_dir)
            .map_err(|e| RepositoryError::io("renaming staged track into place", e))?;

        tracing::info!(
            "Staged track '{}' from {}",
            track_name,
            source_dir.display()
        );
        read_track(&final_dir, track_name)
    }

    /// Read one track by name.
    pub fn track(&self, track_name: &str) -> RepositoryResult<Track> {
        validate_name(track_name)?;
        let dir = self.stems_dir.join(track_name);
        if !dir.is_dir() {
            return Err(RepositoryError::TrackNotFound(track_name.to_string()));
        }
        read_track(&dir, track_name)
    }

    /// All tracks, most recently modified first.
    pub fn list(&self) -> RepositoryResult<Vec<Track>> {
        if !self.stems_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.stems_dir)
            .map_err(|e| RepositoryError::io("reading stems directory", e))?;

        let mut tracks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RepositoryError::io("reading stems entry", e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            // Dot entries are staging leftovers, not tracks.
            if !path.is_dir() || name.starts_with('.') {
                continue;
            }
            tracks.push(read_track(&path, &name)?);
        }

        tracks.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(tracks)
    }

    /// Keep only the selected stem kinds in a track, removing the rest.
    ///
    /// Files whose base name is not a recognized stem are left alone.
    pub fn retain_stems(
        &self,
        track_name: &str,
        keep: &[crate::models::StemKind],
    ) -> RepositoryResult<Track> {
        let lock = self.locks.acquire(&track_lock_name(track_name));
        let _guard = lock.lock();
        self.retain_stems_unlocked(track_name, keep)
    }

    /// [`retain_stems`](Self::retain_stems) without acquiring the track lock.
    ///
    /// The caller must already hold this track's lock.
    pub(crate) fn retain_stems_unlocked(
        &self,
        track_name: &str,
        keep: &[crate::models::StemKind],
    ) -> RepositoryResult<Track> {
        validate_name(track_name)?;

        let dir = self.stems_dir.join(track_name);
        if !dir.is_dir() {
            return Err(RepositoryError::TrackNotFound(track_name.to_string()));
        }

        let track = read_track(&dir, track_name)?;
        for file in &track.stem_files {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let known: Option<crate::models::StemKind> = stem.parse().ok();
            if let Some(kind) = known {
                if !keep.contains(&kind) {
                    fs::remove_file(file)
                        .map_err(|e| RepositoryError::io("removing unselected stem", e))?;
                }
            }
        }

        read_track(&dir, track_name)
    }

    /// Remove a track and, if present, its cached archive.
    ///
    /// Archive invalidation here is mandatory, not best-effort: a
    /// deleted track must never resurface through a stale zip.
    pub fn delete(&self, track_name: &str) -> RepositoryResult<()> {
        validate_name(track_name)?;
        let lock = self.locks.acquire(&track_lock_name(track_name));
        let _guard = lock.lock();

        let dir = self.stems_dir.join(track_name);
        let archive = archive_path(&self.stems_dir, track_name);

        if !dir.exists() && !archive.exists() {
            return Err(RepositoryError::TrackNotFound(track_name.to_string()));
        }

        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|e| RepositoryError::io("removing track directory", e))?;
        }
        if archive.exists() {
            fs::remove_file(&archive)
                .map_err(|e| RepositoryError::io("removing track archive", e))?;
        }

        tracing::info!("Deleted track '{}'", track_name);
        Ok(())
    }
}

/// Lock name used for all mutating operations on one track.
pub(crate) fn track_lock_name(track_name: &str) -> String {
    format!("track:{track_name}")
}

fn validate_name(name: &str) -> RepositoryResult<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        return Err(RepositoryError::InvalidTrackName(name.to_string()));
    }
    Ok(())
}

fn read_track(dir: &Path, name: &str) -> RepositoryResult<Track> {
    let entries =
        fs::read_dir(dir).map_err(|e| RepositoryError::io("reading track directory", e))?;

    let mut stem_files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RepositoryError::io("reading track entry", e))?;
        let path = entry.path();
        if path.is_file() {
            stem_files.push(path);
        }
    }
    stem_files.sort();

    let modified = fs::metadata(dir)
        .and_then(|m| m.modified())
        .map_err(|e| RepositoryError::io("reading track mtime", e))?;

    Ok(Track {
        name: name.to_string(),
        stem_files,
        modified,
    })
}

/// Move a directory, falling back to copy+remove across filesystems.
fn move_dir(from: &Path, to: &Path) -> RepositoryResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    copy_dir_recursive(from, to)?;
    fs::remove_dir_all(from).map_err(|e| RepositoryError::io("removing moved source", e))?;
    Ok(())
}

fn copy_dir_recursive(from: &Path, to: &Path) -> RepositoryResult<()> {
    fs::create_dir_all(to).map_err(|e| RepositoryError::io("creating copy target", e))?;

    let entries = fs::read_dir(from).map_err(|e| RepositoryError::io("reading copy source", e))?;
    for entry in entries {
        let entry = entry.map_err(|e| RepositoryError::io("reading copy entry", e))?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        if src.is_dir() {
            copy_dir_recursive(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).map_err(|e| RepositoryError::io("copying stem file", e))?;
        }
    }
    Ok(())
}
