//! Cached zip archives of track stem files.
//!
//! One archive per track, addressed by track name, living next to the
//! track's directory in the stems tree. An entry is valid merely by
//! existing on disk: `get_or_build` never inspects contents, so an
//! archive built before a track was re-staged is stale until someone
//! calls `invalidate`. That staleness is part of the contract and is
//! pinned by a test below.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::locks::NamedLocks;

use super::tracks::track_lock_name;
use super::types::{archive_path, RepositoryError, RepositoryResult, Track};

/// Builds and serves per-track zip archives.
pub struct ArchiveCache {
    stems_dir: PathBuf,
    locks: Arc<NamedLocks>,
}

impl ArchiveCache {
    /// Create a cache over the given stems directory, sharing the
    /// repository's per-track lock registry.
    pub fn new(stems_dir: impl Into<PathBuf>, locks: Arc<NamedLocks>) -> Self {
        Self {
            stems_dir: stems_dir.into(),
            locks,
        }
    }

    /// Expected archive path for a track.
    pub fn path_for(&self, track_name: &str) -> PathBuf {
        archive_path(&self.stems_dir, track_name)
    }

    /// Return the cached archive, building it on first request.
    ///
    /// An existing file is returned unchanged, with no content check.
    pub fn get_or_build(&self, track: &Track) -> RepositoryResult<PathBuf> {
        let lock = self.locks.acquire(&track_lock_name(&track.name));
        let _guard = lock.lock();

        let path = self.path_for(&track.name);
        if path.exists() {
            tracing::debug!("Archive cache hit: {}", path.display());
            return Ok(path);
        }

        // Build to a temp path and rename, so a failed build never
        // leaves a half-written zip that would count as a cache hit.
        let temp = path.with_extension("zip.tmp");
        if let Err(e) = self.build_archive(track, &temp) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        fs::rename(&temp, &path)
            .map_err(|e| RepositoryError::io("renaming built archive", e))?;

        tracing::info!("Built archive: {}", path.display());
        Ok(path)
    }

    /// Delete the cached archive if present.
    ///
    /// Returns whether an archive was removed. The next `get_or_build`
    /// rebuilds from the track's current contents.
    pub fn invalidate(&self, track_name: &str) -> RepositoryResult<bool> {
        let lock = self.locks.acquire(&track_lock_name(track_name));
        let _guard = lock.lock();

        let path = self.path_for(track_name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| RepositoryError::io("removing archive", e))?;
        Ok(true)
    }

    fn build_archive(&self, track: &Track, target: &Path) -> RepositoryResult<()> {
        let file =
            fs::File::create(target).map_err(|e| RepositoryError::io("creating archive", e))?;
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for stem in &track.stem_files {
            let name = stem
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| RepositoryError::Archive {
                    track: track.name.clone(),
                    source: e,
                })?;

            let mut input =
                fs::File::open(stem).map_err(|e| RepositoryError::io("reading stem file", e))?;
            io::copy(&mut input, &mut writer)
                .map_err(|e| RepositoryError::io("writing archive entry", e))?;
        }

        writer.finish().map_err(|e| RepositoryError::Archive {
            track: track.name.clone(),
            source: e,
        })?;
        Ok(())
    }
}
