//! Job orchestrator: one "generate stems" operation, start to finish.
//!
//! State machine per job: `Pending -> Running -> {Succeeded, Failed}`.
//! `Running` is entered on successful spawn; a non-zero exit or a
//! missing output directory fails the job; success requires staging
//! (and any requested conversion) to complete. There is no retry and
//! no cancellation: once started, a job runs to process exit.

use std::sync::Arc;
use std::time::Instant;

use crate::analysis::TrackAnalyzer;
use crate::config::Settings;
use crate::convert::FormatConverter;
use crate::locks::NamedLocks;
use crate::logging::{JobLogger, LogConfig};
use crate::models::{JobOutcome, JobParameters, JobStage, SeparationModel, StemKind};
use crate::repository::{track_lock_name, ArchiveCache, TrackRepository};
use crate::separation::{resolve_output_dir, ProgressMapper, ToolProcess};

use super::errors::JobError;

/// Progress observer: receives `(percent, message)` pairs.
///
/// The percent sequence for one job is non-decreasing.
pub type ProgressCallback = Box<dyn Fn(u32, &str) + Send + Sync>;

/// Composes runner, progress mapper, locator, repository and converter
/// into a single supervised operation.
pub struct JobOrchestrator {
    settings: Settings,
    repository: TrackRepository,
    converter: FormatConverter,
    locks: Arc<NamedLocks>,
    analyzer: Option<Box<dyn TrackAnalyzer>>,
    progress: Option<ProgressCallback>,
}

impl JobOrchestrator {
    pub fn new(settings: Settings) -> Self {
        // One registry serves both namespaces: "model:<name>" for the
        // locator's in-flight guarantee, "track:<name>" for repository
        // mutations.
        let locks = Arc::new(NamedLocks::new());
        let repository = TrackRepository::with_locks(
            settings.uploads_dir(),
            settings.stems_dir(),
            Arc::clone(&locks),
        );
        let converter = FormatConverter::new(&settings.conversion);

        Self {
            settings,
            repository,
            converter,
            locks,
            analyzer: None,
            progress: None,
        }
    }

    /// Attach a key/tempo analyzer. Its failures become warnings.
    pub fn with_analyzer(mut self, analyzer: Box<dyn TrackAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Attach a progress observer.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The repository this orchestrator stages into.
    pub fn repository(&self) -> &TrackRepository {
        &self.repository
    }

    /// An archive cache sharing this orchestrator's track locks.
    pub fn archive_cache(&self) -> ArchiveCache {
        ArchiveCache::new(self.settings.stems_dir(), Arc::clone(&self.locks))
    }

    /// Run one separation job to its terminal outcome.
    ///
    /// Never panics and never returns early without the captured log:
    /// every failure path folds into a `Failed` outcome carrying the
    /// lines seen so far plus the underlying cause.
    pub fn run(&self, params: &JobParameters) -> JobOutcome {
        let start = Instant::now();
        let logger = self.make_logger(params);

        self.report(0, "Validating parameters");
        if let Err(e) = params.validate() {
            return self.fail(&logger, start, Vec::new(), e.into());
        }
        // Safe after validate.
        let track_name = match params.track_name() {
            Ok(name) => name,
            Err(e) => return self.fail(&logger, start, Vec::new(), e.into()),
        };

        let mut warnings = Vec::new();
        if let Some(ref analyzer) = self.analyzer {
            match analyzer.analyze(&params.input_path) {
                Ok(traits) => {
                    logger.info(&format!(
                        "Estimated key {}, tempo {:.0} BPM",
                        traits.key, traits.tempo_bpm
                    ));
                }
                Err(e) => {
                    let warning = e.to_string();
                    logger.warn(&warning);
                    warnings.push(warning);
                }
            }
        }

        // The newest-mtime locator is only sound with one job per model
        // in flight; hold the model lock until staging moved the output
        // out of the scratch tree.
        let model_lock = self.locks.acquire(&model_lock_name(params.model));
        let _model_guard = model_lock.lock();

        let binary = &self.settings.separation.tool_binary;
        let args = params.to_args();
        let workdir = self.settings.tool_workdir();
        logger.command(&format!("{} {}", binary, args.join(" ")));

        let process = match ToolProcess::spawn(binary, &args, &workdir) {
            Ok(process) => process,
            Err(e) => return self.fail(&logger, start, warnings, e.into()),
        };

        // Pending -> Running.
        self.report(0, "Separation running");
        let mut mapper = ProgressMapper::new();
        for line in process.lines() {
            logger.line(&line);
            if let Some(percent) = mapper.observe(&line) {
                self.report(percent, &line);
            }
        }

        let exit_code = match process.wait() {
            Ok(code) => code,
            Err(e) => return self.fail(&logger, start, warnings, e.into()),
        };
        if exit_code != 0 {
            let error = crate::separation::SeparationError::ToolFailed {
                tool: binary.clone(),
                exit_code,
            };
            return self.fail(&logger, start, warnings, error.into());
        }

        let output_dir =
            match resolve_output_dir(&self.settings.separated_root(), params.model) {
                Ok(dir) => dir,
                Err(e) => return self.fail(&logger, start, warnings, e.into()),
            };

        // Staging, stem pruning and conversion all mutate the track
        // directory; one guard keeps deletes and archive builds out
        // until the track is in its final form.
        let track_lock = self.locks.acquire(&track_lock_name(&track_name));
        let track_guard = track_lock.lock();

        logger.phase("Staging");
        let track = match self.repository.stage_unlocked(&output_dir, &track_name) {
            Ok(track) => track,
            Err(e) => return self.fail(&logger, start, warnings, e.into()),
        };

        let track = if params.stems.len() < StemKind::all().len() {
            match self
                .repository
                .retain_stems_unlocked(&track_name, &params.stems)
            {
                Ok(track) => track,
                Err(e) => return self.fail(&logger, start, warnings, e.into()),
            }
        } else {
            track
        };

        logger.phase("Converting");
        if let Err(e) = self
            .converter
            .convert(&track.stem_files, params.export_format)
        {
            return self.fail(&logger, start, warnings, e.into());
        }
        drop(track_guard);

        self.report(100, "Job complete");
        logger.info(&format!("Track '{}' ready", track_name));

        JobOutcome {
            stage: JobStage::Succeeded,
            elapsed_seconds: start.elapsed().as_secs_f64(),
            stem_dir: Some(self.settings.stems_dir().join(&track_name)),
            log_lines: logger.captured(),
            log_tail: logger.tail(),
            warnings,
            error: None,
        }
    }

    fn make_logger(&self, params: &JobParameters) -> JobLogger {
        let name = params
            .track_name()
            .unwrap_or_else(|_| "separation-job".to_string());
        let config = LogConfig {
            tail_lines: self.settings.logging.tail_lines as usize,
            show_timestamps: self.settings.logging.show_timestamps,
        };

        if self.settings.logging.write_job_logs {
            match JobLogger::with_file(&name, self.settings.logs_dir(), config.clone()) {
                Ok(logger) => return logger,
                Err(e) => {
                    tracing::warn!("Falling back to in-memory job log: {e}");
                }
            }
        }
        JobLogger::new(name, config)
    }

    fn fail(
        &self,
        logger: &JobLogger,
        start: Instant,
        warnings: Vec<String>,
        error: JobError,
    ) -> JobOutcome {
        logger.error(&error.to_string());
        tracing::error!("Job failed: {error}");

        JobOutcome {
            stage: JobStage::Failed,
            elapsed_seconds: start.elapsed().as_secs_f64(),
            stem_dir: None,
            log_lines: logger.captured(),
            log_tail: logger.tail(),
            warnings,
            error: Some(error.to_string()),
        }
    }

    fn report(&self, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress {
            callback(percent, message);
        }
    }
}

/// Lock name serializing jobs per model.
fn model_lock_name(model: SeparationModel) -> String {
    format!("model:{model}")
}
