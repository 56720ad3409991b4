//! Per-job logger capturing the external tool's output.
//!
//! Each job gets its own logger that:
//! - Captures every line in order (this buffer becomes `JobOutcome.log_lines`)
//! - Maintains a bounded tail for error diagnosis
//! - Optionally mirrors lines to an observer callback
//! - Optionally writes to a dedicated log file

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LineCallback, LogConfig, MessagePrefix};

/// Per-job logger with capture, tail, callback and file output.
pub struct JobLogger {
    /// Job name for identification.
    job_name: String,
    /// Path to the log file, if one was requested.
    log_path: Option<PathBuf>,
    /// Full ordered capture of every line.
    captured: Mutex<Vec<String>>,
    /// Recent lines for failure diagnosis.
    tail: Mutex<VecDeque<String>>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Observer callback.
    callback: Mutex<Option<LineCallback>>,
    /// Logging configuration.
    config: LogConfig,
}

impl JobLogger {
    /// Create an in-memory logger (no log file).
    pub fn new(job_name: impl Into<String>, config: LogConfig) -> Self {
        Self {
            job_name: job_name.into(),
            log_path: None,
            captured: Mutex::new(Vec::new()),
            tail: Mutex::new(VecDeque::new()),
            file_writer: Mutex::new(None),
            callback: Mutex::new(None),
            config,
        }
    }

    /// Create a logger that also writes `<job_name>.log` under `log_dir`.
    pub fn with_file(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
    ) -> std::io::Result<Self> {
        let job_name = job_name.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&job_name)));
        let writer = BufWriter::new(File::create(&log_path)?);

        let mut logger = Self::new(job_name, config);
        logger.log_path = Some(log_path);
        logger.file_writer = Mutex::new(Some(writer));
        Ok(logger)
    }

    /// Set the observer callback for mirrored lines.
    pub fn set_callback(&self, callback: LineCallback) {
        *self.callback.lock() = Some(callback);
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Capture a raw line of external tool output.
    pub fn line(&self, line: &str) {
        let formatted = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), line)
        } else {
            line.to_string()
        };

        self.captured.lock().push(formatted.clone());

        {
            let mut tail = self.tail.lock();
            if tail.len() == self.config.tail_lines {
                tail.pop_front();
            }
            tail.push_back(formatted.clone());
        }

        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{formatted}");
        }

        if let Some(ref callback) = *self.callback.lock() {
            callback(&formatted);
        }
    }

    /// Log an informational pipeline message.
    pub fn info(&self, message: &str) {
        self.line(message);
    }

    /// Log a warning.
    pub fn warn(&self, message: &str) {
        self.line(&MessagePrefix::Warning.format(message));
    }

    /// Log an error.
    pub fn error(&self, message: &str) {
        self.line(&MessagePrefix::Error.format(message));
    }

    /// Log the command being executed.
    pub fn command(&self, command: &str) {
        self.line(&MessagePrefix::Command.format(command));
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.line(&MessagePrefix::Phase.format(phase_name));
    }

    /// Full ordered capture of everything logged so far.
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().clone()
    }

    /// Recent lines, newest last.
    pub fn tail(&self) -> Vec<String> {
        self.tail.lock().iter().cloned().collect()
    }

    /// Flush the log file, if any.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Replace characters that are unsafe in filenames.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn captures_lines_in_order() {
        let logger = JobLogger::new("song", LogConfig::default());
        logger.line("first");
        logger.line("second");
        logger.warn("third");

        assert_eq!(logger.captured(), vec!["first", "second", "[!] third"]);
    }

    #[test]
    fn tail_is_bounded() {
        let config = LogConfig {
            tail_lines: 3,
            show_timestamps: false,
        };
        let logger = JobLogger::new("song", config);
        for i in 0..10 {
            logger.line(&format!("line {i}"));
        }

        assert_eq!(logger.tail(), vec!["line 7", "line 8", "line 9"]);
        assert_eq!(logger.captured().len(), 10);
    }

    #[test]
    fn callback_sees_every_line() {
        let logger = JobLogger::new("song", LogConfig::default());
        let count = Arc::new(AtomicUsize::new(0));
        let count_in_cb = Arc::clone(&count);
        logger.set_callback(Box::new(move |_| {
            count_in_cb.fetch_add(1, Ordering::SeqCst);
        }));

        logger.line("a");
        logger.info("b");
        logger.command("demucs");

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn writes_log_file() {
        let dir = tempdir().unwrap();
        let logger =
            JobLogger::with_file("my/song", dir.path(), LogConfig::default()).unwrap();
        logger.line("hello");
        logger.flush();

        let path = logger.log_path().unwrap().to_path_buf();
        assert!(path.file_name().unwrap().to_string_lossy().contains("my_song"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("hello"));
    }
}
