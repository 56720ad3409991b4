//! External separation tool runner.
//!
//! Spawns exactly one OS process per call and forwards its combined
//! stdout/stderr output line-by-line in real time, so progress can be
//! observed while the process is still running. The runner does not
//! interpret output; that is the progress mapper's job.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::types::{SeparationError, SeparationResult};

/// A running external tool with its output stream.
///
/// The stream is a finite, lazily produced sequence of lines: it ends
/// when the process closes both pipes, and it is not restartable.
pub struct ToolProcess {
    tool: String,
    child: Child,
    rx: Receiver<String>,
    readers: Vec<JoinHandle<()>>,
}

impl ToolProcess {
    /// Spawn the tool with the given argument vector and working directory.
    ///
    /// Failure to locate or exec the binary is fatal for the job and is
    /// never retried.
    pub fn spawn(binary: &str, args: &[String], workdir: &Path) -> SeparationResult<Self> {
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!("Spawning: {} {}", binary, args.join(" "));

        let mut child = cmd.spawn().map_err(|e| SeparationError::SpawnFailed {
            tool: binary.to_string(),
            source: e,
        })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);

        // Both pipes feed one channel; the stream ends when both readers
        // drop their sender.
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx));
        }

        Ok(Self {
            tool: binary.to_string(),
            child,
            rx,
            readers,
        })
    }

    /// Name of the tool binary this process runs.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Blocking iterator over the combined output lines.
    ///
    /// Each `next()` suspends until a line is available or the stream
    /// closes; this is the pipeline's only suspension point.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rx.iter()
    }

    /// Wait for the process to terminate and return its exit code.
    ///
    /// The reader threads always drain the pipes, so waiting cannot
    /// deadlock even if the caller stopped consuming lines early.
    pub fn wait(mut self) -> SeparationResult<i32> {
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }

        let status = self
            .child
            .wait()
            .map_err(|e| SeparationError::io("waiting for separation tool", e))?;

        let code = status.code().unwrap_or(-1);
        tracing::debug!("{} exited with code {}", self.tool, code);
        Ok(code)
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(pipe: R, tx: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn streams_combined_output_and_exit_code() {
        let dir = tempdir().unwrap();
        let process = ToolProcess::spawn(
            "sh",
            &[
                "-c".to_string(),
                "echo out-line; echo err-line 1>&2; exit 3".to_string(),
            ],
            dir.path(),
        )
        .unwrap();

        let lines: Vec<String> = process.lines().collect();
        assert!(lines.contains(&"out-line".to_string()));
        assert!(lines.contains(&"err-line".to_string()));

        assert_eq!(process.wait().unwrap(), 3);
    }

    #[test]
    fn missing_binary_is_spawn_failure() {
        let dir = tempdir().unwrap();
        let result = ToolProcess::spawn("/nonexistent/demucs", &[], dir.path());
        assert!(matches!(result, Err(SeparationError::SpawnFailed { .. })));
    }

    #[test]
    fn wait_without_draining_does_not_deadlock() {
        let dir = tempdir().unwrap();
        let process = ToolProcess::spawn(
            "sh",
            &["-c".to_string(), "seq 1 5000".to_string()],
            dir.path(),
        )
        .unwrap();

        // Never read a single line; reader threads must drain the pipe.
        assert_eq!(process.wait().unwrap(), 0);
    }
}
