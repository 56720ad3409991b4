//! Supervision of the external separation tool.
//!
//! This module owns the process boundary: spawning the tool with the
//! exact command-line contract, streaming its combined output, mapping
//! that output to progress milestones, and locating the directory the
//! tool wrote once it exits.

mod locate;
mod progress;
mod runner;
mod types;

pub use locate::resolve_output_dir;
pub use progress::ProgressMapper;
pub use runner::ToolProcess;
pub use types::{SeparationError, SeparationResult};
