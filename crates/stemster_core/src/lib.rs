//! Stemster Core - Backend logic for the Stemster audio separator
//!
//! This crate contains the separation job pipeline and track repository
//! with zero UI dependencies. It can be used by a GUI application or a
//! CLI tool.
//!
//! The pipeline supervises the external Demucs tool: it spawns the
//! process, maps its output to progress milestones, locates the produced
//! stems, and moves them into the canonical track layout. The repository
//! owns that layout and provides listing, deletion, format conversion,
//! and cached zip archives.

pub mod analysis;
pub mod config;
pub mod convert;
pub mod locks;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod separation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
