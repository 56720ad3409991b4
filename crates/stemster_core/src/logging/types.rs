//! Logging types and configuration.

/// Configuration for per-job logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Number of recent lines kept for failure diagnosis.
    pub tail_lines: usize,
    /// Prefix captured lines with a local timestamp.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            tail_lines: 40,
            show_timestamps: false,
        }
    }
}

/// Callback receiving each captured line as it arrives.
pub type LineCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message prefix types for consistent formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Shell command: `$ command`
    Command,
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Warning: `[!]`
    Warning,
    /// Error: `[ERROR]`
    Error,
}

impl MessagePrefix {
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {message}"),
            MessagePrefix::Phase => format!("=== {message} ==="),
            MessagePrefix::Warning => format!("[!] {message}"),
            MessagePrefix::Error => format!("[ERROR] {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_format() {
        assert_eq!(MessagePrefix::Command.format("demucs -n htdemucs"), "$ demucs -n htdemucs");
        assert_eq!(MessagePrefix::Phase.format("Staging"), "=== Staging ===");
        assert_eq!(MessagePrefix::Warning.format("slow disk"), "[!] slow disk");
    }
}
