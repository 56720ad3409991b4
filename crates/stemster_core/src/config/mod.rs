//! Configuration: TOML-backed settings and their manager.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, ConversionSettings, LoggingSettings, PathSettings, SeparationSettings,
    Settings,
};
