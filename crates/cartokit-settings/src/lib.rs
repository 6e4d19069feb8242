//! Cartokit Settings Crate
//!
//! Handles application configuration and settings persistence.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    Config, HistorySettings, IconTheme, LegendSettings, LoggingSettings, StyleSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use persistence::{default_config_path, SettingsPersistence};
