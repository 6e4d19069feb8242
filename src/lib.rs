//! # Cartokit
//!
//! Map feature editor core with:
//! - Reversible edit history with independent map and layout contexts
//! - Value-keyed style cache shared by every feature with the same look
//! - Symbol and legend rendering with deferred icon loading
//!
//! ## Architecture
//!
//! Cartokit is organized as a workspace with multiple crates:
//!
//! 1. **cartokit-core** - Error types and shared-state aliases
//! 2. **cartokit-settings** - Configuration loading, saving and validation
//! 3. **cartokit-editor** - Features, styles, rendering, history and the editing session
//! 4. **cartokit** - This crate: logging setup and the command line tool

pub use cartokit_core::{Error, HistoryError, RenderError, Result, StyleError};
pub use cartokit_editor as editor;
pub use cartokit_editor::{
    EditorSession, FeatureEntity, Geometry, GeometryKind, History, HistoryKey, Legend,
    LegendItem, StyleFactory, StyleProperties,
};
pub use cartokit_settings::{
    default_config_path, Config, LoggingSettings, SettingsError, SettingsPersistence,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - `RUST_LOG` taking precedence over the configured level
/// - Pretty console output, or JSON lines when `json` is set
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("invalid log level '{}'", settings.level))?;

    if settings.json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("logging already initialized")?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("logging already initialized")?;
    }

    Ok(())
}
