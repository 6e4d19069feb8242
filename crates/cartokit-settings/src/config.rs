//! Configuration and settings management for Cartokit
//!
//! Provides configuration file handling and validation. Supports JSON and TOML
//! file formats.
//!
//! Configuration is organized into logical sections:
//! - History settings (undo depth)
//! - Style defaults (render-time fallbacks, icon theme, overlay colours)
//! - Legend layout (padding, margins, fonts)
//! - Logging (level, output format)

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Icon theme selection
///
/// Switching the theme invalidates every cached point style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconTheme {
    /// Solid glyphs tinted with the point colour
    #[default]
    Filled,
    /// Glyph outlines tinted with the point colour
    Outlined,
}

impl std::fmt::Display for IconTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filled => write!(f, "filled"),
            Self::Outlined => write!(f, "outlined"),
        }
    }
}

/// Undo/redo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of operations kept per history context
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// Style defaults
///
/// These values fill in style fields that a feature leaves empty. They are
/// applied when a drawable style is built, never written back into the
/// feature, except by an explicit `set_default_style`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    /// Icon theme used for point symbols
    pub icon_theme: IconTheme,
    /// Default stroke colour
    pub stroke_color: String,
    /// Default stroke width in pixels
    pub stroke_width: f64,
    /// Default primary fill colour
    pub fill_color1: String,
    /// Default secondary fill colour (pattern foreground)
    pub fill_color2: String,
    /// Default point icon name
    pub point_icon: String,
    /// Default point size in pixels
    pub point_size: f64,
    /// Default point colour
    pub point_color: String,
    /// Default text colour
    pub text_color: String,
    /// Default text size in pixels
    pub text_size: f64,
    /// Default text font family
    pub text_font: String,
    /// Selection overlay colour
    pub selection_color: String,
    /// Highlight ring colour
    pub highlight_color: String,
    /// Highlight duration when a timeout is requested without a value
    pub highlight_timeout_ms: u64,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            icon_theme: IconTheme::default(),
            stroke_color: "#FF5733".to_string(),
            stroke_width: 2.0,
            fill_color1: "#FFFFFF".to_string(),
            fill_color2: "#FF5733".to_string(),
            point_icon: "circle".to_string(),
            point_size: 15.0,
            point_color: "#FF5733".to_string(),
            text_color: "#000000".to_string(),
            text_size: 14.0,
            text_font: "sans-serif".to_string(),
            selection_color: "#00B4FF".to_string(),
            highlight_color: "#FFD400".to_string(),
            highlight_timeout_ms: 3000,
        }
    }
}

/// Legend layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendSettings {
    /// Inner padding between the border and the items
    pub padding: f64,
    /// Vertical space between two items
    pub item_margin: f64,
    /// Horizontal space between the symbol column and the labels
    pub symbol_text_gap: f64,
    /// Radius of the border corners
    pub border_radius: f64,
    /// Border stroke width
    pub border_width: f64,
    /// Border colour
    pub border_color: String,
    /// Background colour
    pub background_color: String,
    /// Label font family
    pub font: String,
    /// Label font size in pixels
    pub font_size: f64,
    /// Label colour
    pub text_color: String,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            padding: 10.0,
            item_margin: 8.0,
            symbol_text_gap: 10.0,
            border_radius: 6.0,
            border_width: 1.0,
            border_color: "#4A4A4A".to_string(),
            background_color: "#FFFFFF".to_string(),
            font: "sans-serif".to_string(),
            font_size: 14.0,
            text_color: "#000000".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level directive, used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// History settings
    pub history: HistorySettings,
    /// Style defaults
    pub style: StyleSettings,
    /// Legend layout
    pub legend: LegendSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Format::from_path(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load config from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.history.max_depth == 0 {
            return Err(SettingsError::invalid("history.max_depth", "must be > 0"));
        }

        if self.style.stroke_width < 0.0 {
            return Err(SettingsError::invalid("style.stroke_width", "must be >= 0"));
        }

        if self.style.point_size <= 0.0 {
            return Err(SettingsError::invalid("style.point_size", "must be > 0"));
        }

        if self.style.text_size <= 0.0 {
            return Err(SettingsError::invalid("style.text_size", "must be > 0"));
        }

        if self.style.point_icon.trim().is_empty() {
            return Err(SettingsError::invalid("style.point_icon", "must not be empty"));
        }

        if self.legend.padding < 0.0 || self.legend.item_margin < 0.0 {
            return Err(SettingsError::invalid(
                "legend.padding",
                "padding and margins must be >= 0",
            ));
        }

        if self.legend.font_size <= 0.0 {
            return Err(SettingsError::invalid("legend.font_size", "must be > 0"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::invalid("logging.level", "must not be empty"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
