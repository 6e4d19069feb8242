//! Settings Persistence
//!
//! Resolves the platform configuration path and loads or saves the
//! configuration stored there.

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "cartokit";
const CONFIG_FILE: &str = "config.toml";

/// Returns `<platform config dir>/cartokit/config.toml`.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| {
        SettingsError::ConfigDirectory("no configuration directory on this platform".to_string())
    })?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
    config: Config,
}

impl SettingsPersistence {
    /// Load the configuration at `path`, or use defaults when the file does not exist.
    pub fn load_or_default(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let config = Config::load_or_default(&path)?;
        debug!("Settings bound to {}", path.display());
        Ok(Self { path, config })
    }

    /// Load from the platform default location.
    pub fn load_default_location() -> SettingsResult<Self> {
        Self::load_or_default(default_config_path()?)
    }

    /// Save the configuration, creating parent directories as needed.
    pub fn save(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.config.save_to_file(&self.path)?;
        info!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    /// Path the configuration is stored at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get reference to config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the persistence layer and keep the configuration
    pub fn into_config(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IconTheme;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = SettingsPersistence::load_or_default(dir.path().join("none.toml")).unwrap();
        assert_eq!(persistence.config(), &Config::default());
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut persistence = SettingsPersistence::load_or_default(&path).unwrap();
        persistence.config_mut().style.icon_theme = IconTheme::Outlined;
        persistence.save().unwrap();

        let reloaded = SettingsPersistence::load_or_default(&path).unwrap();
        assert_eq!(reloaded.config().style.icon_theme, IconTheme::Outlined);
        assert_eq!(reloaded.path(), path.as_path());
    }

    #[test]
    fn test_default_path_ends_with_app_file() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("cartokit/config.toml"));
        }
    }
}
