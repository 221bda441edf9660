//! Settings
//!
//! User-facing configuration for the build integration, persisted as TOML.
//! Every field has a sensible default so a missing or partial file works.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Droidant settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Override for the Android SDK directory. When unset the SDK directory
    /// is read from the project's local.properties.
    pub sdk_dir: Option<PathBuf>,

    /// Override for the Android project root. When unset the project is
    /// located by walking up from the active file.
    pub project_path: Option<PathBuf>,

    /// ANT target used by the default build/run actions.
    pub default_target: String,

    /// Launch activity override. When unset the main activity is read from
    /// AndroidManifest.xml.
    pub default_activity: Option<String>,

    /// Extra arguments passed to every ant invocation.
    pub ant_args: Vec<String>,

    /// Trigger a default build after every save.
    pub auto_build: bool,

    /// When exactly one device is attached, select it without prompting.
    pub device_select_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sdk_dir: None,
            project_path: None,
            default_target: "debug".to_string(),
            default_activity: None,
            ant_args: Vec::new(),
            auto_build: true,
            device_select_default: true,
        }
    }
}

impl Settings {
    /// Default on-disk location of the settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("droidant")
            .join("config.toml")
    }

    /// Load settings from a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default location, writing defaults there on
    /// first run.
    pub async fn load_or_create() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path).await
        } else {
            info!("Creating default configuration at {:?}", path);
            let settings = Self::default();
            settings.save(&path).await?;
            Ok(settings)
        }
    }

    /// Save settings to a TOML file, creating parent directories as needed.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
