//! Persisted user settings (provider, key, model, voice).

use crate::model::default_silence_timeout;
use crate::{AppSettings, SettingsError, SparkConfig};
use directories::UserDirs;
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".spark";
const SETTINGS_FILE: &str = "settings.json";

/// Default settings location, `~/.spark/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// JSON file holding the user's `AppSettings`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured `settings_path`, else the default location.
    pub fn from_config(config: &SparkConfig) -> Option<Self> {
        config
            .settings_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(default_settings_path)
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted settings, falling back to `defaults` when nothing usable is stored.
    ///
    /// Missing fields take their defaults and a zero silence timeout is
    /// migrated. A blob that cannot be decoded is removed.
    pub fn load(&self, defaults: &AppSettings) -> AppSettings {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no persisted settings (path={})", self.path.display());
                return defaults.clone();
            }
            Err(err) => {
                warn!(
                    "failed to read settings (path={}, err={})",
                    self.path.display(),
                    err
                );
                return defaults.clone();
            }
        };

        match serde_json::from_str::<AppSettings>(&contents) {
            Ok(mut settings) => {
                if settings.voice.silence_timeout == 0 {
                    settings.voice.silence_timeout = default_silence_timeout();
                }
                info!(
                    "loaded settings (provider={}, model={}, has_key={})",
                    settings.ai.provider,
                    settings.ai.model,
                    settings.ai.has_api_key()
                );
                settings
            }
            Err(err) => {
                warn!(
                    "discarding corrupt settings (path={}, err={})",
                    self.path.display(),
                    err
                );
                if let Err(err) = fs::remove_file(&self.path) {
                    warn!("failed to remove corrupt settings: {}", err);
                }
                defaults.clone()
            }
        }
    }

    /// Write settings, creating the parent directory if needed.
    pub fn save(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, encoded)?;
        debug!("saved settings (path={})", self.path.display());
        Ok(())
    }
}
