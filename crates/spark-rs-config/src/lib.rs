//! Configuration models, layered config loading, and persisted user settings.
//!
//! The layered `spark.json5` stack sets process-wide defaults; the settings
//! store keeps the user's provider, key, and voice choices between runs.

mod error;
mod loader;
mod model;
mod settings;

/// Public error types returned by config and settings APIs.
pub use error::{ConfigError, SettingsError};
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
/// Persisted settings store.
pub use settings::{SettingsStore, default_settings_path};
