//! Public surface for Spark.
//!
//! Re-exports the workspace crates and wires config, settings and the chat
//! client together the same way for every front-end.

pub use spark_rs_config as config;
pub use spark_rs_core as core;
pub use spark_rs_files as files;
pub use spark_rs_llm as llm;
pub use spark_rs_protocol as protocol;
pub use spark_rs_server as server;

use log::info;
use spark_rs_config::{AiSettings, SettingsStore, SparkConfig};
use spark_rs_core::AppStore;
use spark_rs_llm::{ChatClient, HttpChatClient, LlmError, ProviderRegistry};
use std::sync::Arc;

/// Initialize `env_logger` once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Provider catalogue with the config's base URL overrides applied.
pub fn provider_registry(config: &SparkConfig) -> ProviderRegistry {
    ProviderRegistry::with_overrides(&config.providers)
}

/// Application store seeded from persisted settings, saving changes back.
pub fn open_store(config: &SparkConfig) -> AppStore {
    let defaults = config.default_settings();
    match SettingsStore::from_config(config) {
        Some(settings_store) => {
            let settings = settings_store.load(&defaults);
            info!(
                "settings loaded (path={}, provider={}, has_key={})",
                settings_store.path().display(),
                settings.ai.provider,
                settings.ai.has_api_key()
            );
            AppStore::new(settings).with_settings_store(settings_store)
        }
        None => AppStore::new(defaults),
    }
}

/// HTTP chat client for the current settings.
pub fn chat_client(
    config: &SparkConfig,
    settings: &AiSettings,
) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client = HttpChatClient::from_settings(&provider_registry(config), settings)?
        .with_attribution(config.proxy.site_url.clone(), config.proxy.title.clone());
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::{chat_client, open_store, provider_registry};
    use pretty_assertions::assert_eq;
    use spark_rs_config::{AiSettings, ProviderOverride, SparkConfig};
    use spark_rs_core::{AiSettingsPatch, AppAction};
    use spark_rs_llm::LlmError;
    use tempfile::TempDir;

    #[test]
    fn store_round_trips_through_settings_path() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("settings.json");
        let config = SparkConfig {
            settings_path: Some(path.display().to_string()),
            ..SparkConfig::default()
        };
        open_store(&config).dispatch(AppAction::UpdateAiSettings(AiSettingsPatch {
            api_key: Some("sk-saved".to_string()),
            ..AiSettingsPatch::default()
        }));
        assert_eq!(open_store(&config).settings().ai.api_key, "sk-saved");
    }

    #[test]
    fn chat_client_requires_key_and_known_provider() {
        let config = SparkConfig::default();
        assert!(matches!(
            chat_client(&config, &AiSettings::default()),
            Err(LlmError::MissingApiKey)
        ));
        let settings = AiSettings {
            provider: "nowhere".to_string(),
            api_key: "sk".to_string(),
            ..AiSettings::default()
        };
        assert!(matches!(
            chat_client(&config, &settings),
            Err(LlmError::UnknownProvider(_))
        ));
    }

    #[test]
    fn registry_applies_config_overrides() {
        let mut config = SparkConfig::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderOverride {
                base_url: Some("http://127.0.0.1:9/v1/chat/completions".to_string()),
                models: None,
            },
        );
        let registry = provider_registry(&config);
        assert_eq!(
            registry.get("openai").map(|spec| spec.base_url.as_str()),
            Some("http://127.0.0.1:9/v1/chat/completions")
        );
    }
}
