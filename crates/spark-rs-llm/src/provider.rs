//! Provider catalogue: endpoint, auth, wire format and supported models.

use crate::LlmError;
use log::{debug, warn};
use spark_rs_config::{AiSettings, ProviderOverride};
use std::collections::HashMap;

/// How the API key is presented to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`.
    Bearer,
    /// `x-api-key: <key>` plus `anthropic-version`.
    AnthropicKey,
}

/// Request/response body shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `messages` with an inline system turn; reply in `choices[0].message.content`.
    OpenAi,
    /// Top-level `system`; reply in `content[0].text`.
    Anthropic,
}

/// A named chat-completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub auth: AuthScheme,
    pub wire: WireFormat,
    pub supported_models: Vec<String>,
    /// Send `HTTP-Referer` and `X-Title` attribution headers.
    pub attribution_headers: bool,
    /// Accepts `response_format: {"type":"json_object"}`.
    pub json_response_format: bool,
}

impl ProviderSpec {
    fn new(
        id: &str,
        name: &str,
        base_url: &str,
        auth: AuthScheme,
        wire: WireFormat,
        models: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            base_url: base_url.to_string(),
            auth,
            wire,
            supported_models: models.iter().map(|model| model.to_string()).collect(),
            attribution_headers: false,
            json_response_format: false,
        }
    }

    fn with_attribution(mut self) -> Self {
        self.attribution_headers = true;
        self
    }

    fn with_json_response_format(mut self) -> Self {
        self.json_response_format = true;
        self
    }

    /// First supported model, used when switching to this provider.
    pub fn default_model(&self) -> Option<&str> {
        self.supported_models.first().map(String::as_str)
    }

    pub fn supports_model(&self, model: &str) -> bool {
        self.supported_models.iter().any(|candidate| candidate == model)
    }
}

/// Known providers keyed by id, in display order.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderSpec>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRegistry {
    /// Built-in catalogue.
    pub fn builtin() -> Self {
        let openrouter_models = [
            "openai/gpt-4o",
            "openai/gpt-4o-mini",
            "anthropic/claude-3.5-sonnet",
            "anthropic/claude-3-haiku",
            "deepseek/deepseek-chat",
            "google/gemini-pro",
            "meta-llama/llama-3.1-405b-instruct",
        ];
        let providers = vec![
            ProviderSpec::new(
                "openai",
                "OpenAI",
                "https://api.openai.com/v1/chat/completions",
                AuthScheme::Bearer,
                WireFormat::OpenAi,
                &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo", "gpt-4-turbo"],
            )
            .with_json_response_format(),
            ProviderSpec::new(
                "openrouter",
                "OpenRouter",
                "https://openrouter.ai/api/v1/chat/completions",
                AuthScheme::Bearer,
                WireFormat::OpenAi,
                &openrouter_models,
            )
            .with_attribution()
            .with_json_response_format(),
            ProviderSpec::new(
                "deepseek",
                "DeepSeek",
                "https://api.deepseek.com/v1/chat/completions",
                AuthScheme::Bearer,
                WireFormat::OpenAi,
                &["deepseek-chat", "deepseek-coder"],
            )
            .with_json_response_format(),
            ProviderSpec::new(
                "anthropic",
                "Anthropic",
                "https://api.anthropic.com/v1/messages",
                AuthScheme::AnthropicKey,
                WireFormat::Anthropic,
                &["claude-3-5-sonnet-20241022", "claude-3-haiku-20240307"],
            ),
            ProviderSpec::new(
                "perplexity",
                "Perplexity",
                "https://api.perplexity.ai/chat/completions",
                AuthScheme::Bearer,
                WireFormat::OpenAi,
                &[
                    "llama-3.1-sonar-small-128k-online",
                    "llama-3.1-sonar-large-128k-online",
                    "llama-3.1-sonar-huge-128k-online",
                ],
            ),
            ProviderSpec::new(
                "proxy",
                "Local proxy",
                "http://127.0.0.1:3001/api/chat",
                AuthScheme::Bearer,
                WireFormat::OpenAi,
                &["gpt-3.5-turbo", "openai/gpt-4o-mini", "openai/gpt-4o"],
            ),
        ];
        Self { providers }
    }

    /// Built-in catalogue with config overrides applied.
    pub fn with_overrides(overrides: &HashMap<String, ProviderOverride>) -> Self {
        let mut registry = Self::builtin();
        for (id, entry) in overrides {
            let Some(spec) = registry.providers.iter_mut().find(|spec| &spec.id == id) else {
                warn!("ignoring override for unknown provider (provider={})", id);
                continue;
            };
            if let Some(url) = entry.base_url.as_ref() {
                debug!("overriding provider base url (provider={}, url={})", id, url);
                spec.base_url = url.clone();
            }
            if let Some(models) = entry.models.as_ref().filter(|models| !models.is_empty()) {
                spec.supported_models = models.clone();
            }
        }
        registry
    }

    pub fn get(&self, id: &str) -> Option<&ProviderSpec> {
        self.providers.iter().find(|spec| spec.id == id)
    }

    /// Look up a provider or fail with `UnknownProvider`.
    pub fn resolve(&self, id: &str) -> Result<&ProviderSpec, LlmError> {
        self.get(id)
            .ok_or_else(|| LlmError::UnknownProvider(id.to_string()))
    }

    pub fn list(&self) -> &[ProviderSpec] {
        &self.providers
    }

    /// Switch provider, resetting the model to the provider's first model.
    pub fn select_provider(&self, settings: &mut AiSettings, id: &str) -> Result<(), LlmError> {
        let spec = self.resolve(id)?;
        settings.provider = spec.id.clone();
        if let Some(model) = spec.default_model() {
            settings.model = model.to_string();
        }
        Ok(())
    }
}
