//! Chat client trait and the reqwest-backed implementation.

use crate::{AuthScheme, ChatRequest, LlmError, ProviderRegistry, ProviderSpec, WireFormat};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{Value, json};
use spark_rs_config::AiSettings;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_SITE_URL: &str = "http://localhost:3001";
const DEFAULT_TITLE: &str = "English Speaking Platform";

/// Anything that can turn a chat request into the model's raw reply text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;
}

/// Sends one HTTP request per completion. No retry, no backoff.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    provider: ProviderSpec,
    model: String,
    api_key: String,
    site_url: String,
    title: String,
}

impl HttpChatClient {
    /// Create a client for one provider and model.
    pub fn new(
        provider: ProviderSpec,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        Ok(Self {
            client: Client::new(),
            provider,
            model: model.into(),
            api_key,
            site_url: DEFAULT_SITE_URL.to_string(),
            title: DEFAULT_TITLE.to_string(),
        })
    }

    /// Resolve provider, model, key and timeout from user settings.
    pub fn from_settings(
        registry: &ProviderRegistry,
        settings: &AiSettings,
    ) -> Result<Self, LlmError> {
        if !settings.has_api_key() {
            return Err(LlmError::MissingApiKey);
        }
        let provider = registry.resolve(&settings.provider)?.clone();
        if !provider.supports_model(&settings.model) {
            warn!(
                "model not in provider catalogue (provider={}, model={})",
                provider.id, settings.model
            );
        }
        let mut client = Self::new(provider, settings.model.clone(), settings.api_key.clone())?;
        if let Some(secs) = settings.timeout_secs {
            client.client = Client::builder().timeout(Duration::from_secs(secs)).build()?;
        }
        info!(
            "chat client ready (provider={}, model={}, key_len={})",
            client.provider.id,
            client.model,
            client.api_key.len()
        );
        Ok(client)
    }

    /// Override the attribution headers sent to providers that want them.
    pub fn with_attribution(
        mut self,
        site_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.site_url = site_url.into();
        self.title = title.into();
        self
    }

    pub fn provider(&self) -> &ProviderSpec {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the outbound HTTP request without sending it.
    pub fn build_request(&self, request: &ChatRequest) -> Result<reqwest::Request, LlmError> {
        let mut builder = self
            .client
            .post(&self.provider.base_url)
            .header("content-type", "application/json");
        builder = match self.provider.auth {
            AuthScheme::Bearer => builder.bearer_auth(&self.api_key),
            AuthScheme::AnthropicKey => builder
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };
        if self.provider.attribution_headers {
            builder = builder
                .header("HTTP-Referer", &self.site_url)
                .header("X-Title", &self.title);
        }
        Ok(builder.json(&self.request_body(request)).build()?)
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        match self.provider.wire {
            WireFormat::OpenAi => {
                let mut messages = Vec::with_capacity(request.messages.len() + 1);
                if let Some(system) = request.system.as_ref() {
                    messages.push(json!({ "role": "system", "content": system }));
                }
                messages.extend(
                    request
                        .messages
                        .iter()
                        .map(|message| json!({ "role": message.role, "content": message.content })),
                );
                let mut body = json!({
                    "model": self.model,
                    "messages": messages,
                    "temperature": request.temperature,
                    "max_tokens": request.max_tokens,
                });
                if request.json_mode && self.provider.json_response_format {
                    body["response_format"] = json!({ "type": "json_object" });
                }
                body
            }
            WireFormat::Anthropic => {
                let mut body = json!({
                    "model": self.model,
                    "messages": request.messages,
                    "temperature": request.temperature,
                    "max_tokens": request.max_tokens,
                });
                if let Some(system) = request.system.as_ref() {
                    body["system"] = json!(system);
                }
                body
            }
        }
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let http_request = self.build_request(&request)?;
        debug!(
            "dispatching chat request (provider={}, model={}, messages={}, json_mode={})",
            self.provider.id,
            self.model,
            request.messages.len(),
            request.json_mode
        );
        let response = self.client.execute(http_request).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(
                "chat request failed (provider={}, status={})",
                self.provider.id,
                status.as_u16()
            );
            return Err(LlmError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        let value: Value = serde_json::from_str(&body)
            .map_err(|err| LlmError::MalformedResponse(err.to_string()))?;
        extract_content(&value)
    }
}

/// Pull the completion text from either response shape.
pub fn extract_content(value: &Value) -> Result<String, LlmError> {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/content/0/text").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| LlmError::MalformedResponse("missing completion text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::{HttpChatClient, extract_content};
    use crate::{ChatRequest, LlmError, ProviderRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use spark_rs_config::AiSettings;

    fn settings(provider: &str, model: &str) -> AiSettings {
        AiSettings {
            provider: provider.to_string(),
            model: model.to_string(),
            api_key: "secret-key".to_string(),
            ..AiSettings::default()
        }
    }

    fn body_of(request: &reqwest::Request) -> Value {
        let bytes = request
            .body()
            .and_then(|body| body.as_bytes())
            .expect("body bytes");
        serde_json::from_slice(bytes).expect("json body")
    }

    #[test]
    fn anthropic_uses_api_key_header_and_top_level_system() {
        let registry = ProviderRegistry::builtin();
        let client = HttpChatClient::from_settings(
            &registry,
            &settings("anthropic", "claude-3-haiku-20240307"),
        )
        .expect("client");
        let request = ChatRequest::new(0.7, 1000)
            .with_system("be kind")
            .with_user("hello");
        let http = client.build_request(&request).expect("request");

        assert_eq!(
            http.headers().get("x-api-key").and_then(|v| v.to_str().ok()),
            Some("secret-key")
        );
        assert_eq!(
            http.headers()
                .get("anthropic-version")
                .and_then(|v| v.to_str().ok()),
            Some("2023-06-01")
        );
        assert!(http.headers().get("authorization").is_none());

        let body = body_of(&http);
        assert_eq!(body["system"], "be kind");
        assert_eq!(body["messages"], json!([{ "role": "user", "content": "hello" }]));
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn openai_uses_bearer_and_inline_system() {
        let registry = ProviderRegistry::builtin();
        let client = HttpChatClient::from_settings(&registry, &settings("openai", "gpt-4o"))
            .expect("client");
        let request = ChatRequest::new(0.9, 500)
            .with_system("sys")
            .with_user("hi")
            .json_mode(true);
        let http = client.build_request(&request).expect("request");
        assert_eq!(
            http.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok()),
            Some("Bearer secret-key")
        );
        assert!(http.headers().get("x-api-key").is_none());
        assert!(http.headers().get("HTTP-Referer").is_none());

        let body = body_of(&http);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0], json!({ "role": "system", "content": "sys" }));
        assert_eq!(body["messages"][1], json!({ "role": "user", "content": "hi" }));
        assert_eq!(body["response_format"], json!({ "type": "json_object" }));
    }

    #[test]
    fn json_mode_is_dropped_for_providers_without_response_format() {
        let registry = ProviderRegistry::builtin();
        let request = ChatRequest::new(0.3, 2000).with_user("report").json_mode(true);
        for (provider, model) in [
            ("perplexity", "llama-3.1-sonar-small-128k-online"),
            ("proxy", "gpt-3.5-turbo"),
        ] {
            let client = HttpChatClient::from_settings(&registry, &settings(provider, model))
                .expect("client");
            let body = body_of(&client.build_request(&request).expect("request"));
            assert!(body.get("response_format").is_none(), "{provider}: {body}");
        }
    }

    #[test]
    fn openrouter_sends_attribution_headers() {
        let registry = ProviderRegistry::builtin();
        let client = HttpChatClient::from_settings(
            &registry,
            &settings("openrouter", "openai/gpt-4o-mini"),
        )
        .expect("client")
        .with_attribution("https://example.test", "Spark");
        let http = client
            .build_request(&ChatRequest::new(0.7, 1000).with_user("hi"))
            .expect("request");
        assert_eq!(
            http.headers()
                .get("HTTP-Referer")
                .and_then(|v| v.to_str().ok()),
            Some("https://example.test")
        );
        assert_eq!(
            http.headers().get("X-Title").and_then(|v| v.to_str().ok()),
            Some("Spark")
        );
    }

    #[test]
    fn missing_key_and_unknown_provider_fail_early() {
        let registry = ProviderRegistry::builtin();
        let mut no_key = settings("openai", "gpt-4o");
        no_key.api_key = "  ".to_string();
        assert!(matches!(
            HttpChatClient::from_settings(&registry, &no_key),
            Err(LlmError::MissingApiKey)
        ));
        assert!(matches!(
            HttpChatClient::from_settings(&registry, &settings("mystery", "m")),
            Err(LlmError::UnknownProvider(id)) if id == "mystery"
        ));
    }

    #[test]
    fn extracts_both_response_shapes() {
        let openai = json!({ "choices": [{ "message": { "content": "from openai" } }] });
        let anthropic = json!({ "content": [{ "type": "text", "text": "from anthropic" }] });
        assert_eq!(extract_content(&openai).expect("openai"), "from openai");
        assert_eq!(extract_content(&anthropic).expect("anthropic"), "from anthropic");
        assert!(matches!(
            extract_content(&json!({ "choices": [] })),
            Err(LlmError::MalformedResponse(_))
        ));
    }
}
