//! Configuration schema for Spark.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root config for the Spark workspace.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SparkConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub voice: VoiceSettings,
    /// Per-provider overrides keyed by provider id.
    #[serde(default)]
    pub providers: HashMap<String, ProviderOverride>,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub interview: InterviewConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Location of the persisted settings blob (defaults to `~/.spark/settings.json`).
    #[serde(default)]
    pub settings_path: Option<String>,
}

impl SparkConfig {
    /// Settings seeded from this config, used when nothing is persisted yet.
    pub fn default_settings(&self) -> AppSettings {
        AppSettings {
            ai: self.ai.clone(),
            voice: self.voice.clone(),
        }
    }
}

/// Provider, model, and credentials for chat requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, alias = "apiKey")]
    pub api_key: String,
    /// Explicit temperature; when unset each mode picks its own.
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens", alias = "maxTokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds; unset means wait indefinitely.
    #[serde(default, alias = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            temperature: None,
            max_tokens: default_max_tokens(),
            timeout_secs: None,
        }
    }
}

impl AiSettings {
    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

/// Speech settings. Only persisted here; speech itself runs in the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceSettings {
    #[serde(default = "default_true", alias = "autoActivation")]
    pub auto_activation: bool,
    /// Seconds to wait after the assistant stops speaking.
    #[serde(default = "default_auto_activation_delay", alias = "autoActivationDelay")]
    pub auto_activation_delay: u32,
    /// Seconds of silence before listening stops.
    #[serde(default = "default_silence_timeout", alias = "silenceTimeout")]
    pub silence_timeout: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_unit")]
    pub rate: f32,
    #[serde(default = "default_unit")]
    pub pitch: f32,
    #[serde(default = "default_unit")]
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            auto_activation: true,
            auto_activation_delay: default_auto_activation_delay(),
            silence_timeout: default_silence_timeout(),
            language: default_language(),
            accent: default_accent(),
            voice: default_voice(),
            rate: default_unit(),
            pitch: default_unit(),
            volume: default_unit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_auto_activation_delay() -> u32 {
    2
}

pub(crate) fn default_silence_timeout() -> u32 {
    6
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_accent() -> String {
    "neutral".to_string()
}

fn default_voice() -> String {
    "default".to_string()
}

fn default_unit() -> f32 {
    1.0
}

/// The persisted settings blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    #[serde(default, alias = "aiSettings")]
    pub ai: AiSettings,
    #[serde(default, alias = "voiceSettings")]
    pub voice: VoiceSettings,
}

/// Per-provider override.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProviderOverride {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub models: Option<Vec<String>>,
}

/// Limits applied to uploaded files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            max_files: default_max_files(),
        }
    }
}

impl UploadsConfig {
    /// Size ceiling in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_max_files() -> usize {
    3
}

/// Interview defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Number of questions requested from the model.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_time_limit_minutes")]
    pub time_limit_minutes: u32,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            time_limit_minutes: default_time_limit_minutes(),
        }
    }
}

fn default_question_count() -> usize {
    15
}

fn default_time_limit_minutes() -> u32 {
    30
}

/// Local proxy route settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_bind")]
    pub bind: String,
    #[serde(default = "default_proxy_upstream")]
    pub upstream_url: String,
    /// Sent upstream as `HTTP-Referer`.
    #[serde(default = "default_proxy_site_url")]
    pub site_url: String,
    /// Sent upstream as `X-Title`.
    #[serde(default = "default_proxy_title")]
    pub title: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: default_proxy_bind(),
            upstream_url: default_proxy_upstream(),
            site_url: default_proxy_site_url(),
            title: default_proxy_title(),
        }
    }
}

fn default_proxy_bind() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_proxy_upstream() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_proxy_site_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_proxy_title() -> String {
    "English Speaking Platform".to_string()
}
