//! Schema validation helpers for Spark JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let allowed = [
        "$schema",
        "ai",
        "voice",
        "providers",
        "uploads",
        "interview",
        "proxy",
        "settings_path",
    ];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("ai") {
        validate_ai(value, layer, "ai")?;
    }
    if let Some(value) = map.get("voice") {
        validate_voice(value, layer, "voice")?;
    }
    if let Some(value) = map.get("providers") {
        validate_providers(value, layer, "providers")?;
    }
    if let Some(value) = map.get("uploads") {
        validate_uploads(value, layer, "uploads")?;
    }
    if let Some(value) = map.get("interview") {
        validate_interview(value, layer, "interview")?;
    }
    if let Some(value) = map.get("proxy") {
        validate_proxy(value, layer, "proxy")?;
    }
    if let Some(value) = map.get("settings_path") {
        expect_string(value, layer, "settings_path")?;
    }
    Ok(())
}

/// Validate the "ai" block.
fn validate_ai(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "provider",
            "model",
            "api_key",
            "apiKey",
            "temperature",
            "max_tokens",
            "maxTokens",
            "timeout_secs",
            "timeoutSecs",
        ],
        layer,
        path,
    )?;
    for key in ["provider", "model", "api_key", "apiKey"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("temperature") {
        expect_f64(value, layer, &join_path(path, "temperature"))?;
    }
    for key in ["max_tokens", "maxTokens", "timeout_secs", "timeoutSecs"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "voice" block.
fn validate_voice(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &[
            "auto_activation",
            "autoActivation",
            "auto_activation_delay",
            "autoActivationDelay",
            "silence_timeout",
            "silenceTimeout",
            "language",
            "accent",
            "voice",
            "rate",
            "pitch",
            "volume",
        ],
        layer,
        path,
    )?;
    for key in ["auto_activation", "autoActivation"] {
        if let Some(value) = map.get(key) {
            expect_bool(value, layer, &join_path(path, key))?;
        }
    }
    for key in [
        "auto_activation_delay",
        "autoActivationDelay",
        "silence_timeout",
        "silenceTimeout",
    ] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["language", "accent", "voice"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    for key in ["rate", "pitch", "volume"] {
        if let Some(value) = map.get(key) {
            expect_f64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "providers" map of per-provider overrides.
fn validate_providers(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    for (provider, entry) in map {
        let entry_path = join_path(path, provider);
        let entry_map = expect_object(entry, layer, &entry_path)?;
        ensure_allowed_keys(entry_map, &["base_url", "models"], layer, &entry_path)?;
        if let Some(value) = entry_map.get("base_url") {
            expect_string(value, layer, &join_path(&entry_path, "base_url"))?;
        }
        if let Some(value) = entry_map.get("models") {
            validate_string_array(value, layer, &join_path(&entry_path, "models"))?;
        }
    }
    Ok(())
}

/// Validate the "uploads" block.
fn validate_uploads(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["max_file_size_mb", "max_files"], layer, path)?;
    for key in ["max_file_size_mb", "max_files"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "interview" block.
fn validate_interview(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["question_count", "time_limit_minutes"], layer, path)?;
    for key in ["question_count", "time_limit_minutes"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "proxy" block.
fn validate_proxy(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["bind", "upstream_url", "site_url", "title"];
    ensure_allowed_keys(map, &allowed, layer, path)?;
    for key in allowed {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

fn expect_bool(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected bool"))
    }
}

/// Non-negative integers only; sizes and counts never go below zero.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Validate that a value is an array of strings.
fn validate_string_array(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Value::Array(arr) = value else {
        return Err(invalid_field(layer, path, "expected array"));
    };
    for (idx, entry) in arr.iter().enumerate() {
        if entry.as_str().is_none() {
            return Err(invalid_field(
                layer,
                &format!("{path}[{idx}]"),
                "expected string",
            ));
        }
    }
    Ok(())
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
