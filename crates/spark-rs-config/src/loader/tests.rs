//! Tests for layered configuration loading.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

#[test]
fn parse_minimal_config() {
    let config = SparkConfig::load_from_str("{}").expect("config");
    assert_eq!(config.ai.provider, "openai");
    assert_eq!(config.ai.model, "gpt-3.5-turbo");
    assert_eq!(config.ai.max_tokens, 1000);
    assert_eq!(config.uploads.max_file_size_mb, 10);
    assert_eq!(config.uploads.max_files, 3);
    assert_eq!(config.interview.question_count, 15);
    assert_eq!(config.interview.time_limit_minutes, 30);
    assert_eq!(config.voice.silence_timeout, 6);
    assert_eq!(config.proxy.title, "English Speaking Platform");
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = SparkConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

#[test]
fn rejects_wrong_type_with_path() {
    let err = SparkConfig::load_from_str(r#"{ uploads: { max_files: "three" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("uploads.max_files"), "{msg}");
}

#[test]
fn rejects_out_of_range_temperature() {
    let err = SparkConfig::load_from_str("{ ai: { temperature: 3.5 } }").unwrap_err();
    assert!(format!("{err}").contains("ai.temperature"));
}

#[test]
fn accepts_camel_case_aliases() {
    let config =
        SparkConfig::load_from_str(r#"{ ai: { apiKey: "sk-1", maxTokens: 500 } }"#).expect("config");
    assert_eq!(config.ai.api_key, "sk-1");
    assert_eq!(config.ai.max_tokens, 500);
}

#[test]
fn provider_overrides_parse() {
    let config = SparkConfig::load_from_str(
        r#"{ providers: { openai: { base_url: "http://127.0.0.1:9/v1", models: ["m1"] } } }"#,
    )
    .expect("config");
    let openai = config.providers.get("openai").expect("override");
    assert_eq!(openai.base_url.as_deref(), Some("http://127.0.0.1:9/v1"));
    assert_eq!(openai.models, Some(vec!["m1".to_string()]));
}

#[test]
fn layered_config_prefers_cwd_over_project_and_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let project_root = root.join("project");
    fs::create_dir_all(project_root.join(".git")).expect("git");
    let cwd = project_root.join("subdir");
    fs::create_dir_all(&cwd).expect("cwd");

    let user_config = root.join("user.json5");
    write_json5(
        &user_config,
        r#"{ ai: { provider: "deepseek", model: "deepseek-chat" }, uploads: { max_files: 5 } }"#,
    );
    write_json5(
        &project_root.join(DEFAULT_CONFIG_FILE),
        r#"{ ai: { model: "deepseek-coder" } }"#,
    );
    write_json5(&cwd.join(DEFAULT_CONFIG_FILE), "{ interview: { question_count: 8 } }");

    let mut options = LayeredConfigOptions::new(&cwd);
    options.user_config_path = Some(user_config);

    let layered = SparkConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.layers.len(), 3);
    assert_eq!(layered.config.ai.provider, "deepseek");
    assert_eq!(layered.config.ai.model, "deepseek-coder");
    assert_eq!(layered.config.uploads.max_files, 5);
    assert_eq!(layered.config.interview.question_count, 8);
}

#[test]
fn runtime_override_wins() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let user_config = root.join("user.json5");
    write_json5(&user_config, r#"{ proxy: { bind: "127.0.0.1:3001" } }"#);
    let runtime_config = root.join("runtime.json5");
    write_json5(&runtime_config, r#"{ proxy: { bind: "0.0.0.0:8080" } }"#);

    let mut options = LayeredConfigOptions::new(root).with_runtime_path(&runtime_config);
    options.user_config_path = Some(user_config);
    options.project_root_markers = Vec::new();

    let layered = SparkConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.proxy.bind, "0.0.0.0:8080");
    assert_eq!(
        layered.layers.last().map(|layer| layer.source),
        Some(ConfigLayerSource::Runtime)
    );
}

#[test]
fn missing_runtime_layer_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let mut options =
        LayeredConfigOptions::new(temp.path()).with_runtime_path(temp.path().join("absent.json5"));
    options.user_config_path = None;
    let err = SparkConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn invalid_layer_names_its_source() {
    let temp = TempDir::new().expect("tmp");
    let user_config = temp.path().join("user.json5");
    write_json5(&user_config, "{ voice: { rate: \"fast\" } }");
    let mut options = LayeredConfigOptions::new(temp.path());
    options.user_config_path = Some(user_config);
    let err = SparkConfig::load_layered_with_options(options).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("user("), "{msg}");
    assert!(msg.contains("voice.rate"), "{msg}");
}

#[test]
fn mixed_key_spellings_merge_across_layers() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let user_config = root.join("user.json5");
    write_json5(
        &user_config,
        r#"{ ai: { apiKey: "sk-user", maxTokens: 500 }, voice: { silenceTimeout: 4 } }"#,
    );
    write_json5(
        &root.join(DEFAULT_CONFIG_FILE),
        r#"{ ai: { api_key: "sk-project" }, voice: { silence_timeout: 9 } }"#,
    );
    let mut options = LayeredConfigOptions::new(root);
    options.user_config_path = Some(user_config);
    options.project_root_markers = Vec::new();

    let layered = SparkConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.ai.api_key, "sk-project");
    assert_eq!(layered.config.ai.max_tokens, 500);
    assert_eq!(layered.config.voice.silence_timeout, 9);
}

#[test]
fn rejects_oversized_upload_limit() {
    let err = SparkConfig::load_from_str("{ uploads: { max_file_size_mb: 4096 } }").unwrap_err();
    assert!(format!("{err}").contains("uploads.max_file_size_mb"), "{err}");
}

#[test]
fn upload_ceiling_saturates() {
    let uploads = crate::UploadsConfig {
        max_file_size_mb: u64::MAX,
        max_files: 1,
    };
    assert_eq!(uploads.max_file_size_bytes(), u64::MAX);
}
