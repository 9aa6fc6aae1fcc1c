//! Error types for the core orchestration crate.

use spark_rs_config::SettingsError;
use spark_rs_llm::LlmError;
use spark_rs_protocol::{InterviewStatus, SessionId};
use thiserror::Error;

/// Errors returned by conversation and interview operations.
#[derive(Debug, Error)]
pub enum SparkCoreError {
    /// No API key configured; nothing was sent.
    #[error("API key is not configured")]
    MissingApiKey,
    /// Session id is unknown to the store.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
    /// Session has already ended.
    #[error("session is not active: {0}")]
    InactiveSession(SessionId),
    /// Interview is not in a state that allows the action.
    #[error("cannot {action} while interview is {status:?}")]
    InvalidTransition {
        status: InterviewStatus,
        action: &'static str,
    },
    /// The interview countdown ran out.
    #[error("interview time limit reached")]
    TimeExpired,
    /// Chat dispatch failed.
    #[error("chat error: {0}")]
    Llm(#[from] LlmError),
    /// Persisting settings failed.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl SparkCoreError {
    /// Message suitable for showing to the learner.
    pub fn user_message(&self) -> String {
        match self {
            SparkCoreError::Llm(err) => err.user_message().to_string(),
            SparkCoreError::MissingApiKey => LlmError::MissingApiKey.user_message().to_string(),
            other => other.to_string(),
        }
    }
}
