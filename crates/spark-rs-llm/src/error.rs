use thiserror::Error;

/// Text shown to the learner when a chat call fails.
const GENERIC_FAILURE: &str =
    "Sorry, I encountered an error. Please check your API settings and try again.";

/// Errors raised while dispatching a chat request.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key configured; raised before any network call.
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    /// Non-2xx response from the provider.
    #[error("AI API error ({status}): {body}")]
    RequestFailed { status: u16, body: String },
    /// Response body was not JSON or lacked the completion text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl LlmError {
    /// Message suitable for appending to the conversation.
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmError::MissingApiKey => "Please configure your AI API key in settings first.",
            _ => GENERIC_FAILURE,
        }
    }
}
