//! Provider-neutral chat request and its message turns.

use serde::Serialize;
use spark_rs_protocol::{Message, Role};

/// One turn sent to the provider.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User.as_str(),
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content.clone(),
        }
    }
}

/// Provider-neutral chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask OpenAI-compatible providers for a JSON object reply.
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            system: None,
            messages: Vec::new(),
            temperature,
            max_tokens,
            json_mode: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Append conversation history in order.
    pub fn with_history<'a>(mut self, history: impl IntoIterator<Item = &'a Message>) -> Self {
        self.messages.extend(history.into_iter().map(ChatMessage::from));
        self
    }

    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    pub fn json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }
}
