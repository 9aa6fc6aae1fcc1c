//! Conversation messages and model reply annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a message.
pub type MessageId = Uuid;

/// Speaker role for a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Learner-authored message.
    User,
    /// Model-authored message.
    Assistant,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// How the learner produced a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Voice,
    File,
}

/// Optional annotations attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrections: Option<Vec<String>>,
    /// Fluency score on a 0..=10 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl MessageMetadata {
    /// Whether no annotation is present.
    pub fn is_empty(&self) -> bool {
        self == &MessageMetadata::default()
    }
}

/// Message stored in a session transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Role that produced the message.
    pub role: Role,
    /// Message content.
    pub content: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Input channel for the message.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Optional annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    /// Build a learner message.
    pub fn user(content: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            kind,
            metadata: None,
        }
    }

    /// Build a model message, dropping empty metadata.
    pub fn assistant(content: impl Into<String>, metadata: Option<MessageMetadata>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            metadata: metadata.filter(|meta| !meta.is_empty()),
        }
    }

    /// Number of corrections attached to this message.
    pub fn correction_count(&self) -> usize {
        self.metadata
            .as_ref()
            .and_then(|meta| meta.corrections.as_ref())
            .map_or(0, Vec::len)
    }

    /// Score attached to this message, if any.
    pub fn score(&self) -> Option<u8> {
        self.metadata.as_ref().and_then(|meta| meta.score)
    }
}

/// A model reply with the annotations extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AiResponse {
    /// Text shown to the learner.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrections: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl AiResponse {
    /// Convert the response into an assistant message.
    pub fn into_message(self) -> Message {
        let metadata = MessageMetadata {
            corrections: self.corrections,
            score: self.score,
            suggestions: self.suggestions,
            ..MessageMetadata::default()
        };
        Message::assistant(self.content, Some(metadata))
    }
}
