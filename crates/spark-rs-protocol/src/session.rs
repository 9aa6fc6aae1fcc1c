//! Conversation sessions and their summary statistics.

use crate::interview::Difficulty;
use crate::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Conversation mode selecting the system prompt template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    #[default]
    Practice,
    Interview,
    General,
}

impl ConversationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationMode::Practice => "practice",
            ConversationMode::Interview => "interview",
            ConversationMode::General => "general",
        }
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interview settings used by the interview-mode conversation prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSettings {
    /// Job role being interviewed for.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Planned duration in minutes.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

/// Running statistics for a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Always equal to the number of messages in the session.
    pub total_messages: usize,
    /// Running sum of corrections across assistant messages.
    pub corrections: usize,
    /// Mean of scored assistant messages, 0 when none are scored.
    pub average_score: f64,
    /// Whole minutes between start and end, set when the session ends.
    pub duration_minutes: i64,
}

/// One continuous conversation attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSession {
    pub id: SessionId,
    pub mode: ConversationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_settings: Option<InterviewSettings>,
    pub messages: Vec<Message>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub stats: SessionStats,
}

impl ConversationSession {
    /// Start a fresh, active session in the given mode.
    pub fn new(mode: ConversationMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            interview_settings: None,
            messages: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
            is_active: true,
            stats: SessionStats::default(),
        }
    }
}
