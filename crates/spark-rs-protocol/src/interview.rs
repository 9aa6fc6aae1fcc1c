//! Interview questions and interview sessions.

use crate::session::SessionId;
use crate::upload::UploadedFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Interview difficulty level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Lenient parse used for model output; unknown values become medium.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of an interview question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionCategory {
    Introduction,
    Technical,
    Behavioral,
    #[serde(rename = "Problem-Solving")]
    ProblemSolving,
    Situational,
    Closing,
    General,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Introduction => "Introduction",
            QuestionCategory::Technical => "Technical",
            QuestionCategory::Behavioral => "Behavioral",
            QuestionCategory::ProblemSolving => "Problem-Solving",
            QuestionCategory::Situational => "Situational",
            QuestionCategory::Closing => "Closing",
            QuestionCategory::General => "General",
        }
    }

    /// Lenient parse used for model output; unknown values become General.
    pub fn parse(value: &str) -> Self {
        let normalized: String = value
            .chars()
            .filter(|ch| ch.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "introduction" => QuestionCategory::Introduction,
            "technical" => QuestionCategory::Technical,
            "behavioral" | "behavioural" => QuestionCategory::Behavioral,
            "problemsolving" => QuestionCategory::ProblemSolving,
            "situational" => QuestionCategory::Situational,
            "closing" => QuestionCategory::Closing,
            _ => QuestionCategory::General,
        }
    }

    /// Whether answers in this category feed the technical competency table.
    pub fn is_technical(&self) -> bool {
        matches!(
            self,
            QuestionCategory::Technical | QuestionCategory::ProblemSolving
        )
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single interview question and, once answered, its evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterviewQuestion {
    /// Stable id such as `q-1` or `fallback-3`.
    pub id: String,
    pub question: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Evaluation score on a 0..=10 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl InterviewQuestion {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        category: QuestionCategory,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            category,
            difficulty,
            response: None,
            score: None,
            feedback: None,
        }
    }

    /// A question counts as answered once it has a non-blank response.
    pub fn is_answered(&self) -> bool {
        self.response
            .as_deref()
            .is_some_and(|response| !response.trim().is_empty())
    }
}

/// Lifecycle of an interview attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Setup,
    Active,
    Paused,
    Completed,
}

/// Interview attempt: configuration plus the evolving question set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: SessionId,
    /// Role slug such as `software-engineer`.
    pub job_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_role: Option<String>,
    pub difficulty: Difficulty,
    /// Topic the interviewer should stress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<UploadedFile>,
    pub time_limit_minutes: u32,
    pub questions: Vec<InterviewQuestion>,
    pub current_index: usize,
    pub status: InterviewStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl InterviewSession {
    /// Create an interview in the setup state.
    pub fn new(
        job_role: impl Into<String>,
        difficulty: Difficulty,
        time_limit_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_role: job_role.into(),
            custom_role: None,
            difficulty,
            stress_field: None,
            additional_context: None,
            resume: None,
            time_limit_minutes,
            questions: Vec::new(),
            current_index: 0,
            status: InterviewStatus::Setup,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    /// Human-readable role: the custom role, else the slug with its first dash spaced.
    pub fn role_text(&self) -> String {
        match self.custom_role.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => self.job_role.replacen('-', " ", 1),
        }
    }

    /// Question currently being asked, if any remain.
    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        self.questions.get(self.current_index)
    }

    /// Questions with a non-blank response.
    pub fn answered_questions(&self) -> impl Iterator<Item = &InterviewQuestion> {
        self.questions.iter().filter(|question| question.is_answered())
    }
}
