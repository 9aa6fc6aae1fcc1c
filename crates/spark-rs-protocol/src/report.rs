//! Interview report model.

use crate::interview::InterviewQuestion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contact details scraped from a resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CandidateInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignalStrength {
    Good,
    Average,
    Poor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDetails {
    /// Interview date, `YYYY-MM-DD`.
    pub date: String,
    /// Elapsed time, `MM:SS`.
    pub duration: String,
    /// Percentage derived from the mean score.
    pub resume_match: u32,
    pub signal_strength: SignalStrength,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationCompetencies {
    pub pronunciation: u32,
    pub fluency: u32,
    pub vocabulary: u32,
    pub spoken_english_understanding: u32,
    pub active_listening: u32,
    pub grammar: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalCompetencies {
    pub verbal_communication: u32,
    pub background_and_experience: u32,
    pub data_structures_and_algorithms: u32,
    pub operating_systems: u32,
    pub database_systems: u32,
    pub computer_networks: u32,
    pub object_oriented_programming: u32,
    pub coding: u32,
}

/// Named sub-skill scores on a 0..=100 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Competencies {
    pub communication: CommunicationCompetencies,
    pub technical: TechnicalCompetencies,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HiringDecision {
    Recommended,
    #[serde(rename = "Not Recommended")]
    NotRecommended,
}

impl HiringDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            HiringDecision::Recommended => "Recommended",
            HiringDecision::NotRecommended => "Not Recommended",
        }
    }
}

impl fmt::Display for HiringDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and commentary for one report section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SectionScore {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportSections {
    #[serde(default)]
    pub technical: SectionScore,
    #[serde(default)]
    pub communication: SectionScore,
    #[serde(default)]
    pub problem_solving: SectionScore,
    #[serde(default)]
    pub experience: SectionScore,
}

/// Free-text part of a report, either derived locally or written by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportNarrative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<ReportSections>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub detailed_feedback: String,
}

/// Final interview report. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewReport {
    /// `report-<session id>`.
    pub id: String,
    pub candidate: CandidateInfo,
    pub interview_details: InterviewDetails,
    pub competencies: Competencies,
    pub questions: Vec<InterviewQuestion>,
    /// Mean score scaled to 0..=100.
    pub overall_score: u32,
    pub hiring_decision: HiringDecision,
    pub feedback: String,
    pub narrative: ReportNarrative,
}
