//! Per-answer evaluation prompt and reply parsing.

use crate::text::cached_regex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use spark_rs_protocol::InterviewQuestion;
use std::sync::OnceLock;

const MAX_SCORE: u8 = 10;
const DEFAULT_SCORE: u8 = 5;
const DEFAULT_FEEDBACK: &str = "Good response. Consider providing more specific examples.";
const UNAVAILABLE_FEEDBACK: &str =
    "Unable to evaluate response at this time. Please continue with the next question.";

static SCORE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static FEEDBACK_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Score and feedback for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0..=10.
    pub score: u8,
    pub feedback: String,
}

impl Evaluation {
    /// Placeholder used when the evaluator could not be reached.
    pub fn unavailable() -> Self {
        Self {
            score: DEFAULT_SCORE,
            feedback: UNAVAILABLE_FEEDBACK.to_string(),
        }
    }
}

pub fn evaluation_prompt(
    question: &InterviewQuestion,
    response: &str,
    resume: Option<&str>,
) -> String {
    let resume_context = resume
        .map(str::trim)
        .filter(|resume| !resume.is_empty())
        .map(|resume| format!("\n\nCandidate's Resume Context:\n{resume}"))
        .unwrap_or_default();
    format!(
        "Evaluate this interview response on a scale of 1-10:

Question: \"{question}\"
Category: {category}
Candidate's Response: \"{response}\"
{resume_context}

Provide evaluation considering:
- Relevance and completeness of the answer
- Communication clarity and structure
- Technical accuracy (if applicable)
- Use of specific examples
- Professional demeanor in language

Return your evaluation in this exact format:
SCORE: [number 1-10]
FEEDBACK: [detailed feedback in 2-3 sentences]",
        question = question.question,
        category = question.category,
    )
}

/// Read `SCORE:` and `FEEDBACK:` out of an evaluator reply.
///
/// Missing parts take defaults; scores above 10 are clamped.
pub fn parse_evaluation(raw: &str) -> Evaluation {
    let score = cached_regex(&SCORE_RE, r"(?i)SCORE:\s*(\d+)")
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|found| {
            found
                .as_str()
                .parse::<u32>()
                .map_or(MAX_SCORE, |score| score.min(u32::from(MAX_SCORE)) as u8)
        })
        .unwrap_or(DEFAULT_SCORE);

    let feedback = cached_regex(&FEEDBACK_RE, r"(?is)FEEDBACK:\s*(.+)")
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|found| found.as_str().trim().to_string())
        .filter(|feedback| !feedback.is_empty())
        .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());

    Evaluation { score, feedback }
}

#[cfg(test)]
mod tests {
    use super::{Evaluation, evaluation_prompt, parse_evaluation};
    use pretty_assertions::assert_eq;
    use spark_rs_protocol::{Difficulty, InterviewQuestion, QuestionCategory};

    #[test]
    fn parses_score_and_multiline_feedback() {
        let evaluation =
            parse_evaluation("score: 8\nFeedback: Clear structure.\nAdd a concrete metric.  ");
        assert_eq!(
            evaluation,
            Evaluation {
                score: 8,
                feedback: "Clear structure.\nAdd a concrete metric.".to_string(),
            }
        );
    }

    #[test]
    fn missing_parts_take_defaults() {
        let evaluation = parse_evaluation("I liked it.");
        assert_eq!(evaluation.score, 5);
        assert_eq!(
            evaluation.feedback,
            "Good response. Consider providing more specific examples."
        );
    }

    #[test]
    fn oversized_scores_are_clamped() {
        assert_eq!(parse_evaluation("SCORE: 15").score, 10);
        assert_eq!(parse_evaluation("SCORE: 99999999999").score, 10);
    }

    #[test]
    fn prompt_carries_question_and_resume() {
        let question = InterviewQuestion::new(
            "q-2",
            "Describe a system you built.",
            QuestionCategory::Technical,
            Difficulty::Medium,
        );
        let prompt = evaluation_prompt(&question, "A queue.", Some("Rust, Go"));
        assert!(prompt.contains("Question: \"Describe a system you built.\""));
        assert!(prompt.contains("Category: Technical"));
        assert!(prompt.contains("Candidate's Response: \"A queue.\""));
        assert!(prompt.contains("Candidate's Resume Context:\nRust, Go"));
        assert!(!evaluation_prompt(&question, "A queue.", None).contains("Resume"));
    }
}
