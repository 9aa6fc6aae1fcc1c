//! Question-generation prompt, reply parsing and canned fallback questions.

use crate::text::outer_span;
use log::{debug, warn};
use serde::Deserialize;
use spark_rs_protocol::{Difficulty, InterviewQuestion, InterviewSession, QuestionCategory};

/// Prompt asking the model for `count` questions as a JSON array.
pub fn question_prompt(session: &InterviewSession, count: usize) -> String {
    let role = session.role_text();
    let mut extra = String::new();
    if let Some(stress) = non_blank(session.stress_field.as_deref()) {
        extra.push_str(&format!("\n\nFocus heavily on: {stress}"));
    }
    if let Some(resume) = session
        .resume
        .as_ref()
        .and_then(|resume| non_blank(Some(resume.content.as_str())))
    {
        extra.push_str(&format!("\n\nCandidate's Resume:\n{resume}"));
    }
    if let Some(context) = non_blank(session.additional_context.as_deref()) {
        extra.push_str(&format!("\n\nAdditional Context: {context}"));
    }

    format!(
        "Generate {count} interview questions for a {role} position at {difficulty} difficulty level.

Requirements:
- Start with \"Tell me about yourself\" as the first question
- Include 2-3 basic introduction/background questions
- Include 4-5 role-specific technical questions
- Include 2-3 behavioral questions (STAR method scenarios)
- Include 1-2 problem-solving questions
- Include 1-2 situational/hypothetical questions
- End with \"Do you have any questions for us?\"
{extra}

Return ONLY a JSON array of questions in this format:
[
  {{
    \"question\": \"Tell me about yourself and your experience in software development.\",
    \"category\": \"Introduction\",
    \"difficulty\": \"easy\"
  }}
]

Categories should be: Introduction, Technical, Behavioral, Problem-Solving, Situational, Closing",
        difficulty = session.difficulty,
    )
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

/// Parse generated questions, assigning ids `q-1`, `q-2`, ...
///
/// The first `[...]` span is decoded as JSON; when that fails, lines that
/// look like questions are kept instead. The result is never padded.
pub fn parse_questions(raw: &str) -> Vec<InterviewQuestion> {
    let parsed = outer_span(raw, '[', ']')
        .and_then(|span| match serde_json::from_str::<Vec<RawQuestion>>(span) {
            Ok(items) => Some(items),
            Err(err) => {
                debug!("question JSON did not decode, using line heuristic (err={})", err);
                None
            }
        })
        .map(|items| {
            items
                .into_iter()
                .filter(|item| !item.question.trim().is_empty())
                .map(|item| {
                    let category = item
                        .category
                        .as_deref()
                        .map(QuestionCategory::parse)
                        .unwrap_or_else(|| categorize_question(&item.question));
                    let difficulty = item
                        .difficulty
                        .as_deref()
                        .map(Difficulty::parse)
                        .unwrap_or_default();
                    (item.question.trim().to_string(), category, difficulty)
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| parse_question_lines(raw));

    parsed
        .into_iter()
        .enumerate()
        .map(|(index, (question, category, difficulty))| {
            InterviewQuestion::new(format!("q-{}", index + 1), question, category, difficulty)
        })
        .collect()
}

fn parse_question_lines(raw: &str) -> Vec<(String, QuestionCategory, Difficulty)> {
    const CUES: [&str; 5] = ["tell me", "describe", "how", "what", "why"];
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            line.contains("\"question\"") || CUES.iter().any(|cue| lower.contains(cue))
        })
        .filter_map(|line| {
            let text: String = strip_numbering(line.trim_start())
                .chars()
                .filter(|ch| *ch != '"' && *ch != '\'')
                .collect();
            let text = text.trim();
            (text.chars().count() > 10).then(|| {
                (
                    text.to_string(),
                    categorize_question(text),
                    Difficulty::Medium,
                )
            })
        })
        .collect()
}

/// Drop a leading `12. ` style list marker.
fn strip_numbering(line: &str) -> &str {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

/// Keyword-based category for a question without one.
pub fn categorize_question(question: &str) -> QuestionCategory {
    let lower = question.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|needle| lower.contains(needle));
    if has(&["tell me about yourself", "introduce"]) {
        QuestionCategory::Introduction
    } else if has(&["technical", "algorithm", "code", "system"]) {
        QuestionCategory::Technical
    } else if has(&["time when", "situation", "example of"]) {
        QuestionCategory::Behavioral
    } else if has(&["problem", "challenge"]) {
        QuestionCategory::ProblemSolving
    } else if has(&["would you", "how would"]) {
        QuestionCategory::Situational
    } else if has(&["questions for us", "any questions"]) {
        QuestionCategory::Closing
    } else {
        QuestionCategory::General
    }
}

/// Canned questions used when generation fails or yields nothing.
pub fn fallback_questions() -> Vec<InterviewQuestion> {
    use Difficulty::{Easy, Medium};
    use QuestionCategory::{Behavioral, Closing, General, Introduction, Situational, Technical};
    let canned = [
        ("Tell me about yourself and your experience in software development.", Introduction, Easy),
        ("What interests you most about this role?", Introduction, Easy),
        ("Walk me through your most challenging project.", Behavioral, Medium),
        ("How do you stay updated with new technologies?", Technical, Easy),
        ("Describe your approach to debugging a complex issue.", Technical, Medium),
        ("Tell me about a time you had to work with a difficult team member.", Behavioral, Medium),
        ("How would you explain a technical concept to a non-technical person?", Situational, Medium),
        ("What are your salary expectations?", General, Easy),
        ("Where do you see yourself in 5 years?", General, Easy),
        ("Do you have any questions for us?", Closing, Easy),
    ];
    canned
        .into_iter()
        .enumerate()
        .map(|(index, (question, category, difficulty))| {
            InterviewQuestion::new(
                format!("fallback-{}", index + 1),
                question,
                category,
                difficulty,
            )
        })
        .collect()
}

/// Parsed questions, or the canned set when the reply held none.
pub fn questions_or_fallback(raw: &str) -> Vec<InterviewQuestion> {
    let questions = parse_questions(raw);
    if questions.is_empty() {
        warn!("model reply held no usable questions; using fallback set");
        return fallback_questions();
    }
    questions
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        categorize_question, fallback_questions, parse_questions, question_prompt,
        questions_or_fallback,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use spark_rs_protocol::{Difficulty, InterviewSession, QuestionCategory, UploadedFile};

    #[test]
    fn parses_json_array_inside_prose() {
        let raw = r#"Sure! Here they are:
[
  {"question": "Tell me about yourself.", "category": "Introduction", "difficulty": "easy"},
  {"question": "How do you design a cache?", "category": "Problem-Solving", "difficulty": "hard"},
  {"question": "Any questions?", "category": "Closing"}
]
Good luck!"#;
        let questions = parse_questions(raw);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].id, "q-1");
        assert_eq!(questions[1].category, QuestionCategory::ProblemSolving);
        assert_eq!(questions[1].difficulty, Difficulty::Hard);
        assert_eq!(questions[2].difficulty, Difficulty::Medium);
    }

    #[test]
    fn falls_back_to_line_heuristic() {
        let raw = "1. Tell me about yourself.\n2. \"Describe a system you built.\"\n3. Thanks\n4. Why?";
        let questions = parse_questions(raw);
        let texts: Vec<&str> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Tell me about yourself.", "Describe a system you built."]
        );
        assert_eq!(questions[0].category, QuestionCategory::Introduction);
        assert_eq!(questions[1].category, QuestionCategory::Technical);
        assert_eq!(questions[1].difficulty, Difficulty::Medium);
        assert_eq!(questions[1].id, "q-2");
    }

    #[test]
    fn short_results_are_not_padded() {
        let raw = r#"[{"question": "Tell me about yourself.", "category": "Introduction", "difficulty": "easy"}]"#;
        assert_eq!(questions_or_fallback(raw).len(), 1);
        assert_eq!(questions_or_fallback("no questions here").len(), 10);
    }

    #[test]
    fn categorize_follows_keyword_order() {
        assert_eq!(
            categorize_question("Please introduce yourself"),
            QuestionCategory::Introduction
        );
        assert_eq!(
            categorize_question("Explain this algorithm"),
            QuestionCategory::Technical
        );
        assert_eq!(
            categorize_question("Describe a situation where you led"),
            QuestionCategory::Behavioral
        );
        assert_eq!(
            categorize_question("What was your biggest challenge?"),
            QuestionCategory::ProblemSolving
        );
        assert_eq!(
            categorize_question("What would you do next?"),
            QuestionCategory::Situational
        );
        assert_eq!(
            categorize_question("Do you have any questions?"),
            QuestionCategory::Closing
        );
        assert_eq!(
            categorize_question("Where do you see yourself?"),
            QuestionCategory::General
        );
    }

    #[test]
    fn fallback_set_is_stable() {
        let questions = fallback_questions();
        assert_eq!(questions.len(), 10);
        assert_eq!(questions[0].id, "fallback-1");
        assert_eq!(questions[9].question, "Do you have any questions for us?");
        assert_eq!(questions[9].category, QuestionCategory::Closing);
    }

    #[test]
    fn prompt_includes_optional_context() {
        let mut session = InterviewSession::new("data-scientist", Difficulty::Hard, 30);
        session.stress_field = Some("statistics".to_string());
        session.additional_context = Some("Remote team".to_string());
        session.resume = Some(UploadedFile {
            id: "r1".to_string(),
            name: "cv.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size: 10,
            content: "Jane Doe".to_string(),
            uploaded_at: Utc::now(),
        });
        let prompt = question_prompt(&session, 15);
        assert!(prompt.starts_with(
            "Generate 15 interview questions for a data scientist position at hard difficulty level."
        ));
        assert!(prompt.contains("Focus heavily on: statistics"));
        assert!(prompt.contains("Candidate's Resume:\nJane Doe"));
        assert!(prompt.contains("Additional Context: Remote team"));
    }
}
