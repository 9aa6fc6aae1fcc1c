use super::evaluate::{Evaluation, evaluation_prompt, parse_evaluation};
use super::questions::{fallback_questions, question_prompt, questions_or_fallback};
use super::{AnswerOutcome, InterviewFlow};
use crate::error::SparkCoreError;
use crate::prompt::mode_temperature;
use crate::text::outer_span;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use spark_rs_config::{AiSettings, InterviewConfig};
use spark_rs_llm::{ChatClient, ChatRequest};
use spark_rs_protocol::{
    ConversationMode, InterviewQuestion, InterviewReport, InterviewSession, InterviewStatus,
    ReportNarrative,
};
use std::sync::Arc;

const NARRATIVE_SYSTEM_PROMPT: &str =
    "You are an expert interview evaluator. Provide detailed, constructive feedback.";
const NARRATIVE_TEMPERATURE: f32 = 0.3;
const NARRATIVE_MAX_TOKENS: u32 = 2000;
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Model-backed parts of an interview: questions, evaluations and the narrative.
///
/// None of these calls fail the interview. Generation falls back to canned
/// questions and evaluation falls back to a neutral placeholder.
#[derive(Clone)]
pub struct InterviewService {
    client: Arc<dyn ChatClient>,
    question_count: usize,
    temperature: f32,
    max_tokens: u32,
}

impl InterviewService {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            question_count: InterviewConfig::default().question_count,
            temperature: mode_temperature(ConversationMode::Interview),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    /// Take temperature and token limit from the learner's settings.
    pub fn with_settings(mut self, settings: &AiSettings) -> Self {
        if let Some(temperature) = settings.temperature {
            self.temperature = temperature;
        }
        self.max_tokens = settings.max_tokens;
        self
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Ask for a question batch. Never fails and never pads a short batch.
    pub async fn generate_questions(&self, session: &InterviewSession) -> Vec<InterviewQuestion> {
        let request = ChatRequest::new(self.temperature, self.max_tokens)
            .with_user(question_prompt(session, self.question_count));
        match self.client.complete(request).await {
            Ok(raw) => {
                let questions = questions_or_fallback(&raw);
                info!(
                    "questions generated (session_id={}, count={})",
                    session.id,
                    questions.len()
                );
                questions
            }
            Err(err) => {
                warn!(
                    "question generation failed, using fallback set (session_id={}, err={})",
                    session.id, err
                );
                fallback_questions()
            }
        }
    }

    /// Score one answer. Transport failures yield the placeholder evaluation.
    pub async fn evaluate_response(
        &self,
        question: &InterviewQuestion,
        response: &str,
        resume: Option<&str>,
    ) -> Evaluation {
        let request = ChatRequest::new(self.temperature, self.max_tokens)
            .with_user(evaluation_prompt(question, response, resume));
        match self.client.complete(request).await {
            Ok(raw) => parse_evaluation(&raw),
            Err(err) => {
                warn!(
                    "evaluation failed (question_id={}, err={})",
                    question.id, err
                );
                Evaluation::unavailable()
            }
        }
    }

    /// Ask the model for a narrative over the answered questions.
    ///
    /// `None` when the call fails or the reply does not decode.
    pub async fn generate_narrative(
        &self,
        session: &InterviewSession,
        now: DateTime<Utc>,
    ) -> Option<ReportNarrative> {
        let request = ChatRequest::new(NARRATIVE_TEMPERATURE, NARRATIVE_MAX_TOKENS)
            .with_system(NARRATIVE_SYSTEM_PROMPT)
            .with_user(narrative_prompt(session, now))
            .json_mode(true);
        let raw = match self.client.complete(request).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("narrative generation failed (session_id={}, err={})", session.id, err);
                return None;
            }
        };
        let span = outer_span(&raw, '{', '}')?;
        match serde_json::from_str::<ReportNarrative>(span) {
            Ok(narrative) => Some(narrative),
            Err(err) => {
                debug!("narrative JSON did not decode (session_id={}, err={})", session.id, err);
                None
            }
        }
    }

    /// `setup -> active`: check the key, generate questions, start the clock at `now`.
    pub async fn start(
        &self,
        flow: &mut InterviewFlow,
        settings: &AiSettings,
        now: DateTime<Utc>,
    ) -> Result<(), SparkCoreError> {
        if !settings.has_api_key() {
            return Err(SparkCoreError::MissingApiKey);
        }
        if flow.status() != InterviewStatus::Setup {
            return Err(SparkCoreError::InvalidTransition {
                status: flow.status(),
                action: "start",
            });
        }
        let questions = self.generate_questions(flow.session()).await;
        flow.start(questions, now)
    }

    /// Evaluate an answer submitted at `now` and advance the flow.
    pub async fn submit_answer(
        &self,
        flow: &mut InterviewFlow,
        response: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SparkCoreError> {
        flow.ensure_accepting(now)?;
        let evaluation = match flow.current_question() {
            Some(question) => {
                let resume = flow
                    .session()
                    .resume
                    .as_ref()
                    .map(|resume| resume.content.as_str());
                self.evaluate_response(question, response, resume).await
            }
            None => Evaluation::unavailable(),
        };
        flow.record_answer(response, evaluation, now)
    }

    /// Deterministic report, with the model's narrative when one is available.
    pub async fn report(&self, flow: &InterviewFlow, now: DateTime<Utc>) -> InterviewReport {
        let mut report = flow.report(now);
        if report.questions.iter().any(InterviewQuestion::is_answered)
            && let Some(narrative) = self.generate_narrative(flow.session(), now).await
        {
            report.narrative = narrative;
        }
        report
    }
}

fn narrative_prompt(session: &InterviewSession, now: DateTime<Utc>) -> String {
    let minutes = (session.end_time.unwrap_or(now) - session.start_time)
        .num_minutes()
        .max(0);
    let focus = session
        .stress_field
        .as_deref()
        .map(str::trim)
        .filter(|focus| !focus.is_empty())
        .unwrap_or("general");
    let transcript = session
        .answered_questions()
        .map(|question| {
            format!(
                "assistant: {}\n\nuser: {}",
                question.question,
                question.response.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze this interview session and generate a comprehensive report.

Interview Details:
- Role: {role}
- Difficulty: {difficulty}
- Duration: {minutes} minutes
- Focus Areas: {focus}

Interview Conversation:
{transcript}

Generate a detailed interview report with:
1. Overall score (0-100)
2. Section scores for technical, communication, problem-solving, and experience
3. Strengths and weaknesses
4. Specific recommendations for improvement
5. Detailed feedback

Format the response as JSON with the following structure:
{{
  \"overallScore\": number,
  \"sections\": {{
    \"technical\": {{\"score\": number, \"feedback\": string, \"improvements\": [string]}},
    \"communication\": {{\"score\": number, \"feedback\": string, \"improvements\": [string]}},
    \"problemSolving\": {{\"score\": number, \"feedback\": string, \"improvements\": [string]}},
    \"experience\": {{\"score\": number, \"feedback\": string, \"improvements\": [string]}}
  }},
  \"strengths\": [string],
  \"weaknesses\": [string],
  \"recommendations\": [string],
  \"detailedFeedback\": string
}}",
        role = session.role_text(),
        difficulty = session.difficulty,
    )
}

#[cfg(test)]
mod tests {
    use super::narrative_prompt;
    use chrono::{Duration, TimeZone, Utc};
    use spark_rs_protocol::{Difficulty, InterviewSession};

    #[test]
    fn narrative_prompt_lists_answered_pairs_only() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut session = InterviewSession::new("product-manager", Difficulty::Easy, 30);
        session.start_time = t0;
        session.questions = crate::interview::questions::fallback_questions();
        session.questions[0].response = Some("I ship things.".to_string());
        let prompt = narrative_prompt(&session, t0 + Duration::minutes(7));
        assert!(prompt.contains("- Role: product manager"));
        assert!(prompt.contains("- Duration: 7 minutes"));
        assert!(prompt.contains("- Focus Areas: general"));
        assert!(prompt.contains("user: I ship things."));
        assert!(!prompt.contains("salary"));
    }
}
