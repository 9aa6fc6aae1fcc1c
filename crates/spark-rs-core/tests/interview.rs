use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use spark_rs_config::AiSettings;
use spark_rs_core::{AnswerOutcome, InterviewFlow, InterviewService, SparkCoreError};
use spark_rs_protocol::{
    Difficulty, HiringDecision, InterviewSession, InterviewStatus, QuestionCategory,
};
use spark_rs_test_utils::{FailingChat, RecordingChat, ScriptedChat};
use std::sync::Arc;

const QUESTIONS: &str = r#"Here you go:
[
  {"question": "Tell me about yourself.", "category": "Introduction", "difficulty": "easy"},
  {"question": "Explain how you would shard a database.", "category": "Technical", "difficulty": "hard"}
]"#;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

fn keyed() -> AiSettings {
    AiSettings {
        api_key: "sk-test".to_string(),
        ..AiSettings::default()
    }
}

fn new_flow() -> InterviewFlow {
    InterviewFlow::new(InterviewSession::new(
        "backend-engineer",
        Difficulty::Hard,
        30,
    ))
}

#[tokio::test]
async fn scripted_interview_runs_to_report() {
    let chat = ScriptedChat::new()
        .reply(QUESTIONS)
        .reply("SCORE: 8\nFEEDBACK: Confident and concise.")
        .reply("SCORE: 6\nFEEDBACK: Mention replication.")
        .fail(503);
    let service = InterviewService::new(Arc::new(chat.clone()));
    let mut flow = new_flow();

    service.start(&mut flow, &keyed(), t0()).await.expect("start");
    assert_eq!(flow.status(), InterviewStatus::Active);
    assert_eq!(flow.session().questions.len(), 2);
    assert_eq!(
        flow.current_question().map(|q| q.category),
        Some(QuestionCategory::Introduction)
    );

    let outcome = service
        .submit_answer(&mut flow, "I build APIs in Rust.", t0() + Duration::minutes(2))
        .await
        .expect("first answer");
    assert_eq!(outcome, AnswerOutcome::Next(1));
    let outcome = service
        .submit_answer(&mut flow, "Hash the tenant id.", t0() + Duration::minutes(5))
        .await
        .expect("second answer");
    assert_eq!(outcome, AnswerOutcome::Finished);
    assert_eq!(flow.status(), InterviewStatus::Completed);

    // Narrative call fails, so the derived narrative is kept.
    let report = service.report(&flow, t0() + Duration::minutes(9)).await;
    assert_eq!(chat.remaining(), 0);
    assert_eq!(report.overall_score, 70);
    assert_eq!(report.hiring_decision, HiringDecision::Recommended);
    assert_eq!(report.interview_details.duration, "05:00");
    assert_eq!(report.narrative.strengths.len(), 1);
    assert_eq!(
        report.narrative.recommendations,
        vec!["Mention replication.".to_string()]
    );
    assert_eq!(report.competencies.technical.coding, 48);
}

#[tokio::test]
async fn model_narrative_replaces_derived_one() {
    let chat = ScriptedChat::new()
        .reply(QUESTIONS)
        .reply("SCORE: 9\nFEEDBACK: Great.")
        .reply(
            r#"Report follows {"overallScore": 80, "strengths": ["Clear"], "weaknesses": [],
            "recommendations": ["Practise system design"], "detailedFeedback": "Solid."}"#,
        );
    let service = InterviewService::new(Arc::new(chat));
    let mut flow = new_flow();
    service.start(&mut flow, &keyed(), t0()).await.expect("start");
    service
        .submit_answer(&mut flow, "I build APIs.", t0() + Duration::minutes(1))
        .await
        .expect("answer");
    flow.end(t0() + Duration::minutes(2)).expect("end");

    let report = service.report(&flow, t0() + Duration::minutes(3)).await;
    assert_eq!(report.narrative.strengths, vec!["Clear".to_string()]);
    assert_eq!(report.narrative.detailed_feedback, "Solid.");
    assert_eq!(report.narrative.sections, None);
    assert_eq!(report.overall_score, 90);
}

#[tokio::test]
async fn generation_failure_uses_fallback_questions() {
    let service = InterviewService::new(Arc::new(FailingChat::new(500)));
    let mut flow = new_flow();
    service.start(&mut flow, &keyed(), t0()).await.expect("start");
    assert_eq!(flow.session().questions.len(), 10);
    assert_eq!(flow.session().questions[0].id, "fallback-1");

    // Evaluation also fails and yields the neutral placeholder.
    service
        .submit_answer(&mut flow, "Hello", t0() + Duration::minutes(1))
        .await
        .expect("answer");
    let first = &flow.session().questions[0];
    assert_eq!(first.score, Some(5));
    assert_eq!(
        first.feedback.as_deref(),
        Some("Unable to evaluate response at this time. Please continue with the next question.")
    );
}

#[tokio::test]
async fn start_requires_api_key() {
    let (chat, seen) = RecordingChat::new(QUESTIONS);
    let service = InterviewService::new(Arc::new(chat));
    let mut flow = new_flow();
    let err = service
        .start(&mut flow, &AiSettings::default(), t0())
        .await
        .unwrap_err();
    assert!(matches!(err, SparkCoreError::MissingApiKey));
    assert_eq!(flow.status(), InterviewStatus::Setup);
    assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn question_request_uses_configured_count_and_settings() {
    let (chat, seen) = RecordingChat::new(QUESTIONS);
    let settings = AiSettings {
        temperature: Some(0.2),
        max_tokens: 600,
        ..keyed()
    };
    let service = InterviewService::new(Arc::new(chat))
        .with_question_count(5)
        .with_settings(&settings);
    let mut flow = new_flow();
    service.start(&mut flow, &settings, t0()).await.expect("start");

    let seen = seen.lock();
    let request = &seen[0];
    assert_eq!(request.temperature, 0.2);
    assert_eq!(request.max_tokens, 600);
    assert!(request.messages[0].content.starts_with(
        "Generate 5 interview questions for a backend engineer position at hard difficulty level."
    ));
}

#[tokio::test]
async fn answers_after_time_limit_are_rejected_without_evaluation() {
    let chat = ScriptedChat::new().reply(QUESTIONS);
    let service = InterviewService::new(Arc::new(chat.clone()));
    let mut flow = new_flow();
    service.start(&mut flow, &keyed(), t0()).await.expect("start");
    let err = service
        .submit_answer(&mut flow, "late", t0() + Duration::minutes(31))
        .await
        .unwrap_err();
    assert!(matches!(err, SparkCoreError::TimeExpired));
    assert_eq!(flow.status(), InterviewStatus::Completed);
    assert_eq!(chat.remaining(), 0);
    let report = flow.report(t0() + Duration::minutes(40));
    assert_eq!(report.overall_score, 0);
    assert_eq!(report.hiring_decision, HiringDecision::NotRecommended);
}
