//! Deterministic interview report.
//!
//! Everything here is a pure function of the session and `now`, so building
//! the same report twice yields identical output. Competency numbers are
//! placeholder baselines scaled by the mean score.

use crate::text::cached_regex;
use chrono::{DateTime, Utc};
use regex::Regex;
use spark_rs_protocol::{
    CandidateInfo, CommunicationCompetencies, Competencies, HiringDecision, InterviewDetails,
    InterviewQuestion, InterviewReport, InterviewSession, ReportNarrative, SignalStrength,
    TechnicalCompetencies,
};
use std::sync::OnceLock;

const RECOMMEND_THRESHOLD: f64 = 6.0;
const STRENGTH_SCORE: u8 = 7;
const WEAKNESS_SCORE: u8 = 4;

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static NAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Build the report for `session`. `now` stands in for a missing end time.
pub fn synthesize_report(session: &InterviewSession, now: DateTime<Utc>) -> InterviewReport {
    let average = mean_score(session.answered_questions());
    let percent = (average * 10.0).round() as u32;
    let resume = session
        .resume
        .as_ref()
        .map(|resume| resume.content.as_str())
        .unwrap_or_default();

    InterviewReport {
        id: format!("report-{}", session.id),
        candidate: extract_candidate_info(resume),
        interview_details: InterviewDetails {
            date: session.start_time.format("%Y-%m-%d").to_string(),
            duration: format_duration(session.start_time, session.end_time.unwrap_or(now)),
            resume_match: percent,
            signal_strength: signal_strength(average),
        },
        competencies: calculate_competencies(&session.questions),
        questions: session.questions.clone(),
        overall_score: percent,
        hiring_decision: if average >= RECOMMEND_THRESHOLD {
            HiringDecision::Recommended
        } else {
            HiringDecision::NotRecommended
        },
        feedback: overall_feedback(average).to_string(),
        narrative: default_narrative(session, average),
    }
}

/// Mean score; a missing score counts as zero.
fn mean_score<'a>(questions: impl Iterator<Item = &'a InterviewQuestion>) -> f64 {
    let (sum, count) = questions.fold((0u32, 0u32), |(sum, count), question| {
        (sum + u32::from(question.score.unwrap_or(0)), count + 1)
    });
    if count == 0 {
        0.0
    } else {
        f64::from(sum) / f64::from(count)
    }
}

fn signal_strength(average: f64) -> SignalStrength {
    if average >= 7.0 {
        SignalStrength::Good
    } else if average >= 5.0 {
        SignalStrength::Average
    } else {
        SignalStrength::Poor
    }
}

/// `MM:SS`, clamped at zero.
fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let seconds = (end - start).num_seconds().max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Scrape name, email and phone from resume text.
pub fn extract_candidate_info(resume: &str) -> CandidateInfo {
    let email = cached_regex(
        &EMAIL_RE,
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
    )
    .and_then(|re| re.find(resume))
    .map(|found| found.as_str().to_string());

    let phone = cached_regex(
        &PHONE_RE,
        r"(\+?1?[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})",
    )
    .and_then(|re| re.find(resume))
    .map(|found| found.as_str().to_string());

    // A short title-case first line is taken as the name.
    let name = resume
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| line.split(' ').count() <= 3)
        .filter(|line| {
            cached_regex(&NAME_RE, r"^[A-Z][a-zA-Z\s]*$").is_some_and(|re| re.is_match(line))
        })
        .map(str::to_string);

    CandidateInfo { name, email, phone }
}

/// Baseline competencies scaled by the mean over scored answers.
pub fn calculate_competencies(questions: &[InterviewQuestion]) -> Competencies {
    let mut communication = [65, 65, 55, 65, 65, 62];
    let mut technical = [60, 77, 67, 47, 65, 70, 35, 80];

    let scored: Vec<&InterviewQuestion> = questions
        .iter()
        .filter(|question| {
            question.response.as_deref().is_some_and(|r| !r.is_empty())
                && question.score.is_some_and(|score| score > 0)
        })
        .collect();

    if !scored.is_empty() {
        scale(&mut communication, mean_score(scored.iter().copied()) / 10.0);
        let technical_answers: Vec<&InterviewQuestion> = scored
            .iter()
            .copied()
            .filter(|question| question.category.is_technical())
            .collect();
        if !technical_answers.is_empty() {
            scale(&mut technical, mean_score(technical_answers.into_iter()) / 10.0);
        }
    }

    let [
        pronunciation,
        fluency,
        vocabulary,
        spoken_english_understanding,
        active_listening,
        grammar,
    ] = communication;
    let [
        verbal_communication,
        background_and_experience,
        data_structures_and_algorithms,
        operating_systems,
        database_systems,
        computer_networks,
        object_oriented_programming,
        coding,
    ] = technical;
    Competencies {
        communication: CommunicationCompetencies {
            pronunciation,
            fluency,
            vocabulary,
            spoken_english_understanding,
            active_listening,
            grammar,
        },
        technical: TechnicalCompetencies {
            verbal_communication,
            background_and_experience,
            data_structures_and_algorithms,
            operating_systems,
            database_systems,
            computer_networks,
            object_oriented_programming,
            coding,
        },
    }
}

fn scale(values: &mut [u32], multiplier: f64) {
    for value in values {
        *value = (f64::from(*value) * multiplier).round() as u32;
    }
}

fn overall_feedback(average: f64) -> &'static str {
    if average >= 8.0 {
        "Excellent performance with strong technical knowledge and clear communication. Demonstrated effective problem-solving skills and provided specific examples. Shows great potential for the role."
    } else if average >= 6.0 {
        "Good overall performance with solid understanding of key concepts. Communication was clear and responses showed relevant experience. Some areas could benefit from more detailed examples and deeper technical explanations."
    } else if average >= 4.0 {
        "Average performance with basic understanding of concepts. Communication needs improvement and responses lacked specific examples. Technical explanations could be more precise and structured."
    } else {
        "Below average performance with limited demonstration of required skills. Significant improvement needed in technical knowledge and communication clarity. Consider additional preparation and practice."
    }
}

/// Narrative derived from the question set.
fn default_narrative(session: &InterviewSession, average: f64) -> ReportNarrative {
    let mut narrative = ReportNarrative {
        detailed_feedback: overall_feedback(average).to_string(),
        ..ReportNarrative::default()
    };
    for question in session.answered_questions() {
        let score = question.score.unwrap_or(0);
        if score >= STRENGTH_SCORE {
            narrative
                .strengths
                .push(format!("{} ({}/10)", question.question, score));
        } else if score <= WEAKNESS_SCORE {
            narrative
                .weaknesses
                .push(format!("{} ({}/10)", question.question, score));
        }
        if score < STRENGTH_SCORE
            && let Some(feedback) = question.feedback.as_deref().map(str::trim)
            && !feedback.is_empty()
            && !narrative.recommendations.iter().any(|seen| seen == feedback)
        {
            narrative.recommendations.push(feedback.to_string());
        }
    }
    narrative
}
