//! Interview state machine.
//!
//! `InterviewFlow` owns an `InterviewSession` plus countdown bookkeeping.
//! Every transition takes an explicit `now` so the timer is deterministic.
//!
//! ```text
//! setup --start--> active --pause--> paused --resume--> active
//!                    |  (end | time limit | last answer)
//!                    v
//!                completed
//! ```

pub mod evaluate;
pub mod questions;
mod service;

pub use evaluate::Evaluation;
pub use service::InterviewService;

use crate::error::SparkCoreError;
use crate::report::synthesize_report;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use spark_rs_protocol::{InterviewQuestion, InterviewReport, InterviewSession, InterviewStatus};

/// Result of recording an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Another question is waiting at this index.
    Next(usize),
    /// The last question was answered and the interview completed.
    Finished,
}

#[derive(Debug, Clone)]
pub struct InterviewFlow {
    session: InterviewSession,
    /// Active time accumulated before the latest resume.
    banked: Duration,
    /// When the current active stretch began; `None` unless active.
    running_since: Option<DateTime<Utc>>,
}

impl InterviewFlow {
    pub fn new(session: InterviewSession) -> Self {
        Self {
            session,
            banked: Duration::zero(),
            running_since: None,
        }
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn status(&self) -> InterviewStatus {
        self.session.status
    }

    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        match self.session.status {
            InterviewStatus::Active | InterviewStatus::Paused => self.session.current_question(),
            _ => None,
        }
    }

    /// `setup -> active` with the generated question set.
    pub fn start(
        &mut self,
        questions: Vec<InterviewQuestion>,
        now: DateTime<Utc>,
    ) -> Result<(), SparkCoreError> {
        self.expect_status(InterviewStatus::Setup, "start")?;
        info!(
            "interview started (session_id={}, questions={}, time_limit_minutes={})",
            self.session.id,
            questions.len(),
            self.session.time_limit_minutes
        );
        self.session.questions = questions;
        self.session.current_index = 0;
        self.session.start_time = now;
        self.session.status = InterviewStatus::Active;
        self.running_since = Some(now);
        if self.session.questions.is_empty() {
            self.complete(now);
        }
        Ok(())
    }

    /// `active -> paused`; the countdown stops.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), SparkCoreError> {
        self.expect_status(InterviewStatus::Active, "pause")?;
        if self.expire_if_due(now) {
            return Err(SparkCoreError::TimeExpired);
        }
        self.bank(now);
        self.session.status = InterviewStatus::Paused;
        debug!("interview paused (session_id={})", self.session.id);
        Ok(())
    }

    /// `paused -> active`; the countdown continues from where it stopped.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), SparkCoreError> {
        self.expect_status(InterviewStatus::Paused, "resume")?;
        self.session.status = InterviewStatus::Active;
        self.running_since = Some(now);
        debug!("interview resumed (session_id={})", self.session.id);
        Ok(())
    }

    /// Active time spent so far.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let running = self
            .running_since
            .map(|since| (now - since).max(Duration::zero()))
            .unwrap_or_else(Duration::zero);
        self.banked + running
    }

    pub fn time_limit(&self) -> Duration {
        Duration::minutes(i64::from(self.session.time_limit_minutes))
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.time_limit() - self.elapsed(now)).max(Duration::zero())
    }

    /// Complete the interview if the countdown has run out. Returns whether it did.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.session.status != InterviewStatus::Active || self.remaining(now) > Duration::zero()
        {
            return false;
        }
        info!("interview time limit reached (session_id={})", self.session.id);
        self.complete(now);
        true
    }

    /// Whether an answer submitted at `now` would be accepted.
    pub fn ensure_accepting(&mut self, now: DateTime<Utc>) -> Result<(), SparkCoreError> {
        self.expect_status(InterviewStatus::Active, "answer")?;
        if self.expire_if_due(now) {
            return Err(SparkCoreError::TimeExpired);
        }
        Ok(())
    }

    /// Store the evaluated answer on the current question and advance.
    pub fn record_answer(
        &mut self,
        response: impl Into<String>,
        evaluation: Evaluation,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SparkCoreError> {
        self.ensure_accepting(now)?;
        let index = self.session.current_index;
        let Some(question) = self.session.questions.get_mut(index) else {
            self.complete(now);
            return Ok(AnswerOutcome::Finished);
        };
        question.response = Some(response.into());
        question.score = Some(evaluation.score);
        question.feedback = Some(evaluation.feedback);
        debug!(
            "answer recorded (session_id={}, question_id={}, score={})",
            self.session.id, question.id, evaluation.score
        );

        self.session.current_index += 1;
        if self.session.current_index >= self.session.questions.len() {
            self.complete(now);
            return Ok(AnswerOutcome::Finished);
        }
        Ok(AnswerOutcome::Next(self.session.current_index))
    }

    /// Manual end from active or paused.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<(), SparkCoreError> {
        match self.session.status {
            InterviewStatus::Active | InterviewStatus::Paused => {
                self.complete(now);
                Ok(())
            }
            status => Err(SparkCoreError::InvalidTransition {
                status,
                action: "end",
            }),
        }
    }

    /// Report over the answered questions; `now` stands in for a missing end time.
    pub fn report(&self, now: DateTime<Utc>) -> InterviewReport {
        synthesize_report(&self.session, now)
    }

    pub fn into_session(self) -> InterviewSession {
        self.session
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        if self.session.status == InterviewStatus::Active {
            self.bank(now);
        }
        self.running_since = None;
        self.session.status = InterviewStatus::Completed;
        self.session.end_time = Some(now);
        info!(
            "interview completed (session_id={}, answered={})",
            self.session.id,
            self.session.answered_questions().count()
        );
    }

    fn bank(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.running_since.take() {
            self.banked += (now - since).max(Duration::zero());
        }
    }

    fn expect_status(
        &self,
        expected: InterviewStatus,
        action: &'static str,
    ) -> Result<(), SparkCoreError> {
        if self.session.status == expected {
            Ok(())
        } else {
            Err(SparkCoreError::InvalidTransition {
                status: self.session.status,
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnswerOutcome, Evaluation, InterviewFlow};
    use crate::SparkCoreError;
    use crate::interview::questions::fallback_questions;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use spark_rs_protocol::{Difficulty, InterviewSession, InterviewStatus};

    fn flow(minutes: u32) -> InterviewFlow {
        InterviewFlow::new(InterviewSession::new("software-engineer", Difficulty::Medium, minutes))
    }

    fn eval(score: u8) -> Evaluation {
        Evaluation {
            score,
            feedback: "fine".to_string(),
        }
    }

    #[test]
    fn answers_advance_until_finished() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut flow = flow(30);
        let questions = fallback_questions().into_iter().take(2).collect();
        flow.start(questions, t0).expect("start");
        assert_eq!(flow.status(), InterviewStatus::Active);

        let outcome = flow
            .record_answer("I write Rust.", eval(7), t0 + Duration::minutes(1))
            .expect("first");
        assert_eq!(outcome, AnswerOutcome::Next(1));
        let outcome = flow
            .record_answer("The role fits me.", eval(8), t0 + Duration::minutes(2))
            .expect("second");
        assert_eq!(outcome, AnswerOutcome::Finished);
        assert_eq!(flow.status(), InterviewStatus::Completed);
        assert_eq!(flow.session().end_time, Some(t0 + Duration::minutes(2)));
        assert_eq!(flow.session().questions[0].score, Some(7));
    }

    #[test]
    fn countdown_forces_completion() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut flow = flow(5);
        flow.start(fallback_questions(), t0).expect("start");
        assert!(!flow.expire_if_due(t0 + Duration::minutes(4)));
        let err = flow
            .record_answer("late", eval(9), t0 + Duration::minutes(5))
            .unwrap_err();
        assert!(matches!(err, SparkCoreError::TimeExpired));
        assert_eq!(flow.status(), InterviewStatus::Completed);
        assert_eq!(flow.session().answered_questions().count(), 0);
    }

    #[test]
    fn pause_stops_the_clock_and_rejects_answers() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut flow = flow(10);
        flow.start(fallback_questions(), t0).expect("start");
        flow.pause(t0 + Duration::minutes(4)).expect("pause");
        assert!(matches!(
            flow.record_answer("x", eval(5), t0 + Duration::minutes(5)),
            Err(SparkCoreError::InvalidTransition { .. })
        ));
        // An hour paused does not count against the limit.
        flow.resume(t0 + Duration::minutes(64)).expect("resume");
        assert_eq!(flow.elapsed(t0 + Duration::minutes(65)), Duration::minutes(5));
        assert_eq!(flow.remaining(t0 + Duration::minutes(65)), Duration::minutes(5));
        assert!(!flow.expire_if_due(t0 + Duration::minutes(69)));
        assert!(flow.expire_if_due(t0 + Duration::minutes(70)));
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut flow = flow(10);
        assert!(flow.pause(t0).is_err());
        assert!(flow.end(t0).is_err());
        flow.start(fallback_questions(), t0).expect("start");
        assert!(flow.start(fallback_questions(), t0).is_err());
        flow.end(t0 + Duration::minutes(1)).expect("end");
        assert!(flow.resume(t0).is_err());
        assert_eq!(flow.current_question(), None);
    }

    #[test]
    fn empty_question_set_completes_immediately() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut flow = flow(10);
        flow.start(Vec::new(), t0).expect("start");
        assert_eq!(flow.status(), InterviewStatus::Completed);
        let report = flow.report(t0);
        assert_eq!(report.overall_score, 0);
    }
}
