//! Shared data model for Spark conversations, interviews, and reports.
//!
//! Everything here is plain serde data. Behaviour lives in `spark-rs-core`.

mod interview;
mod message;
mod report;
mod session;
mod upload;

pub use interview::{
    Difficulty, InterviewQuestion, InterviewSession, InterviewStatus, QuestionCategory,
};
pub use message::{AiResponse, Message, MessageId, MessageKind, MessageMetadata, Role};
pub use report::{
    CandidateInfo, CommunicationCompetencies, Competencies, HiringDecision, InterviewDetails,
    InterviewReport, ReportNarrative, ReportSections, SectionScore, SignalStrength,
    TechnicalCompetencies,
};
pub use session::{
    ConversationMode, ConversationSession, InterviewSettings, SessionId, SessionStats,
};
pub use upload::UploadedFile;
