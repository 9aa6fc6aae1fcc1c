//! Conversation and interview orchestration for Spark.
//!
//! This crate owns prompt assembly, reply annotation, the application state
//! reducer, the conversation service, the interview state machine, and report
//! synthesis. Network access goes through `spark_rs_llm::ChatClient`.

pub mod annotate;
pub mod conversation;
pub mod error;
pub mod interview;
pub mod prompt;
pub mod report;
pub mod state;
mod text;

pub use annotate::annotate;
pub use conversation::ConversationService;
pub use error::SparkCoreError;
pub use interview::{AnswerOutcome, Evaluation, InterviewFlow, InterviewService};
pub use prompt::{PromptBuilder, PromptContext, mode_temperature};
pub use report::synthesize_report;
pub use state::{AiSettingsPatch, AppAction, AppState, AppStore, VoiceSettingsPatch, reduce};
