//! Test helpers shared across Spark crates.

pub mod llm;
pub mod upstream;

pub use llm::{FailingChat, FixedChat, RecordingChat, ScriptedChat};
pub use upstream::{RecordedCall, StubUpstream};
