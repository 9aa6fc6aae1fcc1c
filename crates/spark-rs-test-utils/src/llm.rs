use async_trait::async_trait;
use parking_lot::Mutex;
use spark_rs_llm::{ChatClient, ChatRequest, LlmError};
use std::collections::VecDeque;
use std::sync::Arc;

/// Always replies with the same text.
#[derive(Debug, Clone)]
pub struct FixedChat {
    response: String,
}

impl FixedChat {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ChatClient for FixedChat {
    async fn complete(&self, _request: ChatRequest) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

/// Replies with queued outcomes in order; an exhausted queue is a 500.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChat {
    script: Arc<Mutex<VecDeque<Result<String, u16>>>>,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(text.into()));
        self
    }

    /// Queue an HTTP failure with the given status.
    pub fn fail(self, status: u16) -> Self {
        self.script.lock().push_back(Err(status));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn complete(&self, _request: ChatRequest) -> Result<String, LlmError> {
        match self.script.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(status)) => Err(LlmError::RequestFailed {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(LlmError::RequestFailed {
                status: 500,
                body: "script exhausted".to_string(),
            }),
        }
    }
}

/// Records every request and replies with fixed text.
#[derive(Debug, Clone)]
pub struct RecordingChat {
    response: String,
    seen: Arc<Mutex<Vec<ChatRequest>>>,
}

impl RecordingChat {
    pub fn new(response: impl Into<String>) -> (Self, Arc<Mutex<Vec<ChatRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.into(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        self.seen.lock().push(request);
        Ok(self.response.clone())
    }
}

/// Fails every call with the given HTTP status.
#[derive(Debug, Clone, Copy)]
pub struct FailingChat {
    status: u16,
}

impl FailingChat {
    pub fn new(status: u16) -> Self {
        Self { status }
    }
}

#[async_trait]
impl ChatClient for FailingChat {
    async fn complete(&self, _request: ChatRequest) -> Result<String, LlmError> {
        Err(LlmError::RequestFailed {
            status: self.status,
            body: format!("{{\"error\":\"status {}\"}}", self.status),
        })
    }
}
