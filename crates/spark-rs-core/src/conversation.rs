//! Conversation turns: append, dispatch, annotate, append.

use crate::annotate::annotate;
use crate::error::SparkCoreError;
use crate::prompt::{PromptBuilder, PromptContext, mode_temperature};
use crate::state::{AppAction, AppStore};
use chrono::Utc;
use log::{info, warn};
use spark_rs_llm::{ChatClient, ChatRequest};
use spark_rs_protocol::{
    ConversationMode, ConversationSession, InterviewSettings, Message, MessageKind, SessionId,
};
use std::sync::Arc;

/// Drives practice, interview-chat and general conversations.
#[derive(Clone)]
pub struct ConversationService {
    store: AppStore,
    client: Arc<dyn ChatClient>,
    prompts: PromptBuilder,
    structured: bool,
}

impl ConversationService {
    pub fn new(store: AppStore, client: Arc<dyn ChatClient>) -> Self {
        Self {
            store,
            client,
            prompts: PromptBuilder::new(),
            structured: false,
        }
    }

    /// Ask practice replies for the JSON envelope instead of inline tags.
    pub fn with_structured_replies(mut self, structured: bool) -> Self {
        self.structured = structured;
        self
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Start a session and make it current.
    pub fn start(
        &self,
        mode: ConversationMode,
        interview_settings: Option<InterviewSettings>,
    ) -> SessionId {
        let mut session = ConversationSession::new(mode);
        session.interview_settings = interview_settings;
        let id = session.id;
        info!("started session (session_id={}, mode={})", id, mode);
        self.store.dispatch(AppAction::StartSession(session));
        id
    }

    pub fn end(&self, session_id: SessionId) {
        info!("ending session (session_id={})", session_id);
        self.store.dispatch(AppAction::EndSession {
            session_id,
            at: Utc::now(),
        });
    }

    /// Attach or clear document text used as extra prompt context.
    pub fn set_context(&self, context: Option<String>) {
        self.store.dispatch(AppAction::SetUploadedContext(context));
    }

    /// Attach or clear resume text for interview-style prompts.
    pub fn set_resume(&self, resume: Option<String>) {
        self.store.dispatch(AppAction::SetUploadedResume(resume));
    }

    /// Send one learner message and return the annotated reply.
    ///
    /// On failure the session keeps only the learner's message. A reply that
    /// arrives after the session ended is dropped.
    pub async fn send(
        &self,
        session_id: SessionId,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> Result<Message, SparkCoreError> {
        let session = self
            .store
            .session(session_id)
            .ok_or(SparkCoreError::UnknownSession(session_id))?;
        if !session.is_active {
            return Err(SparkCoreError::InactiveSession(session_id));
        }
        let (settings, uploaded_context, uploaded_resume) = self.store.read(|state| {
            (
                state.settings.ai.clone(),
                state.uploaded_context.clone(),
                state.uploaded_resume.clone(),
            )
        });
        if !settings.has_api_key() {
            return Err(SparkCoreError::MissingApiKey);
        }

        self.store.dispatch(AppAction::AddMessage {
            session_id,
            message: Message::user(content, kind),
        });
        let history = self
            .store
            .session(session_id)
            .map(|session| session.messages)
            .unwrap_or_default();

        let context = PromptContext {
            interview_settings: session.interview_settings.clone(),
            document: uploaded_context,
            resume: uploaded_resume,
            structured: self.structured && session.mode == ConversationMode::Practice,
        };
        let request = ChatRequest::new(
            settings
                .temperature
                .unwrap_or_else(|| mode_temperature(session.mode)),
            settings.max_tokens,
        )
        .with_system(self.prompts.build_system_prompt(session.mode, &context))
        .with_history(&history)
        .json_mode(context.structured);

        self.store.dispatch(AppAction::SetLoading(true));
        let outcome = self.client.complete(request).await;
        self.store.dispatch(AppAction::SetLoading(false));
        let raw = outcome.map_err(|err| {
            warn!("chat turn failed (session_id={}, err={})", session_id, err);
            SparkCoreError::Llm(err)
        })?;

        let reply = annotate(&raw).into_message();
        self.store.dispatch(AppAction::AddMessage {
            session_id,
            message: reply.clone(),
        });
        let applied = self.store.read(|state| {
            state
                .session(session_id)
                .is_some_and(|session| session.messages.iter().any(|m| m.id == reply.id))
        });
        if !applied {
            warn!("reply arrived after session ended (session_id={})", session_id);
            return Err(SparkCoreError::InactiveSession(session_id));
        }
        Ok(reply)
    }
}
