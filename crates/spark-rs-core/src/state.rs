//! Application state and its reducer.
//!
//! `reduce` is a pure function from state and action to the next state.
//! `AppStore` shares one state behind a lock and persists settings changes.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use spark_rs_config::{AppSettings, SettingsStore};
use spark_rs_protocol::{ConversationSession, Message, SessionId};
use std::sync::Arc;

/// Everything the front-end needs to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub current_session: Option<SessionId>,
    /// All sessions in start order; ended sessions stay with `is_active = false`.
    pub sessions: Vec<ConversationSession>,
    pub settings: AppSettings,
    pub is_loading: bool,
    /// Document text the learner attached for discussion.
    pub uploaded_context: Option<String>,
    /// Extracted resume text, shared by every conversation mode.
    pub uploaded_resume: Option<String>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn session(&self, id: SessionId) -> Option<&ConversationSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn current(&self) -> Option<&ConversationSession> {
        self.current_session.and_then(|id| self.session(id))
    }
}

/// Partial update for AI settings; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiSettingsPatch {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Partial update for voice settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceSettingsPatch {
    pub auto_activation: Option<bool>,
    pub auto_activation_delay: Option<u32>,
    pub silence_timeout: Option<u32>,
    pub language: Option<String>,
    pub accent: Option<String>,
    pub voice: Option<String>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    StartSession(ConversationSession),
    EndSession { session_id: SessionId, at: DateTime<Utc> },
    AddMessage { session_id: SessionId, message: Message },
    UpdateAiSettings(AiSettingsPatch),
    UpdateVoiceSettings(VoiceSettingsPatch),
    SetLoading(bool),
    SetUploadedContext(Option<String>),
    SetUploadedResume(Option<String>),
}

impl AppAction {
    fn touches_settings(&self) -> bool {
        matches!(
            self,
            AppAction::UpdateAiSettings(_) | AppAction::UpdateVoiceSettings(_)
        )
    }
}

/// Apply one action.
pub fn reduce(mut state: AppState, action: AppAction) -> AppState {
    match action {
        AppAction::StartSession(session) => {
            state.current_session = Some(session.id);
            state.sessions.push(session);
        }
        AppAction::EndSession { session_id, at } => {
            if let Some(session) = state
                .sessions
                .iter_mut()
                .find(|session| session.id == session_id)
            {
                session.is_active = false;
                session.end_time = Some(at);
                session.stats.duration_minutes = (at - session.start_time).num_minutes().max(0);
            }
            if state.current_session == Some(session_id) {
                state.current_session = None;
            }
        }
        AppAction::AddMessage {
            session_id,
            message,
        } => match state
            .sessions
            .iter_mut()
            .find(|session| session.id == session_id)
        {
            Some(session) if session.is_active => append_message(session, message),
            Some(_) => debug!("dropping message for ended session (session_id={})", session_id),
            None => debug!("dropping message for unknown session (session_id={})", session_id),
        },
        AppAction::UpdateAiSettings(patch) => {
            let ai = &mut state.settings.ai;
            if let Some(provider) = patch.provider {
                ai.provider = provider;
            }
            if let Some(model) = patch.model {
                ai.model = model;
            }
            if let Some(api_key) = patch.api_key {
                ai.api_key = api_key;
            }
            if let Some(temperature) = patch.temperature {
                ai.temperature = Some(temperature);
            }
            if let Some(max_tokens) = patch.max_tokens {
                ai.max_tokens = max_tokens;
            }
        }
        AppAction::UpdateVoiceSettings(patch) => {
            let voice = &mut state.settings.voice;
            if let Some(value) = patch.auto_activation {
                voice.auto_activation = value;
            }
            if let Some(value) = patch.auto_activation_delay {
                voice.auto_activation_delay = value;
            }
            if let Some(value) = patch.silence_timeout {
                voice.silence_timeout = value;
            }
            if let Some(value) = patch.language {
                voice.language = value;
            }
            if let Some(value) = patch.accent {
                voice.accent = value;
            }
            if let Some(value) = patch.voice {
                voice.voice = value;
            }
            if let Some(value) = patch.rate {
                voice.rate = value;
            }
            if let Some(value) = patch.pitch {
                voice.pitch = value;
            }
            if let Some(value) = patch.volume {
                voice.volume = value;
            }
        }
        AppAction::SetLoading(loading) => state.is_loading = loading,
        AppAction::SetUploadedContext(context) => state.uploaded_context = context,
        AppAction::SetUploadedResume(resume) => state.uploaded_resume = resume,
    }
    state
}

fn append_message(session: &mut ConversationSession, message: Message) {
    session.stats.corrections += message.correction_count();
    session.messages.push(message);
    session.stats.total_messages = session.messages.len();
    let scores: Vec<f64> = session
        .messages
        .iter()
        .filter_map(Message::score)
        .map(f64::from)
        .collect();
    session.stats.average_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
}

/// Shared handle over `AppState`.
#[derive(Clone)]
pub struct AppStore {
    state: Arc<RwLock<AppState>>,
    settings_store: Option<SettingsStore>,
}

impl AppStore {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            state: Arc::new(RwLock::new(AppState::new(settings))),
            settings_store: None,
        }
    }

    /// Persist settings to `store` after every settings action.
    pub fn with_settings_store(mut self, store: SettingsStore) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Apply an action through the reducer.
    pub fn dispatch(&self, action: AppAction) {
        let persist = action.touches_settings();
        let settings = {
            let mut guard = self.state.write();
            let current = std::mem::take(&mut *guard);
            *guard = reduce(current, action);
            persist.then(|| guard.settings.clone())
        };
        if let (Some(settings), Some(store)) = (settings, self.settings_store.as_ref()) {
            match store.save(&settings) {
                Ok(()) => info!("settings saved (path={})", store.path().display()),
                Err(err) => warn!("failed to persist settings: {}", err),
            }
        }
    }

    /// Read from the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    pub fn session(&self, id: SessionId) -> Option<ConversationSession> {
        self.read(|state| state.session(id).cloned())
    }

    pub fn settings(&self) -> AppSettings {
        self.read(|state| state.settings.clone())
    }
}
