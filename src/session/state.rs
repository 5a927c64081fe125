//! Observable state of the voice session
//!
//! The controller is the only writer. UI code and tests read through
//! `SharedSessionState` or take a `SessionSnapshot`.

use parking_lot::RwLock;
use std::sync::Arc;

/// Phase of the listen → think → speak loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoicePhase {
    /// Not listening; either inactive or between retries
    #[default]
    Idle,
    /// Recognition running, collecting an utterance
    Listening,
    /// Waiting for the assistant
    Thinking,
    /// Playing the spoken reply
    Speaking,
}

impl VoicePhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, VoicePhase::Idle)
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, VoicePhase::Listening)
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, VoicePhase::Thinking)
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self, VoicePhase::Speaking)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoicePhase::Idle => "idle",
            VoicePhase::Listening => "listening",
            VoicePhase::Thinking => "thinking",
            VoicePhase::Speaking => "speaking",
        }
    }
}

impl std::fmt::Display for VoicePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: VoicePhase,
    /// Whether the loop keeps going after each turn
    pub active: bool,
    /// Latest recognized text
    pub transcript: String,
    /// Last assistant reply shown to the user
    pub response: String,
    /// Last user-visible error
    pub error: Option<String>,
    /// Set while a captured utterance is being answered
    pub processing: bool,
    /// Number of conversation turns kept as context
    pub history_len: usize,
    /// Active language code
    pub language: String,
}

impl SessionState {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }
}

/// Immutable copy of the session state
pub type SessionSnapshot = SessionState;

/// Thread-safe shared session state
#[derive(Clone, Default)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::new(language))),
        }
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    /// Get a snapshot of current state (no lock held after return)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().clone()
    }

    pub fn phase(&self) -> VoicePhase {
        self.inner.read().phase
    }

    pub fn is_active(&self) -> bool {
        self.inner.read().active
    }

    pub fn is_processing(&self) -> bool {
        self.inner.read().processing
    }

    pub fn transcript(&self) -> String {
        self.inner.read().transcript.clone()
    }

    pub fn response(&self) -> String {
        self.inner.read().response.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }

    pub fn history_len(&self) -> usize {
        self.inner.read().history_len
    }
}
