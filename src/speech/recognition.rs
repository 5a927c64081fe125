//! Speech-to-text engine interface

use crate::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Microphone / recognition permission status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not decided yet; a request will prompt the user
    Prompt,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Options passed when starting recognition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// Platform voice code (e.g. "en-IN")
    pub language: String,
    /// Number of alternatives per result
    pub max_results: u32,
    /// Emit interim results while the user is speaking
    pub partial_results: bool,
}

impl RecognitionOptions {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            max_results: 1,
            partial_results: true,
        }
    }
}

/// Result notification from the recognition engine
///
/// Each variant carries the engine's candidate transcripts, best guess first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Partial(Vec<String>),
    Final(Vec<String>),
}

impl RecognitionEvent {
    /// Best-guess transcript, if the engine produced any
    pub fn best_match(&self) -> Option<&str> {
        let matches = match self {
            RecognitionEvent::Partial(m) | RecognitionEvent::Final(m) => m,
        };
        matches.first().map(String::as_str)
    }
}

/// Where a recognition engine delivers its results
///
/// Listeners are cheap to clone. A listener handed to an engine for one
/// listening attempt keeps delivering to that attempt only.
#[derive(Clone)]
pub struct RecognitionListener {
    sink: Arc<dyn Fn(RecognitionEvent) + Send + Sync>,
}

impl RecognitionListener {
    pub fn new(sink: impl Fn(RecognitionEvent) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn emit(&self, event: RecognitionEvent) {
        (self.sink)(event);
    }

    pub fn partial(&self, matches: Vec<String>) {
        self.emit(RecognitionEvent::Partial(matches));
    }

    pub fn final_result(&self, matches: Vec<String>) {
        self.emit(RecognitionEvent::Final(matches));
    }
}

impl fmt::Debug for RecognitionListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionListener").finish_non_exhaustive()
    }
}

/// A speech recognition engine
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn check_permissions(&self) -> Result<PermissionState>;

    async fn request_permissions(&self) -> Result<PermissionState>;

    /// Begin recognition; results flow to `listener` until `stop`
    async fn start(&self, options: RecognitionOptions, listener: RecognitionListener) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    async fn remove_all_listeners(&self) -> Result<()>;
}
