//! Text-to-speech engine interface

use crate::integration::SynthesisConfig;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Speaking rate used for playback estimates
const WORDS_PER_MINUTE: f64 = 150.0;

/// A single utterance to synthesize
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// Platform voice code (e.g. "en-IN")
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>, settings: &SynthesisConfig) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            rate: settings.rate,
            pitch: settings.pitch,
            volume: settings.volume,
        }
    }
}

/// A speech synthesis engine
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `request`, resolving once playback has finished
    async fn speak(&self, request: SpeechRequest) -> Result<()>;

    /// Stop any ongoing playback
    async fn stop(&self) -> Result<()>;
}

/// Rough playback time: ~150 words per minute plus half a second, at least one second
pub fn estimate_speech_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count() as f64;
    let millis = (words / WORDS_PER_MINUTE * 60_000.0 + 500.0).max(1000.0);
    Duration::from_millis(millis as u64)
}
