//! Configuration for the voice session
//!
//! All timing constants and voice settings used by the session controller are
//! supplied from here; none are hardcoded in the state machine.

use crate::{KiranaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Voice code used when the active language has no entry in `voices`
pub const FALLBACK_VOICE: &str = "en-IN";

/// Speech synthesis settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Speech rate (1.0 = natural)
    pub rate: f32,

    /// Voice pitch (1.0 = natural)
    pub pitch: f32,

    /// Output volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Remote assistant endpoint settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Base URL of the assistant service (the chat route is appended)
    pub base_url: String,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Configuration for a voice session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Quiet period after the last partial result before the transcript is processed
    pub silence_timeout_ms: u64,

    /// How long to wait for any speech before ending the session
    pub no_speech_timeout_ms: u64,

    /// Upper bound between the first meaningful partial result and processing
    pub force_process_ms: u64,

    /// Maximum time allowed in the speaking phase before forcing recovery
    pub watchdog_timeout_ms: u64,

    /// Delay before listening again after a failed assistant call
    pub retry_delay_ms: u64,

    /// Transcripts must be longer than this (trimmed) to be processed
    pub min_transcript_chars: usize,

    /// Maximum number of conversation turns sent as context
    pub history_limit: usize,

    /// Active language code (e.g. "en", "hi")
    pub language: String,

    /// Language code to platform voice code
    pub voices: BTreeMap<String, String>,

    /// Currency symbol used in the sales context block
    pub currency_symbol: String,

    /// Synthesis settings
    pub synthesis: SynthesisConfig,

    /// Assistant endpoint settings
    pub assistant: AssistantConfig,
}

fn default_voices() -> BTreeMap<String, String> {
    [
        ("en", "en-IN"),
        ("hi", "hi-IN"),
        ("bn", "bn-IN"),
        ("te", "te-IN"),
        ("mr", "mr-IN"),
        ("ta", "ta-IN"),
        ("gu", "gu-IN"),
        ("kn", "kn-IN"),
        ("ml", "ml-IN"),
        ("pa", "pa-IN"),
    ]
    .into_iter()
    .map(|(lang, voice)| (lang.to_string(), voice.to_string()))
    .collect()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            silence_timeout_ms: 1000,
            no_speech_timeout_ms: 20_000,
            force_process_ms: 3000,
            watchdog_timeout_ms: 10_000,
            retry_delay_ms: 1000,
            min_transcript_chars: 3,
            history_limit: 10,
            language: "en".to_string(),
            voices: default_voices(),
            currency_symbol: "₹".to_string(),
            synthesis: SynthesisConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl VoiceConfig {
    /// Parse a configuration from TOML text; missing fields take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            KiranaError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the active language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the assistant base URL
    pub fn with_assistant_url(mut self, base_url: impl Into<String>) -> Self {
        self.assistant.base_url = base_url.into();
        self
    }

    /// Set the silence timeout
    pub fn with_silence_timeout(mut self, timeout: Duration) -> Self {
        self.silence_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the no-speech timeout
    pub fn with_no_speech_timeout(mut self, timeout: Duration) -> Self {
        self.no_speech_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the force-process delay
    pub fn with_force_process_delay(mut self, delay: Duration) -> Self {
        self.force_process_ms = delay.as_millis() as u64;
        self
    }

    /// Set the speaking watchdog timeout
    pub fn with_watchdog_timeout(mut self, timeout: Duration) -> Self {
        self.watchdog_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the retry delay after assistant failures
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn no_speech_timeout(&self) -> Duration {
        Duration::from_millis(self.no_speech_timeout_ms)
    }

    pub fn force_process_delay(&self) -> Duration {
        Duration::from_millis(self.force_process_ms)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Platform voice code for a language, falling back to Indian English
    pub fn voice_for(&self, language: &str) -> &str {
        self.voices
            .get(language)
            .map(String::as_str)
            .unwrap_or(FALLBACK_VOICE)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(KiranaError::ConfigError(
                "history_limit must be at least 1".to_string(),
            ));
        }

        let timers = [
            ("silence_timeout_ms", self.silence_timeout_ms),
            ("no_speech_timeout_ms", self.no_speech_timeout_ms),
            ("force_process_ms", self.force_process_ms),
            ("watchdog_timeout_ms", self.watchdog_timeout_ms),
        ];
        for (name, value) in timers {
            if value == 0 {
                return Err(KiranaError::ConfigError(format!("{} must be non-zero", name)));
            }
        }

        if !(0.0..=1.0).contains(&self.synthesis.volume) {
            return Err(KiranaError::ConfigError(format!(
                "synthesis volume out of range: {}",
                self.synthesis.volume
            )));
        }

        if self.assistant.base_url.trim().is_empty() {
            return Err(KiranaError::ConfigError(
                "assistant base_url is required".to_string(),
            ));
        }

        Ok(())
    }
}
