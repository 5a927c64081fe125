pub mod config;

pub use config::{AssistantConfig, SynthesisConfig, VoiceConfig, FALLBACK_VOICE};
