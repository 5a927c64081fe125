//! Speech engines used by the voice session
//!
//! This module provides:
//! - The speech recognition and synthesis interfaces the session drives
//! - Console engines (stdin as speech input, stdout as speech output)

pub mod console;
pub mod recognition;
pub mod synthesis;

// Re-export commonly used types
pub use console::{ConsoleRecognizer, ConsoleSynthesizer};
pub use recognition::{
    PermissionState, RecognitionEvent, RecognitionListener, RecognitionOptions, SpeechRecognizer,
};
pub use synthesis::{estimate_speech_duration, SpeechRequest, SpeechSynthesizer};
