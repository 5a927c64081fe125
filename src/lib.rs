pub mod actions;
pub mod assistant;
pub mod integration;
pub mod messages;
pub mod session;
pub mod speech;
pub mod store;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum KiranaError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Speech recognition error: {0}")]
    RecognitionError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Assistant error: {0}")]
    AssistantError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for KiranaError {
    fn from(e: std::io::Error) -> Self {
        KiranaError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for KiranaError {
    fn from(e: serde_json::Error) -> Self {
        KiranaError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for KiranaError {
    fn from(e: toml::de::Error) -> Self {
        KiranaError::ConfigError(e.to_string())
    }
}

impl From<reqwest::Error> for KiranaError {
    fn from(e: reqwest::Error) -> Self {
        KiranaError::AssistantError(e.to_string())
    }
}

impl KiranaError {
    /// Check if this error is recoverable
    ///
    /// Non-recoverable errors end the voice session and need an explicit restart.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Microphone access needs user intervention
            KiranaError::PermissionDenied(_) => false,
            // Engine unavailable or failed to start
            KiranaError::RecognitionError(_) => false,
            // These are typically transient errors
            KiranaError::SynthesisError(_) => true,
            KiranaError::AssistantError(_) => true,
            KiranaError::StoreError(_) => true,
            KiranaError::ProductNotFound(_) => true,
            KiranaError::IOError(_) => false,
            KiranaError::SerializationError(_) => false,
            KiranaError::ConfigError(_) => false,
            KiranaError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            KiranaError::PermissionDenied(_) => {
                "Microphone permission denied. Please allow microphone access.".to_string()
            }
            KiranaError::RecognitionError(_) => {
                "Speech recognition is not available. Please try again.".to_string()
            }
            KiranaError::SynthesisError(_) => {
                "Could not play the spoken response.".to_string()
            }
            KiranaError::AssistantError(_) => {
                "Could not reach the assistant. Trying again.".to_string()
            }
            KiranaError::StoreError(_) => "Error updating data.".to_string(),
            KiranaError::ProductNotFound(_) => "Product not found.".to_string(),
            KiranaError::IOError(_) => "File system error occurred.".to_string(),
            KiranaError::SerializationError(_) => "Stored data could not be read.".to_string(),
            KiranaError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            KiranaError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, KiranaError>;
