use crate::messages::HistoryTurn;
use crate::store::Product;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantRequest {
    /// Recognized text wrapped in the system-context block
    pub message: String,
    /// Most recent conversation turns, oldest first
    pub history: Vec<HistoryTurn>,
    /// Active language code
    pub language: String,
    /// Full inventory snapshot
    pub inventory: Vec<Product>,
}

/// Assistant answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Text to display
    pub response: String,
    /// Pre-rendered text for speech synthesis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    /// Structured action name (e.g. `RECORD_SALE`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Action parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl AssistantReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Default::default()
        }
    }

    pub fn with_speech(mut self, speech: impl Into<String>) -> Self {
        self.speech = Some(speech.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>, params: Value) -> Self {
        self.action = Some(action.into());
        self.params = Some(params);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_optional_fields() {
        let reply: AssistantReply = serde_json::from_str(r#"{"response":"Hello"}"#).unwrap();
        assert_eq!(reply, AssistantReply::text("Hello"));

        let reply: AssistantReply = serde_json::from_str(
            r#"{"response":"Done","speech":"Done.","action":"RECORD_SALE","params":{"product":"rice","quantity":5}}"#,
        )
        .unwrap();
        assert_eq!(reply.action.as_deref(), Some("RECORD_SALE"));
        assert_eq!(reply.params.unwrap()["quantity"], 5);
    }
}
