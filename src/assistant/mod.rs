//! Remote assistant backend
//!
//! The assistant receives the recognized text wrapped in a context block, the
//! recent conversation, the active language and the full inventory, and answers
//! with natural-language text plus an optional structured action.

pub mod client;
pub mod context;
pub mod types;

pub use client::{AssistantApi, HttpAssistant};
pub use context::build_context_message;
pub use types::{AssistantReply, AssistantRequest};
