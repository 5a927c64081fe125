pub mod history;
pub mod types;

pub use history::{ConversationHistory, HistoryTurn};
pub use types::{ChatMessage, ChatRole};
