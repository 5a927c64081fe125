//! Conversation memory sent to the assistant as context
//!
//! Keeps only the most recent turns; older ones are dropped after every append.

use super::types::ChatRole;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One `{role, content}` entry as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: ChatRole,
    pub content: String,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Bounded conversation history
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<HistoryTurn>,
    limit: usize,
}

impl ConversationHistory {
    /// Create a history keeping at most `limit` turns
    pub fn new(limit: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(limit + 2),
            limit: limit.max(1),
        }
    }

    /// Append one completed exchange, user turn first
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push_back(HistoryTurn::user(user));
        self.turns.push_back(HistoryTurn::assistant(assistant));
        while self.turns.len() > self.limit {
            self.turns.pop_front();
        }
    }

    /// Snapshot of the retained turns, oldest first
    pub fn turns(&self) -> Vec<HistoryTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_order() {
        let mut history = ConversationHistory::new(10);
        history.push_exchange("how much rice", "Rice stock is 100.");

        let turns = history.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], HistoryTurn::user("how much rice"));
        assert_eq!(turns[1], HistoryTurn::assistant("Rice stock is 100."));
    }

    #[test]
    fn test_history_never_exceeds_limit() {
        let mut history = ConversationHistory::new(10);
        for i in 0..25 {
            history.push_exchange(format!("question {}", i), format!("answer {}", i));
            assert!(history.len() <= 10);
        }

        let turns = history.turns();
        assert_eq!(turns.len(), 10);
        assert_eq!(turns[0].content, "question 20");
        assert_eq!(turns[9].content, "answer 24");
    }

    #[test]
    fn test_clear() {
        let mut history = ConversationHistory::new(4);
        history.push_exchange("a", "b");
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&HistoryTurn::user("hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }
}
