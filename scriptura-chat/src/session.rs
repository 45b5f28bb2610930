//! In-memory conversation state.
//!
//! The session is append-only while the chat runs and cleared wholesale by
//! `/clear`. The answer pipeline receives only the latest question; the
//! turn list exists for display and bookkeeping, not for model memory.

/// One conversation turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    /// User input turn role.
    pub const USER: &'static str = "user";
    /// Assistant response turn role.
    pub const ASSISTANT: &'static str = "assistant";

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Self::USER.to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Self::ASSISTANT.to_string(),
            content: content.into(),
        }
    }
}

/// Ordered, append-only turn list for the running session.
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }
}
