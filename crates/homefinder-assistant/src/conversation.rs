use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only message log for one session. Ids keep increasing across
/// [`Conversation::clear`].
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> &ConversationTurn {
        let turn = ConversationTurn { id: self.next_id, role, text: text.into(), timestamp: Utc::now() };
        self.next_id += 1;
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ConversationTurn { self.push(Role::User, text) }

    pub fn push_bot(&mut self, text: impl Into<String>) -> &ConversationTurn { self.push(Role::Bot, text) }

    pub fn turns(&self) -> &[ConversationTurn] { &self.turns }

    pub fn last(&self) -> Option<&ConversationTurn> { self.turns.last() }

    pub fn len(&self) -> usize { self.turns.len() }

    pub fn is_empty(&self) -> bool { self.turns.is_empty() }

    pub fn clear(&mut self) { self.turns.clear(); }
}
