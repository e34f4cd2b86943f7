//! homefinder-assistant
//!
//! Conversation log and the session state behind the interactive assistant.

pub mod conversation;
pub mod session;

pub use conversation::{Conversation, ConversationTurn, Role};
pub use session::{run_turn, ConnectionState, PendingTurn, Session, SubmitError, TurnOutcome};
