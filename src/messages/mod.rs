//! Direct messaging between the current user and other platform members.
//!
//! This module provides the conversation store and its record types.

pub mod store;
pub mod types;

pub use store::ConversationStore;
pub use types::{Conversation, Message, Participant};
