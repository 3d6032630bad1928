//! Types for direct messaging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ids::{ConversationId, MessageId, UserId};

/// A single direct message between the current user and one participant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Recipient of the message.
    pub receiver_id: UserId,
    /// Text body.
    pub content: String,
    /// Send time.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has seen it.
    pub read: bool,
}

impl Message {
    /// True if this message was exchanged between `a` and `b`, in either direction.
    #[must_use]
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// True if `participant` sent this to `me` and it has not been read.
    #[must_use]
    pub fn is_unread_from(&self, participant: UserId, me: UserId) -> bool {
        !self.read && self.sender_id == participant && self.receiver_id == me
    }
}

/// Counterpart identity used to open a conversation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// User id of the counterpart.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar image URL.
    pub avatar: String,
}

impl Participant {
    /// Create a participant.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// A thread between the current user and one participant, as shown in the
/// conversation list.
///
/// Participant fields are a display cache and the summary fields mirror the
/// latest message; both are maintained by the store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier.
    pub id: ConversationId,
    /// Counterpart user id.
    pub participant_id: UserId,
    /// Counterpart display name.
    pub participant_name: String,
    /// Counterpart avatar URL.
    pub participant_avatar: String,
    /// Body of the most recent message.
    pub last_message: String,
    /// Time of the most recent message.
    pub last_message_date: DateTime<Utc>,
    /// Unread messages from the participant to the current user.
    #[serde(default)]
    pub unread_count: usize,
}

impl Conversation {
    /// Create an empty conversation with `participant`.
    #[must_use]
    pub fn with_participant(participant: &Participant, now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::new(),
            participant_id: participant.id,
            participant_name: participant.name.clone(),
            participant_avatar: participant.avatar.clone(),
            last_message: String::new(),
            last_message_date: now,
            unread_count: 0,
        }
    }

    /// Counterpart identity of this conversation.
    #[must_use]
    pub fn participant(&self) -> Participant {
        Participant::new(
            self.participant_id,
            self.participant_name.clone(),
            self.participant_avatar.clone(),
        )
    }
}
