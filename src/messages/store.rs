//! In-memory conversation and message store.

use std::sync::Arc;

use tracing::debug;

use crate::core::clock::Clock;
use crate::core::config::ConversationOrder;
use crate::core::ids::{ConversationId, MessageId, UserId};

use super::types::{Conversation, Message, Participant};

/// Single source of truth for the current user's conversations and messages.
///
/// Unknown conversation ids never fail: mutations report the no-op through
/// their return value. Per-conversation unread counts and the total are
/// recomputed from the message log after every mutation.
pub struct ConversationStore {
    current_user: UserId,
    order: ConversationOrder,
    clock: Arc<dyn Clock>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    total_unread: usize,
}

impl ConversationStore {
    /// Create an empty store for `current_user`.
    #[must_use]
    pub fn new(current_user: UserId, order: ConversationOrder, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(current_user, order, clock, Vec::new(), Vec::new())
    }

    /// Create a store from existing conversations and messages.
    ///
    /// Stored `unread_count` values are ignored and recomputed from `messages`.
    #[must_use]
    pub fn from_parts(
        current_user: UserId,
        order: ConversationOrder,
        clock: Arc<dyn Clock>,
        conversations: Vec<Conversation>,
        messages: Vec<Message>,
    ) -> Self {
        let mut store = Self {
            current_user,
            order,
            clock,
            conversations,
            messages,
            total_unread: 0,
        };
        store.refresh_unread_counts();
        store
    }

    /// The user this store belongs to.
    #[must_use]
    pub const fn current_user(&self) -> UserId {
        self.current_user
    }

    /// Number of conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// True if there are no conversations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// All conversations, most recent first unless configured for insertion order.
    #[must_use]
    pub fn list_conversations(&self) -> Vec<&Conversation> {
        let mut list: Vec<&Conversation> = self.conversations.iter().collect();
        if self.order == ConversationOrder::Recency {
            list.sort_by(|a, b| b.last_message_date.cmp(&a.last_message_date));
        }
        list
    }

    /// Look up a conversation by id.
    #[must_use]
    pub fn get_conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Look up the conversation held with `participant`.
    #[must_use]
    pub fn find_by_participant(&self, participant: UserId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.participant_id == participant)
    }

    /// Messages of a conversation, oldest first. Empty for unknown ids.
    ///
    /// Messages sharing a timestamp keep the order in which they were stored.
    #[must_use]
    pub fn get_messages_for_conversation(&self, id: ConversationId) -> Vec<&Message> {
        let Some(conversation) = self.get_conversation(id) else {
            return Vec::new();
        };

        let me = self.current_user;
        let participant = conversation.participant_id;
        let mut thread: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| m.is_between(me, participant))
            .collect();
        thread.sort_by_key(|m| m.created_at);
        thread
    }

    /// Number of messages in a conversation (0 for unknown ids).
    #[must_use]
    pub fn message_count(&self, id: ConversationId) -> usize {
        self.get_messages_for_conversation(id).len()
    }

    /// Sum of unread counts across all conversations.
    #[must_use]
    pub const fn total_unread_messages(&self) -> usize {
        self.total_unread
    }

    /// Return the conversation with `participant`, creating an empty one if needed.
    ///
    /// Returns `None` when `participant` is the current user.
    pub fn start_conversation(&mut self, participant: &Participant) -> Option<ConversationId> {
        if participant.id == self.current_user {
            return None;
        }

        if let Some(existing) = self.find_by_participant(participant.id) {
            return Some(existing.id);
        }

        let conversation = Conversation::with_participant(participant, self.clock.now());
        let id = conversation.id;
        self.conversations.push(conversation);
        self.refresh_unread_counts();
        debug!(conversation = %id, participant = %participant.id, "Started conversation");
        Some(id)
    }

    /// Send `content` from the current user to the conversation's participant.
    ///
    /// Returns the stored message, or `None` if the conversation is unknown.
    /// Content is stored as given.
    pub fn send_message(
        &mut self,
        conversation_id: ConversationId,
        content: impl Into<String>,
    ) -> Option<Message> {
        let message = self.append(conversation_id, content.into(), Direction::Outgoing)?;
        debug!(conversation = %conversation_id, message = %message.id, "Sent message");
        Some(message)
    }

    /// Record `content` sent by the conversation's participant to the current user.
    ///
    /// Returns the stored message, or `None` if the conversation is unknown.
    pub fn receive_message(
        &mut self,
        conversation_id: ConversationId,
        content: impl Into<String>,
    ) -> Option<Message> {
        let message = self.append(conversation_id, content.into(), Direction::Incoming)?;
        debug!(conversation = %conversation_id, message = %message.id, "Received message");
        Some(message)
    }

    /// Mark every incoming message of a conversation as read.
    ///
    /// Returns `false` if the conversation is unknown.
    pub fn mark_conversation_as_read(&mut self, conversation_id: ConversationId) -> bool {
        let Some(participant) = self
            .get_conversation(conversation_id)
            .map(|c| c.participant_id)
        else {
            return false;
        };

        let me = self.current_user;
        let mut flipped = 0_usize;
        for message in self
            .messages
            .iter_mut()
            .filter(|m| m.is_unread_from(participant, me))
        {
            message.read = true;
            flipped += 1;
        }

        self.refresh_unread_counts();
        debug!(conversation = %conversation_id, flipped, "Marked conversation as read");
        true
    }

    fn append(
        &mut self,
        conversation_id: ConversationId,
        content: String,
        direction: Direction,
    ) -> Option<Message> {
        let now = self.clock.now();
        let me = self.current_user;
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)?;

        let (sender_id, receiver_id) = match direction {
            Direction::Outgoing => (me, conversation.participant_id),
            Direction::Incoming => (conversation.participant_id, me),
        };
        let message = Message {
            id: MessageId::new(),
            sender_id,
            receiver_id,
            content,
            created_at: now,
            read: false,
        };

        conversation.last_message.clone_from(&message.content);
        conversation.last_message_date = now;
        self.messages.push(message.clone());
        self.refresh_unread_counts();
        Some(message)
    }

    fn refresh_unread_counts(&mut self) {
        let me = self.current_user;
        for conversation in &mut self.conversations {
            let participant = conversation.participant_id;
            conversation.unread_count = self
                .messages
                .iter()
                .filter(|m| m.is_unread_from(participant, me))
                .count();
        }
        self.total_unread = self.conversations.iter().map(|c| c.unread_count).sum();
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}
