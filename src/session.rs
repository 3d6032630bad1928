//! Per-user session owning both stores.
//!
//! A `Session` is passed explicitly to whatever drives the UI; there is no
//! global state. It also carries the conventions that span both stores:
//! opening a conversation acknowledges the notifications linking to it, and
//! an incoming message raises a notification unless its conversation is open.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::core::clock::Clock;
use crate::core::config::PairupConfig;
use crate::core::errors::{PairupError, PairupResult};
use crate::core::ids::{ConversationId, NotificationId, UserId};
use crate::events::{EventBus, StoreEvent};
use crate::messages::{Conversation, ConversationStore, Message, Participant};
use crate::notifications::{
    NewNotification, NoopToastSink, Notification, NotificationKind, NotificationStore, ToastSink,
};
use crate::seed::SeedData;

/// Owned snapshot of a session, for rendering or serialization.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    /// Session owner.
    pub current_user: UserId,
    /// Conversation currently open, if any.
    pub active_conversation: Option<ConversationId>,
    /// Conversations in list order.
    pub conversations: Vec<Conversation>,
    /// Unread messages across all conversations.
    pub total_unread_messages: usize,
    /// Notification feed, newest first.
    pub notifications: Vec<Notification>,
    /// Unread notifications.
    pub unread_notifications: usize,
}

/// The state of one signed-in user.
pub struct Session {
    conversations: ConversationStore,
    notifications: NotificationStore,
    active_conversation: Option<ConversationId>,
    message_link_prefix: String,
    events: EventBus,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(
        current_user: UserId,
        config: &PairupConfig,
        clock: Arc<dyn Clock>,
        toasts: Arc<dyn ToastSink>,
    ) -> Self {
        let toasts = effective_toasts(config, toasts);
        Self {
            conversations: ConversationStore::new(
                current_user,
                config.conversations.order,
                Arc::clone(&clock),
            ),
            notifications: NotificationStore::new(clock, toasts),
            active_conversation: None,
            message_link_prefix: config.notifications.message_link_prefix.clone(),
            events: EventBus::new(config.events.channel_capacity),
        }
    }

    /// Create a session preloaded with `seed`.
    ///
    /// # Errors
    /// Returns `InvalidSeed` if the seed does not belong to `current_user`.
    pub fn with_seed(
        current_user: UserId,
        config: &PairupConfig,
        clock: Arc<dyn Clock>,
        toasts: Arc<dyn ToastSink>,
        seed: SeedData,
    ) -> PairupResult<Self> {
        seed.validate(current_user)?;
        let SeedData {
            conversations,
            messages,
            notifications,
        } = seed;

        let toasts = effective_toasts(config, toasts);
        let session = Self {
            conversations: ConversationStore::from_parts(
                current_user,
                config.conversations.order,
                Arc::clone(&clock),
                conversations,
                messages,
            ),
            notifications: NotificationStore::from_parts(clock, toasts, notifications),
            active_conversation: None,
            message_link_prefix: config.notifications.message_link_prefix.clone(),
            events: EventBus::new(config.events.channel_capacity),
        };
        info!(
            user = %current_user,
            conversations = session.conversations.len(),
            notifications = session.notifications.len(),
            "Seeded session"
        );
        Ok(session)
    }

    /// Session owner.
    #[must_use]
    pub const fn current_user(&self) -> UserId {
        self.conversations.current_user()
    }

    /// Read access to the conversation store.
    #[must_use]
    pub const fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Read access to the notification store.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Subscribe to state changes made from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Navigation target of a conversation.
    #[must_use]
    pub fn conversation_link(&self, id: ConversationId) -> String {
        format!("{}{id}", self.message_link_prefix)
    }

    /// The open conversation, if any.
    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation
            .and_then(|id| self.conversations.get_conversation(id))
    }

    /// Open a conversation: make it active, mark it read and acknowledge the
    /// notifications linking to it.
    ///
    /// Returns `false` if the conversation is unknown.
    pub fn open_conversation(&mut self, id: ConversationId) -> bool {
        if self.conversations.get_conversation(id).is_none() {
            return false;
        }
        self.active_conversation = Some(id);
        self.acknowledge_conversation(id);
        debug!(conversation = %id, "Opened conversation");
        true
    }

    /// Close the open conversation.
    pub const fn close_conversation(&mut self) {
        self.active_conversation = None;
    }

    /// Return the conversation with `participant`, creating it if needed.
    ///
    /// Returns `None` when `participant` is the current user.
    pub fn start_conversation(&mut self, participant: &Participant) -> Option<ConversationId> {
        let existing = self
            .conversations
            .find_by_participant(participant.id)
            .map(|c| c.id);
        let id = self.conversations.start_conversation(participant)?;
        if existing.is_none() {
            self.events.publish(StoreEvent::ConversationStarted {
                conversation_id: id,
            });
        }
        Some(id)
    }

    /// Send a message from the current user.
    ///
    /// Content is trimmed before it is stored. Returns `Ok(None)` if the
    /// conversation is unknown.
    ///
    /// # Errors
    /// Returns `EmptyMessage` if the content is blank.
    pub fn send_message(
        &mut self,
        conversation_id: ConversationId,
        content: &str,
    ) -> PairupResult<Option<Message>> {
        let content = content.trim();
        if content.is_empty() {
            return Err(PairupError::EmptyMessage);
        }

        let sent = self.conversations.send_message(conversation_id, content);
        if let Some(message) = &sent {
            self.events.publish(StoreEvent::MessageSent {
                conversation_id,
                message_id: message.id,
            });
        }
        Ok(sent)
    }

    /// Record a message from a conversation's participant.
    ///
    /// If the conversation is open the message is read immediately; otherwise
    /// a `message` notification pointing at the conversation is raised.
    /// Returns `None` if the conversation is unknown.
    pub fn receive_message(
        &mut self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Option<Message> {
        let message = self
            .conversations
            .receive_message(conversation_id, content)?;
        self.events.publish(StoreEvent::MessageReceived {
            conversation_id,
            message_id: message.id,
        });

        if self.active_conversation == Some(conversation_id) {
            self.acknowledge_conversation(conversation_id);
            return Some(message);
        }

        let sender = self
            .conversations
            .get_conversation(conversation_id)
            .map_or_else(String::new, |c| c.participant_name.clone());
        let link = self.conversation_link(conversation_id);
        self.notify(
            NewNotification::new(
                NotificationKind::Message,
                format!("New message from {sender}"),
                message.content.clone(),
            )
            .with_link(link),
        );
        Some(message)
    }

    /// Add a notification to the feed.
    pub fn notify(&mut self, new: NewNotification) -> NotificationId {
        let id = self.notifications.add_notification(new);
        self.events.publish(StoreEvent::NotificationAdded {
            notification_id: id,
        });
        id
    }

    /// Acknowledge one notification. Returns `false` if it is unknown.
    pub fn mark_notification_read(&mut self, id: NotificationId) -> bool {
        let changed = self.notifications.mark_as_read(id);
        if changed {
            self.events.publish(StoreEvent::NotificationRead {
                notification_id: id,
            });
        }
        changed
    }

    /// Acknowledge the whole feed. Returns how many notifications changed.
    pub fn mark_all_notifications_read(&mut self) -> usize {
        let flipped = self.notifications.mark_all_as_read();
        self.events.publish(StoreEvent::NotificationsAllRead);
        flipped
    }

    /// Remove one notification. Returns `false` if it is unknown.
    pub fn clear_notification(&mut self, id: NotificationId) -> bool {
        let removed = self.notifications.clear_notification(id);
        if removed {
            self.events.publish(StoreEvent::NotificationCleared {
                notification_id: id,
            });
        }
        removed
    }

    /// Remove the whole feed. Returns how many notifications were removed.
    pub fn clear_all_notifications(&mut self) -> usize {
        let removed = self.notifications.clear_all();
        self.events.publish(StoreEvent::NotificationsCleared);
        removed
    }

    /// Owned copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_user: self.current_user(),
            active_conversation: self.active_conversation,
            conversations: self
                .conversations
                .list_conversations()
                .into_iter()
                .cloned()
                .collect(),
            total_unread_messages: self.conversations.total_unread_messages(),
            notifications: self.notifications.list_notifications().to_vec(),
            unread_notifications: self.notifications.unread_count(),
        }
    }

    fn acknowledge_conversation(&mut self, id: ConversationId) {
        if self.conversations.mark_conversation_as_read(id) {
            self.events.publish(StoreEvent::ConversationRead {
                conversation_id: id,
            });
        }

        let link = self.conversation_link(id);
        for notification_id in self.notifications.mark_link_as_read(&link) {
            self.events.publish(StoreEvent::NotificationRead { notification_id });
        }
    }
}

fn effective_toasts(config: &PairupConfig, toasts: Arc<dyn ToastSink>) -> Arc<dyn ToastSink> {
    if config.notifications.toasts_enabled {
        toasts
    } else {
        Arc::new(NoopToastSink)
    }
}
