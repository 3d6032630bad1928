//! Change feed for observers of a session.
//!
//! Views subscribe instead of polling shared state: every state change made
//! through a `Session` is published here.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::core::config::MAX_EVENT_CAPACITY;
use crate::core::ids::{ConversationId, MessageId, NotificationId};

/// A state change made through a session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A conversation with a new participant was created.
    ConversationStarted {
        /// New conversation.
        conversation_id: ConversationId,
    },
    /// The current user sent a message.
    MessageSent {
        /// Target conversation.
        conversation_id: ConversationId,
        /// Stored message.
        message_id: MessageId,
    },
    /// A participant's message arrived.
    MessageReceived {
        /// Source conversation.
        conversation_id: ConversationId,
        /// Stored message.
        message_id: MessageId,
    },
    /// A conversation's incoming messages were acknowledged.
    ConversationRead {
        /// Acknowledged conversation.
        conversation_id: ConversationId,
    },
    /// A notification was added to the feed.
    NotificationAdded {
        /// New notification.
        notification_id: NotificationId,
    },
    /// A notification was acknowledged.
    NotificationRead {
        /// Acknowledged notification.
        notification_id: NotificationId,
    },
    /// The whole feed was acknowledged.
    NotificationsAllRead,
    /// A notification was removed.
    NotificationCleared {
        /// Removed notification.
        notification_id: NotificationId,
    },
    /// The whole feed was removed.
    NotificationsCleared,
}

/// Broadcast channel carrying [`StoreEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a bus whose subscribers buffer up to `capacity` events.
    ///
    /// `capacity` is clamped to `1..=MAX_EVENT_CAPACITY`, the range
    /// `PairupConfig::validate` accepts.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self { sender }
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish `event`. Dropped silently when nobody is subscribed.
    pub fn publish(&self, event: StoreEvent) {
        if self.sender.send(event).is_err() {
            trace!("No subscribers for store event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        bus.publish(StoreEvent::NotificationsAllRead);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_out_of_range_capacity_is_clamped() {
        for capacity in [0, usize::MAX] {
            let bus = EventBus::new(capacity);
            let mut rx = bus.subscribe();
            bus.publish(StoreEvent::NotificationsCleared);
            assert_eq!(rx.try_recv().ok(), Some(StoreEvent::NotificationsCleared));
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let id = ConversationId::new();

        bus.publish(StoreEvent::ConversationRead {
            conversation_id: id,
        });
        bus.publish(StoreEvent::NotificationsCleared);

        assert_eq!(
            rx.recv().await.ok(),
            Some(StoreEvent::ConversationRead {
                conversation_id: id
            })
        );
        assert_eq!(rx.recv().await.ok(), Some(StoreEvent::NotificationsCleared));
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(StoreEvent::NotificationsAllRead).unwrap_or_default();
        assert_eq!(json["type"], "notifications_all_read");
    }
}
