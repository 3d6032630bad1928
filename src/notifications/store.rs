//! In-memory notification feed.

use std::sync::Arc;

use tracing::debug;

use crate::core::clock::Clock;
use crate::core::ids::NotificationId;

use super::toast::{Toast, ToastSink};
use super::types::{NewNotification, Notification};

/// Single source of truth for the current user's notification feed.
///
/// The feed is kept newest first: additions are prepended, so callers never
/// sort. Unknown ids degrade to a reported no-op.
pub struct NotificationStore {
    clock: Arc<dyn Clock>,
    toasts: Arc<dyn ToastSink>,
    notifications: Vec<Notification>,
    unread_count: usize,
}

impl NotificationStore {
    /// Create an empty feed.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, toasts: Arc<dyn ToastSink>) -> Self {
        Self::from_parts(clock, toasts, Vec::new())
    }

    /// Create a feed from existing notifications, reordered newest first.
    #[must_use]
    pub fn from_parts(
        clock: Arc<dyn Clock>,
        toasts: Arc<dyn ToastSink>,
        mut notifications: Vec<Notification>,
    ) -> Self {
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut store = Self {
            clock,
            toasts,
            notifications,
            unread_count: 0,
        };
        store.refresh_unread_count();
        store
    }

    /// All notifications, newest first.
    #[must_use]
    pub fn list_notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Look up a notification by id.
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Number of unread notifications.
    #[must_use]
    pub const fn unread_count(&self) -> usize {
        self.unread_count
    }

    /// Number of notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// True if the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Add an unread notification at the top of the feed and raise a toast.
    pub fn add_notification(&mut self, new: NewNotification) -> NotificationId {
        let NewNotification {
            kind,
            title,
            description,
            link,
        } = new;
        let toast = Toast {
            title: title.clone(),
            description: description.clone(),
        };

        let notification = Notification {
            id: NotificationId::new(),
            kind,
            title,
            description,
            created_at: self.clock.now(),
            read: false,
            link,
        };
        let id = notification.id;
        self.notifications.insert(0, notification);
        self.refresh_unread_count();
        debug!(notification = %id, %kind, "Added notification");

        self.toasts.show(&toast);
        id
    }

    /// Mark one notification as read.
    ///
    /// Returns `false` if `id` is unknown.
    pub fn mark_as_read(&mut self, id: NotificationId) -> bool {
        let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        notification.read = true;
        self.refresh_unread_count();
        debug!(notification = %id, "Marked notification as read");
        true
    }

    /// Mark every unread notification pointing at `link` as read.
    ///
    /// Returns the ids that changed.
    pub fn mark_link_as_read(&mut self, link: &str) -> Vec<NotificationId> {
        let mut flipped = Vec::new();
        for notification in self
            .notifications
            .iter_mut()
            .filter(|n| !n.read && n.link.as_deref() == Some(link))
        {
            notification.read = true;
            flipped.push(notification.id);
        }
        if !flipped.is_empty() {
            self.refresh_unread_count();
            debug!(link, count = flipped.len(), "Marked linked notifications as read");
        }
        flipped
    }

    /// Mark the whole feed as read.
    ///
    /// Returns how many notifications changed.
    pub fn mark_all_as_read(&mut self) -> usize {
        let flipped = self.unread_count;
        for notification in &mut self.notifications {
            notification.read = true;
        }
        self.unread_count = 0;
        debug!(flipped, "Marked all notifications as read");
        flipped
    }

    /// Remove one notification.
    ///
    /// Returns `false` if `id` is unknown, so repeated calls are harmless.
    pub fn clear_notification(&mut self, id: NotificationId) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() == before {
            return false;
        }
        self.refresh_unread_count();
        debug!(notification = %id, "Cleared notification");
        true
    }

    /// Remove every notification.
    ///
    /// Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.notifications.len();
        self.notifications.clear();
        self.refresh_unread_count();
        debug!(removed, "Cleared all notifications");
        removed
    }

    fn refresh_unread_count(&mut self) {
        self.unread_count = self.notifications.iter().filter(|n| !n.read).count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::notifications::toast::NoopToastSink;
    use crate::notifications::types::NotificationKind;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        shown: Mutex<Vec<Toast>>,
    }

    impl RecordingSink {
        fn shown(&self) -> Vec<Toast> {
            self.shown.lock().map(|g| g.clone()).unwrap_or_default()
        }
    }

    impl ToastSink for RecordingSink {
        fn show(&self, toast: &Toast) {
            if let Ok(mut guard) = self.shown.lock() {
                guard.push(toast.clone());
            }
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn seeded(kind: NotificationKind, when: DateTime<Utc>, read: bool) -> Notification {
        Notification {
            id: NotificationId::new(),
            kind,
            title: format!("{kind} at {when}"),
            description: String::new(),
            created_at: when,
            read,
            link: None,
        }
    }

    fn store_with(sink: Arc<dyn ToastSink>) -> NotificationStore {
        let seed = vec![
            seeded(NotificationKind::System, at(12, 9), true),
            seeded(NotificationKind::Message, at(15, 14), false),
            seeded(NotificationKind::Flatmate, at(13, 15), true),
            seeded(NotificationKind::Event, at(14, 10), false),
        ];
        NotificationStore::from_parts(Arc::new(ManualClock::new(at(16, 8))), sink, seed)
    }

    fn store() -> NotificationStore {
        store_with(Arc::new(NoopToastSink))
    }

    #[test]
    fn test_seed_is_newest_first() {
        let store = store();
        let kinds: Vec<NotificationKind> = store
            .list_notifications()
            .iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::Message,
                NotificationKind::Event,
                NotificationKind::Flatmate,
                NotificationKind::System,
            ]
        );
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn test_add_notification_prepends_and_toasts() {
        let sink = Arc::new(RecordingSink::default());
        let mut store = store_with(sink.clone());
        let before = store.unread_count();

        let id = store.add_notification(
            NewNotification::new(NotificationKind::Event, "Mixer", "Friday 7pm").with_link("/events"),
        );

        let first = store.list_notifications().first();
        assert_eq!(first.map(|n| n.id), Some(id));
        assert_eq!(first.map(|n| n.read), Some(false));
        assert_eq!(first.map(|n| n.created_at), Some(at(16, 8)));
        assert_eq!(first.and_then(|n| n.link.as_deref()), Some("/events"));
        assert_eq!(store.unread_count(), before + 1);
        assert_eq!(
            sink.shown(),
            vec![Toast {
                title: "Mixer".to_string(),
                description: "Friday 7pm".to_string(),
            }]
        );
    }

    #[test]
    fn test_mark_as_read() {
        let mut store = store();
        let unread = store
            .list_notifications()
            .iter()
            .find(|n| !n.read)
            .map(|n| n.id)
            .unwrap_or_default();

        assert!(store.mark_as_read(unread));
        assert_eq!(store.unread_count(), 1);
        assert_eq!(store.get(unread).map(|n| n.read), Some(true));

        assert!(!store.mark_as_read(NotificationId::new()));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_mark_all_as_read() {
        let mut store = store();
        assert_eq!(store.mark_all_as_read(), 2);
        assert!(store.list_notifications().iter().all(|n| n.read));
        assert_eq!(store.unread_count(), 0);
        assert_eq!(store.mark_all_as_read(), 0);
    }

    #[test]
    fn test_clear_notification_is_idempotent() {
        let mut store = store();
        let target = store.list_notifications()[1].id;

        assert!(store.clear_notification(target));
        assert_eq!(store.len(), 3);
        assert!(store.get(target).is_none());
        assert_eq!(store.unread_count(), 1);

        let snapshot = store.list_notifications().to_vec();
        assert!(!store.clear_notification(target));
        assert_eq!(store.list_notifications(), snapshot.as_slice());
    }

    #[test]
    fn test_mark_link_as_read() {
        let mut store = store();
        store.add_notification(
            NewNotification::new(NotificationKind::Message, "a", "").with_link("/messages/x"),
        );
        store.add_notification(
            NewNotification::new(NotificationKind::Message, "b", "").with_link("/messages/x"),
        );
        store.add_notification(
            NewNotification::new(NotificationKind::Message, "c", "").with_link("/messages/y"),
        );
        assert_eq!(store.unread_count(), 5);

        assert_eq!(store.mark_link_as_read("/messages/x").len(), 2);
        assert_eq!(store.unread_count(), 3);
        assert!(store.mark_link_as_read("/messages/x").is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut store = store();
        assert_eq!(store.clear_all(), 4);
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
    }
}
