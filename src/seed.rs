//! Startup data for a session: the built-in demo set and JSON seed files.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::errors::{PairupError, PairupResult};
use crate::core::ids::{ConversationId, MessageId, NotificationId, UserId};
use crate::messages::{Conversation, Message};
use crate::notifications::{Notification, NotificationKind};

/// Records loaded into both stores when a session starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    /// Conversations; `unread_count` is recomputed on load.
    pub conversations: Vec<Conversation>,
    /// Messages across all conversations.
    pub messages: Vec<Message>,
    /// Notification feed, any order.
    pub notifications: Vec<Notification>,
}

impl SeedData {
    /// Load a seed from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> PairupResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check that the records can be owned by `current_user`'s stores.
    ///
    /// # Errors
    /// Returns `InvalidSeed` on duplicate record ids or participants,
    /// conversations with the current user, and messages that do not belong
    /// to exactly one seeded conversation.
    pub fn validate(&self, current_user: UserId) -> PairupResult<()> {
        let mut ids = HashSet::new();
        let mut participants = HashSet::new();
        for conversation in &self.conversations {
            if !ids.insert(conversation.id) {
                return Err(invalid(format!(
                    "duplicate conversation {}",
                    conversation.id
                )));
            }
            if conversation.participant_id == current_user {
                return Err(invalid(format!(
                    "conversation {} is with the current user",
                    conversation.id
                )));
            }
            if !participants.insert(conversation.participant_id) {
                return Err(invalid(format!(
                    "participant {} has more than one conversation",
                    conversation.participant_id
                )));
            }
        }

        let mut message_ids = HashSet::new();
        for message in &self.messages {
            if !message_ids.insert(message.id) {
                return Err(invalid(format!("duplicate message {}", message.id)));
            }
            let counterpart = if message.sender_id == current_user {
                message.receiver_id
            } else if message.receiver_id == current_user {
                message.sender_id
            } else {
                return Err(invalid(format!(
                    "message {} does not involve the current user",
                    message.id
                )));
            };
            if !participants.contains(&counterpart) {
                return Err(invalid(format!(
                    "message {} has no conversation with {counterpart}",
                    message.id
                )));
            }
        }

        let mut notification_ids = HashSet::new();
        for notification in &self.notifications {
            if !notification_ids.insert(notification.id) {
                return Err(invalid(format!(
                    "duplicate notification {}",
                    notification.id
                )));
            }
        }

        Ok(())
    }

    /// Demo data: three conversations, twelve messages and one notification
    /// of each kind.
    ///
    /// Conversation unread counts come out as `[2, 0, 3]`. The message
    /// notification links to the first conversation through `message_link_prefix`.
    #[must_use]
    pub fn demo(current_user: UserId, message_link_prefix: &str) -> Self {
        let me = current_user;
        let emma = UserId::new();
        let michael = UserId::new();
        let sarah = UserId::new();

        let conversations = vec![
            demo_conversation(
                emma,
                "Emma Wilson",
                "https://images.unsplash.com/photo-1494790108377-be9c29b29330?q=80&w=800&auto=format&fit=crop",
                "Hey, I'm interested in the flat you posted about. Is it still available?",
                may(15, 14, 30),
            ),
            demo_conversation(
                michael,
                "Michael Chen",
                "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=800&auto=format&fit=crop",
                "Thanks for RSVP'ing to my event! Looking forward to seeing you there.",
                may(14, 9, 15),
            ),
            demo_conversation(
                sarah,
                "Sarah Johnson",
                "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?q=80&w=800&auto=format&fit=crop",
                "I think we'd be great flatmates! When can we meet to discuss?",
                may(13, 18, 45),
            ),
        ];
        let emma_link = conversations
            .first()
            .map(|c| format!("{message_link_prefix}{}", c.id));

        let messages = vec![
            demo_message(
                emma,
                me,
                "Hi there! I saw your profile and I think we might be compatible as flatmates.",
                may(15, 14, 20),
                true,
            ),
            demo_message(
                me,
                emma,
                "Hello Emma! Thanks for reaching out. I'm definitely looking for a flatmate. What area are you interested in?",
                may(15, 14, 25),
                true,
            ),
            demo_message(
                emma,
                me,
                "I'm looking in East London, preferably near the tube. What's your budget range?",
                may(15, 14, 28),
                false,
            ),
            demo_message(
                emma,
                me,
                "Hey, I'm interested in the flat you posted about. Is it still available?",
                may(15, 14, 30),
                false,
            ),
            demo_message(
                michael,
                me,
                "Hi! I'm hosting a flatmate mixer event next week. Would you like to come?",
                may(14, 9, 10),
                true,
            ),
            demo_message(
                me,
                michael,
                "That sounds great! I'd love to attend.",
                may(14, 9, 12),
                true,
            ),
            demo_message(
                michael,
                me,
                "Thanks for RSVP'ing to my event! Looking forward to seeing you there.",
                may(14, 9, 15),
                true,
            ),
            demo_message(
                sarah,
                me,
                "Hello! I noticed we have a lot of similar interests. Are you still looking for a flatmate?",
                may(13, 18, 30),
                true,
            ),
            demo_message(
                me,
                sarah,
                "Hi Sarah! Yes, I am. I like your profile too. What area are you looking in?",
                may(13, 18, 35),
                true,
            ),
            demo_message(
                sarah,
                me,
                "I'm flexible, but ideally somewhere in North London. I work remotely so good internet is a must!",
                may(13, 18, 40),
                false,
            ),
            demo_message(
                sarah,
                me,
                "I have a few places in mind we could look at.",
                may(13, 18, 42),
                false,
            ),
            demo_message(
                sarah,
                me,
                "I think we'd be great flatmates! When can we meet to discuss?",
                may(13, 18, 45),
                false,
            ),
        ];

        let notifications = vec![
            demo_notification(
                NotificationKind::Message,
                "New message from Emma Wilson",
                "Hey, I'm interested in the flat you posted about...",
                may(15, 14, 30),
                false,
                emma_link,
            ),
            demo_notification(
                NotificationKind::Event,
                "Upcoming event: Flatmate Mixer & Games Night",
                "Reminder: This event is happening tomorrow at 7:00 PM.",
                may(14, 10, 0),
                false,
                Some("/events".to_string()),
            ),
            demo_notification(
                NotificationKind::Flatmate,
                "New flatmate match!",
                "Sarah Johnson might be a good match for you based on your preferences.",
                may(13, 15, 45),
                true,
                Some("/flatmates".to_string()),
            ),
            demo_notification(
                NotificationKind::System,
                "Profile incomplete",
                "Complete your profile to get better flatmate matches.",
                may(12, 9, 30),
                true,
                Some("/profile".to_string()),
            ),
        ];

        Self {
            conversations,
            messages,
            notifications,
        }
    }
}

fn invalid(reason: String) -> PairupError {
    warn!("Rejected seed data: {reason}");
    PairupError::InvalidSeed(reason)
}

fn may(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn demo_conversation(
    participant_id: UserId,
    name: &str,
    avatar: &str,
    last_message: &str,
    last_message_date: DateTime<Utc>,
) -> Conversation {
    Conversation {
        id: ConversationId::new(),
        participant_id,
        participant_name: name.to_string(),
        participant_avatar: avatar.to_string(),
        last_message: last_message.to_string(),
        last_message_date,
        unread_count: 0,
    }
}

fn demo_message(
    sender_id: UserId,
    receiver_id: UserId,
    content: &str,
    created_at: DateTime<Utc>,
    read: bool,
) -> Message {
    Message {
        id: MessageId::new(),
        sender_id,
        receiver_id,
        content: content.to_string(),
        created_at,
        read,
    }
}

fn demo_notification(
    kind: NotificationKind,
    title: &str,
    description: &str,
    created_at: DateTime<Utc>,
    read: bool,
    link: Option<String>,
) -> Notification {
    Notification {
        id: NotificationId::new(),
        kind,
        title: title.to_string(),
        description: description.to_string(),
        created_at,
        read,
        link,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_valid() {
        let me = UserId::new();
        let seed = SeedData::demo(me, "/messages/");
        assert!(seed.validate(me).is_ok());
        assert_eq!(seed.conversations.len(), 3);
        assert_eq!(seed.messages.len(), 12);
        assert_eq!(seed.notifications.len(), 4);
    }

    #[test]
    fn test_demo_message_notification_links_first_conversation() {
        let seed = SeedData::demo(UserId::new(), "/messages/");
        let expected = seed
            .conversations
            .first()
            .map(|c| format!("/messages/{}", c.id));
        let message_link = seed
            .notifications
            .iter()
            .find(|n| n.kind == NotificationKind::Message)
            .and_then(|n| n.link.clone());
        assert_eq!(message_link, expected);
    }

    #[test]
    fn test_demo_for_other_user_is_rejected() {
        let seed = SeedData::demo(UserId::new(), "/messages/");
        assert!(matches!(
            seed.validate(UserId::new()),
            Err(PairupError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_duplicate_participant_is_rejected() {
        let me = UserId::new();
        let mut seed = SeedData::demo(me, "/messages/");
        let mut twin = seed.conversations[0].clone();
        twin.id = ConversationId::new();
        seed.conversations.push(twin);
        assert!(seed.validate(me).is_err());
    }

    #[test]
    fn test_duplicate_notification_id_is_rejected() {
        let me = UserId::new();
        let mut seed = SeedData::demo(me, "/messages/");
        let mut twin = seed.notifications[0].clone();
        twin.title = "Another title".to_string();
        seed.notifications.push(twin);
        assert!(matches!(
            seed.validate(me),
            Err(PairupError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_duplicate_message_id_is_rejected() {
        let me = UserId::new();
        let mut seed = SeedData::demo(me, "/messages/");
        let twin = seed.messages[0].clone();
        seed.messages.push(twin);
        assert!(matches!(
            seed.validate(me),
            Err(PairupError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_orphan_message_is_rejected() {
        let me = UserId::new();
        let mut seed = SeedData::demo(me, "/messages/");
        seed.messages.push(demo_message(
            UserId::new(),
            me,
            "who is this?",
            may(16, 8, 0),
            false,
        ));
        assert!(seed.validate(me).is_err());
    }

    #[test]
    fn test_json_file_round_trip() {
        let me = UserId::new();
        let seed = SeedData::demo(me, "/messages/");
        let path = std::env::temp_dir().join(format!("pairup-seed-{}.json", UserId::new()));
        let written = serde_json::to_string(&seed)
            .map_err(PairupError::from)
            .and_then(|json| std::fs::write(&path, json).map_err(PairupError::from));
        assert!(written.is_ok());

        let loaded = SeedData::from_json_file(&path).unwrap_or_default();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, seed);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("pairup-missing-{}.json", UserId::new()));
        assert!(matches!(
            SeedData::from_json_file(&path),
            Err(PairupError::Io(_))
        ));
    }
}
