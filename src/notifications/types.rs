//! Notification record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::PairupError;
use crate::core::ids::NotificationId;

/// Category of a notification. Closed set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A direct message arrived.
    Message,
    /// Event reminder or RSVP update.
    Event,
    /// Flatmate match or listing activity.
    Flatmate,
    /// Account or platform notice.
    System,
}

impl NotificationKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [Self::Message, Self::Event, Self::Flatmate, Self::System];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Event => "event",
            Self::Flatmate => "flatmate",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = PairupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| PairupError::InvalidSeed(format!("unknown notification kind {value:?}")))
    }
}

/// An entry of the notification feed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier, assigned by the store.
    pub id: NotificationId,
    /// Category.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Creation time, assigned by the store.
    pub created_at: DateTime<Utc>,
    /// Whether the user acknowledged it.
    pub read: bool,
    /// Optional navigation target, opaque to the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Caller-supplied part of a notification.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    /// Category.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Optional navigation target.
    #[serde(default)]
    pub link: Option<String>,
}

impl NewNotification {
    /// Build a notification without a link.
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            link: None,
        }
    }

    /// Attach a navigation target.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
