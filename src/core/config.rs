//! Configuration for a pairup session.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{PairupError, PairupResult};
use crate::core::ids::UserId;

/// Env var holding a JSON config file path.
pub const ENV_CONFIG_PATH: &str = "PAIRUP_CONFIG";
/// Env var overriding the current user id.
pub const ENV_USER_ID: &str = "PAIRUP_USER_ID";
/// Env var overriding the conversation list order.
pub const ENV_CONVERSATION_ORDER: &str = "PAIRUP_CONVERSATION_ORDER";
/// Env var toggling toasts.
pub const ENV_TOASTS: &str = "PAIRUP_TOASTS";
/// Env var holding a JSON seed file path.
pub const ENV_SEED_PATH: &str = "PAIRUP_SEED_PATH";
/// Env var overriding the change-feed capacity.
pub const ENV_EVENT_CAPACITY: &str = "PAIRUP_EVENT_CAPACITY";

/// Largest accepted change-feed capacity.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairupConfig {
    /// Session identity settings.
    pub session: SessionConfig,
    /// Conversation store settings.
    pub conversations: ConversationConfig,
    /// Notification store settings.
    pub notifications: NotificationConfig,
    /// Change feed settings.
    pub events: EventConfig,
    /// Startup seed settings.
    pub seed: SeedConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl PairupConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> PairupResult<()> {
        if self.events.channel_capacity == 0 {
            return Err(PairupError::InvalidConfig(
                "events.channel_capacity must be > 0".to_string(),
            ));
        }

        if self.events.channel_capacity > MAX_EVENT_CAPACITY {
            return Err(PairupError::InvalidConfig(format!(
                "events.channel_capacity must be <= {MAX_EVENT_CAPACITY}"
            )));
        }

        if self.notifications.message_link_prefix.trim().is_empty() {
            return Err(PairupError::InvalidConfig(
                "notifications.message_link_prefix must not be empty".to_string(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(PairupError::InvalidConfig(
                "logging.filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Load a configuration from a JSON file. Missing sections take defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_json_file(path: &Path) -> PairupResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from the process environment.
    ///
    /// When `PAIRUP_CONFIG` is set the JSON file is the base, otherwise the
    /// defaults are; the remaining `PAIRUP_*` variables are applied on top.
    ///
    /// # Errors
    /// Returns an error if the base file or any variable is invalid.
    pub fn from_env() -> PairupResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PairupConfig::from_env`] with an injectable variable lookup.
    ///
    /// # Errors
    /// Returns an error if the base file or any variable is invalid.
    pub fn from_lookup<F>(lookup: F) -> PairupResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match lookup(ENV_CONFIG_PATH) {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    /// Apply `PAIRUP_*` overrides on top of this configuration.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparsable value.
    pub fn with_overrides<F>(mut self, lookup: F) -> PairupResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_USER_ID) {
            self.session.current_user_id = Some(raw.trim().parse()?);
        }

        if let Some(raw) = lookup(ENV_CONVERSATION_ORDER) {
            self.conversations.order = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_TOASTS) {
            self.notifications.toasts_enabled = parse_flag(ENV_TOASTS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_SEED_PATH) {
            self.seed.path = Some(PathBuf::from(raw));
        }

        if let Some(raw) = lookup(ENV_EVENT_CAPACITY) {
            self.events.channel_capacity = raw.trim().parse().map_err(|_| {
                PairupError::InvalidConfig(format!("{ENV_EVENT_CAPACITY} must be a number"))
            })?;
        }

        self.validate()?;
        Ok(self)
    }
}

fn parse_flag(key: &str, raw: &str) -> PairupResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(PairupError::InvalidConfig(format!(
            "{key} must be on/off, got {other:?}"
        ))),
    }
}

/// Session identity settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Current user id; a fresh one is generated when unset.
    pub current_user_id: Option<UserId>,
}

/// Ordering of the conversation list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationOrder {
    /// Most recent `last_message_date` first.
    #[default]
    Recency,
    /// Order in which conversations were created or seeded.
    Insertion,
}

impl ConversationOrder {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recency => "recency",
            Self::Insertion => "insertion",
        }
    }
}

impl fmt::Display for ConversationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationOrder {
    type Err = PairupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recency" => Ok(Self::Recency),
            "insertion" => Ok(Self::Insertion),
            other => Err(PairupError::InvalidConfig(format!(
                "unknown conversation order {other:?}"
            ))),
        }
    }
}

/// Conversation store settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// List ordering.
    pub order: ConversationOrder,
}

/// Notification store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Forward new notifications to the toast sink.
    pub toasts_enabled: bool,
    /// Link prefix of conversation targets; the conversation id is appended.
    pub message_link_prefix: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toasts_enabled: true,
            message_link_prefix: "/messages/".to_string(),
        }
    }
}

/// Change feed settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Broadcast buffer size per subscriber.
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Startup seed settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// JSON seed file; takes precedence over `demo`.
    pub path: Option<PathBuf>,
    /// Load the built-in demo data when no file is given.
    pub demo: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            demo: true,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = PairupConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.conversations.order, ConversationOrder::Recency);
        assert!(config.notifications.toasts_enabled);
        assert_eq!(config.notifications.message_link_prefix, "/messages/");
        assert_eq!(config.events.channel_capacity, 64);
        assert!(config.seed.demo);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let mut config = PairupConfig::default();
        config.events.channel_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(PairupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_huge_capacity_is_rejected() {
        let mut config = PairupConfig::default();
        config.events.channel_capacity = MAX_EVENT_CAPACITY;
        assert!(config.validate().is_ok());

        config.events.channel_capacity = MAX_EVENT_CAPACITY + 1;
        assert!(matches!(
            config.validate(),
            Err(PairupError::InvalidConfig(_))
        ));

        let max = usize::MAX.to_string();
        assert!(matches!(
            PairupConfig::from_lookup(lookup_from(&[(ENV_EVENT_CAPACITY, max.as_str())])),
            Err(PairupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let user = UserId::new();
        let user_str = user.to_string();
        let config = PairupConfig::from_lookup(lookup_from(&[
            (ENV_USER_ID, user_str.as_str()),
            (ENV_CONVERSATION_ORDER, "Insertion"),
            (ENV_TOASTS, "off"),
            (ENV_SEED_PATH, "/tmp/seed.json"),
            (ENV_EVENT_CAPACITY, "8"),
        ]));

        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert_eq!(config.session.current_user_id, Some(user));
        assert_eq!(config.conversations.order, ConversationOrder::Insertion);
        assert!(!config.notifications.toasts_enabled);
        assert_eq!(config.seed.path, Some(PathBuf::from("/tmp/seed.json")));
        assert_eq!(config.events.channel_capacity, 8);
    }

    #[test]
    fn test_env_overrides_reject_bad_values() {
        assert!(PairupConfig::from_lookup(lookup_from(&[(ENV_TOASTS, "maybe")])).is_err());
        assert!(
            PairupConfig::from_lookup(lookup_from(&[(ENV_CONVERSATION_ORDER, "alpha")])).is_err()
        );
        assert!(PairupConfig::from_lookup(lookup_from(&[(ENV_EVENT_CAPACITY, "0")])).is_err());
        assert!(matches!(
            PairupConfig::from_lookup(lookup_from(&[(ENV_USER_ID, "nope")])),
            Err(PairupError::InvalidId(_))
        ));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: PairupConfig =
            serde_json::from_str(r#"{"conversations":{"order":"insertion"}}"#)
                .unwrap_or_default();
        assert_eq!(config.conversations.order, ConversationOrder::Insertion);
        assert_eq!(config.events.channel_capacity, 64);
        assert_eq!(config.logging.filter, "info");
    }
}
