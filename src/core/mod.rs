//! Core types shared by both stores: ids, errors, configuration and time.

pub mod clock;
pub mod config;
pub mod errors;
pub mod ids;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ConversationConfig, ConversationOrder, EventConfig, LoggingConfig, NotificationConfig,
    PairupConfig, SeedConfig, SessionConfig,
};
pub use errors::{PairupError, PairupResult};
pub use ids::{ConversationId, MessageId, NotificationId, UserId};
