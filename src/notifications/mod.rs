//! Notification feed for the current user.
//!
//! - `types`: notification records and the closed kind set
//! - `store`: the in-memory feed with read/clear bookkeeping
//! - `toast`: the transient alert seam raised on every new notification

pub mod store;
pub mod toast;
pub mod types;

pub use store::NotificationStore;
pub use toast::{NoopToastSink, Toast, ToastSink, TracingToastSink};
pub use types::{NewNotification, Notification, NotificationKind};
