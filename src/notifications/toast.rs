//! Transient alert collaborator.
//!
//! The store only hands the alert over; rendering belongs to the host.

use serde::{Deserialize, Serialize};
use tracing::info;

/// A transient alert raised for a new notification.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
}

/// Receiver of toasts. Fire-and-forget.
pub trait ToastSink: Send + Sync {
    /// Show `toast`.
    fn show(&self, toast: &Toast);
}

/// Emits toasts as `tracing` events on target `pairup::toast`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn show(&self, toast: &Toast) {
        info!(target: "pairup::toast", title = %toast.title, "{}", toast.description);
    }
}

/// Drops every toast.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopToastSink;

impl ToastSink for NoopToastSink {
    fn show(&self, _toast: &Toast) {}
}
