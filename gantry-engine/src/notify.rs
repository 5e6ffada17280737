//! Notification sink
//!
//! The engine reports progress through an opaque sink: transient toasts and
//! a show/hide loading indicator. The default implementation routes both to
//! `tracing`; front ends supply their own.

/// Sink for user-facing progress notifications
pub trait NotificationSink: Send + Sync {
    /// Show a transient message
    fn toast(&self, message: &str);

    /// Show or update the loading indicator text
    fn indicator(&self, text: &str);

    /// Hide the loading indicator
    fn indicator_done(&self);
}

/// Notification sink that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn toast(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn indicator(&self, text: &str) {
        tracing::debug!(indicator = text);
    }

    fn indicator_done(&self) {
        tracing::debug!("indicator hidden");
    }
}
