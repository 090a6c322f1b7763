//! services/portal/src/adapters/notify.rs
//!
//! Surfaces user notifications through the log, on the `portal::toast` target.

use booking_portal_core::ports::{NotificationSink, NotifyLevel};
use tracing::{error, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Success => info!(target: "portal::toast", kind = "success", "{}", message),
            NotifyLevel::Info => info!(target: "portal::toast", kind = "info", "{}", message),
            NotifyLevel::Error => error!(target: "portal::toast", "{}", message),
        }
    }
}
