//! services/portal/src/adapters/navigation.rs
//!
//! A headless navigator. It remembers the current route and logs every
//! redirect so a terminal session shows where the user was sent.

use booking_portal_core::ports::Navigator;
use std::sync::Mutex;
use tracing::info;

pub struct TracingNavigator {
    current: Mutex<String>,
}

impl TracingNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
        }
    }

    /// The route the user was last sent to.
    pub fn current(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for TracingNavigator {
    fn go_to(&self, route: &str) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        info!(from = %current, to = route, "Navigating");
        *current = route.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_to_updates_current_route() {
        let navigator = TracingNavigator::new("/");
        assert_eq!(navigator.current(), "/");

        navigator.go_to("/login");
        assert_eq!(navigator.current(), "/login");
    }
}
