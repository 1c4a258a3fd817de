//! Route navigation capability.
//!
//! Effects navigate fire-and-forget: a navigator never reports failure back
//! into the store.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;

use std::sync::{Mutex, PoisonError};

use tracing::info;

pub const DASHBOARD_ROUTE: &str = "/dashboard";
pub const LOGIN_ROUTE: &str = "/login";

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Logs each navigation. Used by the CLI, which has no router.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(%route, "navigate");
    }
}

/// Records every route in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_owned());
    }
}
