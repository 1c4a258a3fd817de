//! UI slice state.
//!
//! Shape only, like the tasks slice: theme, sidebar, notifications and
//! connectivity flag with their startup defaults.

#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A toast shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    /// Auto-dismiss delay; `None` keeps the toast until dismissed.
    #[serde(default, rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiState {
    pub theme: Theme,
    pub sidebar_open: bool,
    pub notifications: Vec<Notification>,
    pub is_online: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { theme: Theme::Light, sidebar_open: true, notifications: Vec::new(), is_online: true }
    }
}
