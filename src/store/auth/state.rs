//! Authentication slice state.

use crate::models::User;

/// Current session as seen by the UI.
///
/// Invariants after every completed transition:
/// - `token` and `refresh_token` are both present or both absent.
/// - `is_authenticated` implies `user` and `token` are present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    /// True between a request action and its terminal success/failure action.
    pub is_loading: bool,
    /// Last user-facing failure message.
    pub error: Option<String>,
}

impl AuthState {
    /// Logged-out state the store starts from.
    #[must_use]
    pub fn initial() -> Self {
        Self::default()
    }
}
