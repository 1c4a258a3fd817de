//! Read-only views over the auth slice.
//!
//! Plain `select_*` functions borrow from the state snapshot. `AuthSelectors`
//! wraps the derived string/profile views in [`Memoized`] so repeated reads
//! against an unchanged user skip recomputation.

#[cfg(test)]
#[path = "selectors_test.rs"]
mod tests;

use serde::Serialize;
use time::OffsetDateTime;

use super::state::AuthState;
use crate::models::{User, UserRole};
use crate::store::AppState;
use crate::store::selector::Memoized;

// =============================================================================
// FEATURE + FIELD SELECTORS
// =============================================================================

#[must_use]
pub fn select_auth_state(state: &AppState) -> &AuthState {
    &state.auth
}

#[must_use]
pub fn select_user(state: &AppState) -> Option<&User> {
    state.auth.user.as_ref()
}

#[must_use]
pub fn select_token(state: &AppState) -> Option<&str> {
    state.auth.token.as_deref()
}

#[must_use]
pub fn select_refresh_token(state: &AppState) -> Option<&str> {
    state.auth.refresh_token.as_deref()
}

#[must_use]
pub fn select_is_authenticated(state: &AppState) -> bool {
    state.auth.is_authenticated
}

#[must_use]
pub fn select_auth_loading(state: &AppState) -> bool {
    state.auth.is_loading
}

#[must_use]
pub fn select_auth_error(state: &AppState) -> Option<&str> {
    state.auth.error.as_deref()
}

// =============================================================================
// DERIVED SELECTORS
// =============================================================================

/// `"first last"`, or `""` when logged out.
#[must_use]
pub fn select_user_full_name(state: &AppState) -> String {
    select_user(state).map(full_name).unwrap_or_default()
}

/// Upper-cased first letters of first and last name, or `""` when logged out.
#[must_use]
pub fn select_user_initials(state: &AppState) -> String {
    select_user(state).map(initials).unwrap_or_default()
}

#[must_use]
pub fn select_user_email(state: &AppState) -> &str {
    select_user(state).map_or("", |u| u.email.as_str())
}

#[must_use]
pub fn select_user_role(state: &AppState) -> Option<UserRole> {
    select_user(state).map(|u| u.role)
}

#[must_use]
pub fn select_is_admin(state: &AppState) -> bool {
    select_user_role(state) == Some(UserRole::Admin)
}

#[must_use]
pub fn select_is_manager(state: &AppState) -> bool {
    select_user_role(state) == Some(UserRole::Manager)
}

#[must_use]
pub fn select_has_auth_error(state: &AppState) -> bool {
    state.auth.error.is_some()
}

/// Coarse session status for route guards and spinners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub is_ready: bool,
}

#[must_use]
pub fn select_auth_status(state: &AppState) -> AuthStatus {
    AuthStatus {
        is_authenticated: state.auth.is_authenticated,
        is_loading: state.auth.is_loading,
        is_ready: !state.auth.is_loading,
    }
}

/// Flattened identity for profile headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub initials: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[must_use]
pub fn select_user_profile(state: &AppState) -> Option<UserProfile> {
    select_user(state).map(profile)
}

fn full_name(user: &User) -> String {
    format!("{} {}", user.first_name, user.last_name)
}

fn initials(user: &User) -> String {
    [&user.first_name, &user.last_name]
        .iter()
        .filter_map(|name| name.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn profile(user: &User) -> UserProfile {
    UserProfile {
        id: user.id.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: full_name(user),
        initials: initials(user),
        role: user.role,
        avatar: user.avatar.clone(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

// =============================================================================
// MEMOIZED BUNDLE
// =============================================================================

type UserSelector<O> = Memoized<AppState, Option<User>, O>;

/// Memoized derived views keyed on the current user.
pub struct AuthSelectors {
    pub full_name: UserSelector<String>,
    pub initials: UserSelector<String>,
    pub profile: UserSelector<Option<UserProfile>>,
}

impl AuthSelectors {
    #[must_use]
    pub fn new() -> Self {
        Self {
            full_name: Memoized::new(current_user, |user| user.as_ref().map(full_name).unwrap_or_default()),
            initials: Memoized::new(current_user, |user| user.as_ref().map(initials).unwrap_or_default()),
            profile: Memoized::new(current_user, |user| user.as_ref().map(profile)),
        }
    }
}

impl Default for AuthSelectors {
    fn default() -> Self {
        Self::new()
    }
}

fn current_user(state: &AppState) -> Option<User> {
    state.auth.user.clone()
}
