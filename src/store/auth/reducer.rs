//! Authentication reducer.
//!
//! Pure `(state, action) -> state`. No I/O, no clock, no panics. Every
//! branch builds the next state from the previous one so the token pair is
//! always set or cleared as a unit.

#[cfg(test)]
#[path = "reducer_test.rs"]
mod tests;

use super::actions::{AuthAction, Session};
use super::state::AuthState;

#[must_use]
pub fn reduce(state: &AuthState, action: &AuthAction) -> AuthState {
    match action {
        AuthAction::Login { .. }
        | AuthAction::Register { .. }
        | AuthAction::LoadUserFromToken
        | AuthAction::UpdateUser { .. } => AuthState { is_loading: true, error: None, ..state.clone() },

        AuthAction::LoginSuccess(session)
        | AuthAction::RegisterSuccess(session)
        | AuthAction::LoadUserFromTokenSuccess(session) => authenticated(session),

        // Stale user/tokens from an earlier session are left in place.
        AuthAction::LoginFailure { error } | AuthAction::RegisterFailure { error } => AuthState {
            is_authenticated: false,
            is_loading: false,
            error: Some(error.clone()),
            ..state.clone()
        },

        AuthAction::LoadUserFromTokenFailure => AuthState {
            user: None,
            token: None,
            refresh_token: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
        },

        AuthAction::Logout | AuthAction::LogoutComplete => AuthState::initial(),

        AuthAction::UpdateUserSuccess { user } => AuthState {
            user: Some(user.clone()),
            is_loading: false,
            error: None,
            ..state.clone()
        },

        AuthAction::UpdateUserFailure { error } => AuthState {
            is_loading: false,
            error: Some(error.clone()),
            ..state.clone()
        },

        AuthAction::ClearError => AuthState { error: None, ..state.clone() },
    }
}

fn authenticated(session: &Session) -> AuthState {
    AuthState {
        user: Some(session.user.clone()),
        token: Some(session.token.clone()),
        refresh_token: Some(session.refresh_token.clone()),
        is_authenticated: true,
        is_loading: false,
        error: None,
    }
}
