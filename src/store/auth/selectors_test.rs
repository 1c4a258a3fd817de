use super::*;
use crate::store::auth::{AuthAction, Session, reduce};
use time::macros::datetime;

fn user(first: &str, last: &str, role: UserRole) -> User {
    User {
        id: "user_1".into(),
        email: "sonia@example.com".into(),
        first_name: first.into(),
        last_name: last.into(),
        role,
        avatar: None,
        created_at: datetime!(2025-01-01 00:00:00 UTC),
        updated_at: datetime!(2025-01-01 00:00:00 UTC),
    }
}

fn app_with(user: User) -> AppState {
    let session = Session { user, token: "tok".into(), refresh_token: "ref".into() };
    AppState { auth: reduce(&AuthState::initial(), &AuthAction::LoginSuccess(session)), ..AppState::default() }
}

// =============================================================================
// field selectors
// =============================================================================

#[test]
fn logged_out_defaults() {
    let state = AppState::default();
    assert_eq!(select_user(&state), None);
    assert_eq!(select_token(&state), None);
    assert_eq!(select_refresh_token(&state), None);
    assert!(!select_is_authenticated(&state));
    assert!(!select_auth_loading(&state));
    assert_eq!(select_auth_error(&state), None);
    assert_eq!(select_user_full_name(&state), "");
    assert_eq!(select_user_initials(&state), "");
    assert_eq!(select_user_email(&state), "");
    assert_eq!(select_user_role(&state), None);
    assert!(!select_is_admin(&state));
    assert_eq!(select_user_profile(&state), None);
}

#[test]
fn logged_in_fields() {
    let state = app_with(user("Sonia", "Kumar", UserRole::User));
    assert_eq!(select_token(&state), Some("tok"));
    assert_eq!(select_refresh_token(&state), Some("ref"));
    assert!(select_is_authenticated(&state));
    assert_eq!(select_user_email(&state), "sonia@example.com");
    assert_eq!(select_auth_state(&state), &state.auth);
}

// =============================================================================
// derived selectors
// =============================================================================

#[test]
fn full_name_and_initials() {
    let state = app_with(user("Sonia", "Kumar", UserRole::User));
    assert_eq!(select_user_full_name(&state), "Sonia Kumar");
    assert_eq!(select_user_initials(&state), "SK");
}

#[test]
fn initials_are_upper_cased() {
    let state = app_with(user("émile", "zola", UserRole::User));
    assert_eq!(select_user_initials(&state), "ÉZ");
}

#[test]
fn initials_with_empty_names_do_not_panic() {
    assert_eq!(select_user_initials(&app_with(user("", "", UserRole::User))), "");
    assert_eq!(select_user_initials(&app_with(user("Sonia", "", UserRole::User))), "S");
}

#[test]
fn role_flags() {
    let admin = app_with(user("A", "B", UserRole::Admin));
    let manager = app_with(user("A", "B", UserRole::Manager));
    assert!(select_is_admin(&admin));
    assert!(!select_is_manager(&admin));
    assert!(select_is_manager(&manager));
    assert_eq!(select_user_role(&manager), Some(UserRole::Manager));
}

#[test]
fn has_auth_error_tracks_error() {
    let mut state = AppState::default();
    assert!(!select_has_auth_error(&state));
    state.auth = reduce(&state.auth, &AuthAction::LoginFailure { error: "Invalid credentials".into() });
    assert!(select_has_auth_error(&state));
    assert_eq!(select_auth_error(&state), Some("Invalid credentials"));
}

#[test]
fn auth_status_ready_is_not_loading() {
    let mut state = AppState::default();
    assert_eq!(
        select_auth_status(&state),
        AuthStatus { is_authenticated: false, is_loading: false, is_ready: true }
    );
    state.auth = reduce(&state.auth, &AuthAction::LoadUserFromToken);
    let status = select_auth_status(&state);
    assert!(status.is_loading);
    assert!(!status.is_ready);
}

#[test]
fn profile_flattens_identity() {
    let profile = select_user_profile(&app_with(user("Sonia", "Kumar", UserRole::Admin))).unwrap();
    assert_eq!(profile.full_name, "Sonia Kumar");
    assert_eq!(profile.initials, "SK");
    assert_eq!(profile.role, UserRole::Admin);
    assert_eq!(profile.email, "sonia@example.com");
    assert_eq!(profile.created_at, datetime!(2025-01-01 00:00:00 UTC));
    assert_eq!(profile.updated_at, datetime!(2025-01-01 00:00:00 UTC));
}

#[test]
fn profile_serializes_timestamps() {
    let profile = select_user_profile(&app_with(user("Sonia", "Kumar", UserRole::User))).unwrap();
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["createdAt"], "2025-01-01T00:00:00Z");
    assert_eq!(json["updatedAt"], "2025-01-01T00:00:00Z");
    assert_eq!(json["fullName"], "Sonia Kumar");
    assert_eq!(json["role"], "USER");
}

// =============================================================================
// memoized bundle
// =============================================================================

#[test]
fn memoized_selectors_skip_unrelated_changes() {
    let selectors = AuthSelectors::new();
    let mut state = app_with(user("Sonia", "Kumar", UserRole::User));
    assert_eq!(selectors.full_name.select(&state), "Sonia Kumar");

    state.auth = reduce(&state.auth, &AuthAction::LoadUserFromToken);
    state.ui.sidebar_open = false;
    assert_eq!(selectors.full_name.select(&state), "Sonia Kumar");
    assert_eq!(selectors.full_name.computations(), 1);
}

#[test]
fn memoized_selectors_recompute_on_user_change() {
    let selectors = AuthSelectors::new();
    let state = app_with(user("Sonia", "Kumar", UserRole::User));
    assert_eq!(selectors.initials.select(&state), "SK");

    let renamed = AppState {
        auth: reduce(&state.auth, &AuthAction::UpdateUserSuccess { user: user("Asha", "Rao", UserRole::User) }),
        ..state
    };
    assert_eq!(selectors.initials.select(&renamed), "AR");
    assert_eq!(selectors.initials.computations(), 2);
    assert_eq!(selectors.profile.select(&renamed).map(|p| p.full_name), Some("Asha Rao".to_string()));
}

#[test]
fn memoized_profile_is_none_when_logged_out() {
    let selectors = AuthSelectors::default();
    assert_eq!(selectors.profile.select(&AppState::default()), None);
}
