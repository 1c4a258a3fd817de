//! Authentication effects.
//!
//! DESIGN
//! ======
//! Each handler is a plain async method that performs I/O and returns the
//! follow-up action; the store runtime owns spawning and dispatch. Handlers
//! never return errors: every failure becomes a `*Failure` action (or, for
//! logout and token restore, is logged and swallowed).
//!
//! Persisted keys are written before the success action is returned, so a
//! subscriber that sees `LoginSuccess` can rely on storage being current.

#[cfg(test)]
#[path = "effects_test.rs"]
mod tests;

use std::fmt::Display;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{info, warn};

use super::actions::{AuthAction, Session};
use crate::models::{LoginRequest, RegisterRequest, User, UserUpdate};
use crate::navigation::{DASHBOARD_ROUTE, LOGIN_ROUTE, Navigator};
use crate::services::auth::AuthApi;
use crate::storage::SessionStorage;
use crate::store::{Action, Effect, effect_fn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_UPDATE_FAILED: &str = "Profile update failed";
const USER_ID_REQUIRED: &str = "User ID is required";

/// Error text for a failure action, or `fallback` when the error renders empty.
pub fn failure_message(err: &impl Display, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() { fallback.to_string() } else { message }
}

pub struct AuthEffects {
    api: Arc<dyn AuthApi>,
    storage: SessionStorage,
    navigator: Arc<dyn Navigator>,
}

impl AuthEffects {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, storage: SessionStorage, navigator: Arc<dyn Navigator>) -> Self {
        Self { api, storage, navigator }
    }

    // =========================================================================
    // DISPATCHING HANDLERS
    // =========================================================================

    pub async fn login(&self, credentials: LoginRequest) -> AuthAction {
        let result = match self.api.login(&credentials).await {
            Ok(resp) => self.persist(Session::from(resp)),
            Err(e) => Err(failure_message(&e, LOGIN_FAILED)),
        };
        match result {
            Ok(session) => AuthAction::LoginSuccess(session),
            Err(error) => {
                warn!(email = %credentials.email, %error, "login failed");
                AuthAction::LoginFailure { error }
            }
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AuthAction {
        let result = match self.api.register(&request).await {
            Ok(resp) => self.persist(Session::from(resp)),
            Err(e) => Err(failure_message(&e, REGISTRATION_FAILED)),
        };
        match result {
            Ok(session) => AuthAction::RegisterSuccess(session),
            Err(error) => {
                warn!(email = %request.email, %error, "registration failed");
                AuthAction::RegisterFailure { error }
            }
        }
    }

    /// Always completes: server and storage failures are logged and ignored.
    pub async fn logout(&self) -> AuthAction {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "logout request failed; clearing local session anyway");
        }
        self.clear_storage();
        AuthAction::LogoutComplete
    }

    /// Restore a persisted session. Every failure is silent.
    pub async fn load_user_from_token(&self) -> AuthAction {
        let stored = match self.storage.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                info!("no persisted session");
                return AuthAction::LoadUserFromTokenFailure;
            }
            Err(e) => {
                warn!(error = %e, "failed to read persisted session; clearing it");
                self.clear_storage();
                return AuthAction::LoadUserFromTokenFailure;
            }
        };
        match self.api.validate_token(&stored.token).await {
            Ok(user) => {
                info!(user_id = %user.id, "session restored");
                AuthAction::LoadUserFromTokenSuccess(Session {
                    user,
                    token: stored.token,
                    refresh_token: stored.refresh_token,
                })
            }
            Err(e) => {
                info!(error = %e, "persisted token rejected; clearing session");
                self.clear_storage();
                AuthAction::LoadUserFromTokenFailure
            }
        }
    }

    pub async fn update_user(&self, update: UserUpdate) -> AuthAction {
        let Some(user_id) = update.user_id() else {
            return AuthAction::UpdateUserFailure { error: USER_ID_REQUIRED.to_string() };
        };
        let result = match self.api.update_profile(user_id, &update).await {
            Ok(user) => self
                .storage
                .save_user(&user)
                .map(|()| user)
                .map_err(|e| failure_message(&e, PROFILE_UPDATE_FAILED)),
            Err(e) => Err(failure_message(&e, PROFILE_UPDATE_FAILED)),
        };
        match result {
            Ok(user) => AuthAction::UpdateUserSuccess { user },
            Err(error) => {
                warn!(%user_id, %error, "profile update failed");
                AuthAction::UpdateUserFailure { error }
            }
        }
    }

    // =========================================================================
    // NON-DISPATCHING HANDLERS
    // =========================================================================

    pub fn login_success(&self, user: &User) {
        info!(user_id = %user.id, role = %user.role, "login succeeded");
        self.navigator.navigate(DASHBOARD_ROUTE);
    }

    pub fn register_success(&self, user: &User) {
        info!(user_id = %user.id, "registration succeeded");
        self.navigator.navigate(DASHBOARD_ROUTE);
    }

    pub fn logout_complete(&self) {
        info!("logged out");
        self.navigator.navigate(LOGIN_ROUTE);
    }

    pub fn update_user_success(&self, user: &User) {
        info!(user_id = %user.id, "profile updated");
    }

    fn persist(&self, session: Session) -> Result<Session, String> {
        self.storage
            .save(&session.user, &session.token, &session.refresh_token)
            .map_err(|e| e.to_string())?;
        Ok(session)
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Wrap every handler as a store [`Effect`].
    #[must_use]
    pub fn into_effects(self) -> Vec<Arc<dyn Effect>> {
        let ctx = Arc::new(self);
        vec![
            auth_effect(&ctx, "login", |ctx, action| match action {
                AuthAction::Login { credentials } => {
                    let credentials = credentials.clone();
                    Some(async move { Some(ctx.login(credentials).await) }.boxed())
                }
                _ => None,
            }),
            auth_effect(&ctx, "login_success", |ctx, action| match action {
                AuthAction::LoginSuccess(session) => {
                    let user = session.user.clone();
                    Some(async move { ctx.login_success(&user); None }.boxed())
                }
                _ => None,
            }),
            auth_effect(&ctx, "register", |ctx, action| match action {
                AuthAction::Register { request } => {
                    let request = request.clone();
                    Some(async move { Some(ctx.register(request).await) }.boxed())
                }
                _ => None,
            }),
            auth_effect(&ctx, "register_success", |ctx, action| match action {
                AuthAction::RegisterSuccess(session) => {
                    let user = session.user.clone();
                    Some(async move { ctx.register_success(&user); None }.boxed())
                }
                _ => None,
            }),
            auth_effect(&ctx, "logout", |ctx, action| match action {
                AuthAction::Logout => Some(async move { Some(ctx.logout().await) }.boxed()),
                _ => None,
            }),
            auth_effect(&ctx, "logout_complete", |ctx, action| match action {
                AuthAction::LogoutComplete => Some(async move { ctx.logout_complete(); None }.boxed()),
                _ => None,
            }),
            auth_effect(&ctx, "load_user_from_token", |ctx, action| match action {
                AuthAction::LoadUserFromToken => Some(async move { Some(ctx.load_user_from_token().await) }.boxed()),
                _ => None,
            }),
            auth_effect(&ctx, "update_user", |ctx, action| match action {
                AuthAction::UpdateUser { user } => {
                    let update = user.clone();
                    Some(async move { Some(ctx.update_user(update).await) }.boxed())
                }
                _ => None,
            }),
            auth_effect(&ctx, "update_user_success", |ctx, action| match action {
                AuthAction::UpdateUserSuccess { user } => {
                    let user = user.clone();
                    Some(async move { ctx.update_user_success(&user); None }.boxed())
                }
                _ => None,
            }),
        ]
    }
}

type AuthWork = BoxFuture<'static, Option<AuthAction>>;

/// Adapt an auth-only handler to the store's [`Effect`] interface. The
/// handler receives its own clone of the shared context.
fn auth_effect<F>(ctx: &Arc<AuthEffects>, name: &'static str, handler: F) -> Arc<dyn Effect>
where
    F: Fn(Arc<AuthEffects>, &AuthAction) -> Option<AuthWork> + Send + Sync + 'static,
{
    let ctx = Arc::clone(ctx);
    effect_fn(name, move |action: &Action| {
        let work = handler(Arc::clone(&ctx), action.as_auth()?)?;
        Some(async move { work.await.map(Action::from) }.boxed())
    })
}
