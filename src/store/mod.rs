//! Application store: root state, root action, reducer, and runtime.
//!
//! ARCHITECTURE
//! ============
//! `AppState` is the single source of truth, split into `auth`, `tasks`
//! and `ui` slices. Only the auth slice has actions today; the other two
//! are carried as shapes with their initial values.
//!
//! ```text
//! StoreHandle::dispatch(action)
//!     -> dispatch loop: reduce -> publish snapshot -> history -> broadcast
//!     -> effect inboxes -> async work -> follow-up action -> dispatch loop
//! ```

pub mod auth;
pub mod runtime;
pub mod selector;
pub mod tasks;
pub mod ui;

pub use runtime::{ActionRecord, Effect, EffectFuture, Store, StoreBuilder, StoreError, StoreHandle, effect_fn};

use auth::{AuthAction, AuthState};
use tasks::TasksState;
use ui::UiState;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    pub auth: AuthState,
    pub tasks: TasksState,
    pub ui: UiState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(action) => action.kind(),
        }
    }

    /// True when the action ends a request (success or failure).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Auth(action) => action.is_terminal(),
        }
    }

    #[must_use]
    pub fn as_auth(&self) -> Option<&AuthAction> {
        match self {
            Self::Auth(action) => Some(action),
        }
    }
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

/// Root reducer. Slices without actions pass through unchanged.
#[must_use]
pub fn reduce(state: &AppState, action: &Action) -> AppState {
    match action {
        Action::Auth(action) => AppState { auth: auth::reduce(&state.auth, action), ..state.clone() },
    }
}
