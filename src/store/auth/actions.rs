//! Authentication actions.
//!
//! DESIGN
//! ======
//! One variant per event. Request variants express intent ("please log in"),
//! `*Success` / `*Failure` variants report outcomes produced by effects.
//! `kind()` gives the stable `[Auth] ...` type string used in logs and the
//! store history.

use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User, UserUpdate};

/// An authenticated user together with its token pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self { user: resp.user, token: resp.token, refresh_token: resp.refresh_token }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAction {
    /// Login form submitted.
    Login { credentials: LoginRequest },
    LoginSuccess(Session),
    LoginFailure { error: String },

    /// Registration form submitted.
    Register { request: RegisterRequest },
    RegisterSuccess(Session),
    RegisterFailure { error: String },

    /// User asked to log out.
    Logout,
    /// Server call finished (or failed) and persisted tokens were cleared.
    LogoutComplete,

    /// App start: try to restore the persisted session.
    LoadUserFromToken,
    LoadUserFromTokenSuccess(Session),
    /// No usable persisted session. Carries no error on purpose.
    LoadUserFromTokenFailure,

    UpdateUser { user: UserUpdate },
    UpdateUserSuccess { user: User },
    UpdateUserFailure { error: String },

    ClearError,
}

impl AuthAction {
    #[must_use]
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Login { credentials: LoginRequest::new(email, password) }
    }

    #[must_use]
    pub fn register(request: RegisterRequest) -> Self {
        Self::Register { request }
    }

    #[must_use]
    pub fn update_user(user: UserUpdate) -> Self {
        Self::UpdateUser { user }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "[Auth] Login",
            Self::LoginSuccess(_) => "[Auth] Login Success",
            Self::LoginFailure { .. } => "[Auth] Login Failure",
            Self::Register { .. } => "[Auth] Register",
            Self::RegisterSuccess(_) => "[Auth] Register Success",
            Self::RegisterFailure { .. } => "[Auth] Register Failure",
            Self::Logout => "[Auth] Logout",
            Self::LogoutComplete => "[Auth] Logout Complete",
            Self::LoadUserFromToken => "[Auth] Load User From Token",
            Self::LoadUserFromTokenSuccess(_) => "[Auth] Load User From Token Success",
            Self::LoadUserFromTokenFailure => "[Auth] Load User From Token Failure",
            Self::UpdateUser { .. } => "[Auth] Update User",
            Self::UpdateUserSuccess { .. } => "[Auth] Update User Success",
            Self::UpdateUserFailure { .. } => "[Auth] Update User Failure",
            Self::ClearError => "[Auth] Clear Error",
        }
    }

    /// True for actions that end a request (success or failure).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::LoginSuccess(_)
                | Self::LoginFailure { .. }
                | Self::RegisterSuccess(_)
                | Self::RegisterFailure { .. }
                | Self::LogoutComplete
                | Self::LoadUserFromTokenSuccess(_)
                | Self::LoadUserFromTokenFailure
                | Self::UpdateUserSuccess { .. }
                | Self::UpdateUserFailure { .. }
        )
    }
}
