//! Auth service — login, registration, logout, token validation/refresh,
//! profile update.
//!
//! DESIGN
//! ======
//! `AuthApi` is the boundary the auth effects call. `MockAuthService`
//! simulates the backend in-process (fixed latency, canned accounts);
//! `HttpAuthService` talks to the real REST API. Both are selected at
//! composition time and shared as `Arc<dyn AuthApi>`.

mod http;
mod mock;

pub use http::HttpAuthService;
pub use mock::{MockAuthService, MockDelays};

use std::sync::Arc;

use crate::clock::{SystemClock, UuidIdGenerator};
use crate::config::{AppConfig, AuthBackendKind, MockLatency};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, TokenPair, User, UserUpdate};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by auth service operations.
///
/// `Display` output is what ends up in `AuthState::error`, so validation
/// variants render as plain user-facing sentences.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Email or password rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Request fields failed validation.
    #[error("{0}")]
    Validation(String),

    /// The access token is missing, malformed, or expired.
    #[error("Invalid token")]
    InvalidToken,

    /// The HTTP request could not be sent or its body could not be read.
    #[error("auth request failed: {0}")]
    Request(String),

    /// The API answered with a failure status or `success: false`.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The API response body could not be deserialized.
    #[error("auth response parse failed: {0}")]
    Parse(String),

    /// A successful envelope carried no `data`.
    #[error("auth response missing data")]
    MissingData,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// AUTH API TRAIT
// =============================================================================

/// Backend operations used by the auth effects. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::InvalidCredentials`] on rejected credentials
    /// or a transport/API error.
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, AuthServiceError>;

    /// Create an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::Validation`] for missing or weak fields.
    async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, AuthServiceError>;

    /// Invalidate the current session server-side.
    ///
    /// # Errors
    ///
    /// Returns a transport/API error; callers may ignore it.
    async fn logout(&self) -> Result<(), AuthServiceError>;

    /// Resolve the user owning `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::InvalidToken`] when the token is not accepted.
    async fn validate_token(&self, token: &str) -> Result<User, AuthServiceError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns a transport/API error.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError>;

    /// Apply a partial update to the user's profile.
    ///
    /// # Errors
    ///
    /// Returns a transport/API error.
    async fn update_profile(&self, user_id: &str, updates: &UserUpdate) -> Result<User, AuthServiceError>;
}

/// Build the auth collaborator named by `config.backend`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn AuthApi>, AuthServiceError> {
    match config.backend {
        AuthBackendKind::Mock => {
            let delays = match config.mock_latency {
                MockLatency::Simulated => MockDelays::simulated(),
                MockLatency::None => MockDelays::none(),
            };
            Ok(Arc::new(MockAuthService::new(Arc::new(SystemClock), Arc::new(UuidIdGenerator), delays)))
        }
        AuthBackendKind::Http => Ok(Arc::new(HttpAuthService::new(&config.api_url, config.timeouts)?)),
    }
}
