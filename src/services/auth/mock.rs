//! In-process auth backend with canned accounts and simulated latency.
//!
//! Accounts:
//! - `admin@test.com` / `admin123` → ADMIN "Admin User"
//! - `user@test.com` / `user123` → USER "Test User"
//! - any other non-empty email/password → USER "Demo User"

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{AuthApi, AuthServiceError};
use crate::clock::{Clock, IdGenerator};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, TokenPair, User, UserRole, UserUpdate};

const MIN_PASSWORD_LEN: usize = 6;
const VALID_TOKEN_PREFIX: &str = "mock_token_";

/// Per-operation artificial latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelays {
    pub login: Duration,
    pub register: Duration,
    pub logout: Duration,
    pub validate: Duration,
    pub refresh: Duration,
    pub update: Duration,
}

impl MockDelays {
    /// Latencies of a typical round trip to the real API.
    #[must_use]
    pub fn simulated() -> Self {
        Self {
            login: Duration::from_millis(800),
            register: Duration::from_millis(1000),
            logout: Duration::from_millis(300),
            validate: Duration::from_millis(500),
            refresh: Duration::from_millis(300),
            update: Duration::from_millis(600),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self {
            login: Duration::ZERO,
            register: Duration::ZERO,
            logout: Duration::ZERO,
            validate: Duration::ZERO,
            refresh: Duration::ZERO,
            update: Duration::ZERO,
        }
    }
}

impl Default for MockDelays {
    fn default() -> Self {
        Self::simulated()
    }
}

pub struct MockAuthService {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    delays: MockDelays,
}

impl MockAuthService {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, delays: MockDelays) -> Self {
        Self { clock, ids, delays }
    }

    fn user(&self, email: &str, first_name: &str, last_name: &str, role: UserRole) -> User {
        let now = self.clock.now();
        User {
            id: format!("user_{}", self.ids.next_id()),
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            role,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn login_response(&self, email: &str, first_name: &str, last_name: &str, role: UserRole) -> LoginResponse {
        let user = self.user(email, first_name, last_name, role);
        let id = self.ids.next_id();
        LoginResponse { user, token: format!("{VALID_TOKEN_PREFIX}{id}"), refresh_token: format!("mock_refresh_token_{id}") }
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait::async_trait]
impl AuthApi for MockAuthService {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, AuthServiceError> {
        simulate_latency(self.delays.login).await;
        let LoginRequest { email, password } = credentials;
        match (email.as_str(), password.as_str()) {
            ("admin@test.com", "admin123") => Ok(self.login_response(email, "Admin", "User", UserRole::Admin)),
            ("user@test.com", "user123") => Ok(self.login_response(email, "Test", "User", UserRole::User)),
            (e, p) if !e.is_empty() && !p.is_empty() => {
                debug!(email = %e, "mock login accepting demo account");
                Ok(self.login_response(email, "Demo", "User", UserRole::User))
            }
            _ => Err(AuthServiceError::InvalidCredentials),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, AuthServiceError> {
        simulate_latency(self.delays.register).await;
        if request.email.is_empty()
            || request.password.is_empty()
            || request.first_name.is_empty()
            || request.last_name.is_empty()
        {
            return Err(AuthServiceError::Validation("All fields are required".into()));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthServiceError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(self.login_response(&request.email, &request.first_name, &request.last_name, UserRole::User))
    }

    async fn logout(&self) -> Result<(), AuthServiceError> {
        simulate_latency(self.delays.logout).await;
        Ok(())
    }

    async fn validate_token(&self, token: &str) -> Result<User, AuthServiceError> {
        simulate_latency(self.delays.validate).await;
        if token.starts_with(VALID_TOKEN_PREFIX) {
            Ok(self.user("user@test.com", "Test", "User", UserRole::User))
        } else {
            Err(AuthServiceError::InvalidToken)
        }
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        simulate_latency(self.delays.refresh).await;
        let id = self.ids.next_id();
        Ok(TokenPair { token: format!("new_token_{id}"), refresh_token: format!("new_refresh_token_{id}") })
    }

    async fn update_profile(&self, user_id: &str, updates: &UserUpdate) -> Result<User, AuthServiceError> {
        simulate_latency(self.delays.update).await;
        debug!(%user_id, "mock profile update");
        let base = self.user("user@test.com", "Test", "User", UserRole::User);
        Ok(base.apply_update(updates))
    }
}
