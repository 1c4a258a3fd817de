//! REST auth API client.
//!
//! Thin `reqwest` wrapper over `{base}/login`, `/register`, `/logout`,
//! `/validate`, `/refresh`, and `/users/{id}`. Envelope handling lives in
//! pure functions (`parse_envelope`, `parse_ack`) for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{AuthApi, AuthServiceError};
use crate::config::HttpTimeouts;
use crate::models::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest, TokenPair, User, UserUpdate};

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpAuthService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthService {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, AuthServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| AuthServiceError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn endpoint(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), AuthServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthServiceError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AuthServiceError::Request(e.to_string()))?;
        debug!(status, "auth api response");
        Ok((status, body))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, AuthServiceError> {
        let (status, body) = self.execute(request).await?;
        parse_envelope(status, &body)
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthService {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, AuthServiceError> {
        self.fetch(self.http.post(self.endpoint("/login")).json(credentials)).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, AuthServiceError> {
        self.fetch(self.http.post(self.endpoint("/register")).json(request)).await
    }

    async fn logout(&self) -> Result<(), AuthServiceError> {
        let request = self.http.post(self.endpoint("/logout")).json(&serde_json::json!({}));
        let (status, body) = self.execute(request).await?;
        parse_ack(status, &body)
    }

    async fn validate_token(&self, token: &str) -> Result<User, AuthServiceError> {
        let request = self.http.get(self.endpoint("/validate")).bearer_auth(token);
        self.fetch(request).await.map_err(|e| match e {
            AuthServiceError::Api { status: 401, .. } => AuthServiceError::InvalidToken,
            other => other,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        let body = serde_json::json!({ "refreshToken": refresh_token });
        self.fetch(self.http.post(self.endpoint("/refresh")).json(&body)).await
    }

    async fn update_profile(&self, user_id: &str, updates: &UserUpdate) -> Result<User, AuthServiceError> {
        let url = self.endpoint(&format!("/users/{user_id}"));
        self.fetch(self.http.patch(url).json(updates)).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn failure(status: u16, body: &str) -> AuthServiceError {
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|env| env.failure_message())
        .unwrap_or_else(|| format!("request failed with status {status}"));
    AuthServiceError::Api { status, message }
}

/// Decode an `ApiResponse<T>` body and unwrap its `data`.
fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AuthServiceError> {
    if !is_success(status) {
        return Err(failure(status, body));
    }
    let envelope: ApiResponse<T> = serde_json::from_str(body).map_err(|e| AuthServiceError::Parse(e.to_string()))?;
    if !envelope.success {
        return Err(AuthServiceError::Api {
            status,
            message: envelope.failure_message().unwrap_or_else(|| "request was not successful".into()),
        });
    }
    envelope.data.ok_or(AuthServiceError::MissingData)
}

/// Accept any 2xx response whose body is empty or a successful envelope.
fn parse_ack(status: u16, body: &str) -> Result<(), AuthServiceError> {
    if !is_success(status) {
        return Err(failure(status, body));
    }
    if body.trim().is_empty() {
        return Ok(());
    }
    let envelope: ApiResponse<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| AuthServiceError::Parse(e.to_string()))?;
    if envelope.success {
        Ok(())
    } else {
        Err(AuthServiceError::Api {
            status,
            message: envelope.failure_message().unwrap_or_else(|| "request was not successful".into()),
        })
    }
}
