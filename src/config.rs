//! Application configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

pub const DEFAULT_AUTH_API_URL: &str = "http://localhost:3000/api/auth";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_STORE_PATH: &str = ".taskflow/session.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 25;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// Which auth collaborator the composition root wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackendKind {
    Mock,
    Http,
}

impl std::str::FromStr for AuthBackendKind {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "mock" => Ok(Self::Mock),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::Parse(format!("unknown AUTH_BACKEND: {other} (expected 'mock' or 'http')"))),
        }
    }
}

/// Whether the mock backend sleeps to imitate network latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockLatency {
    Simulated,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: AuthBackendKind,
    pub api_url: String,
    pub timeouts: HttpTimeouts,
    pub mock_latency: MockLatency,
    pub session_path: PathBuf,
    /// Number of dispatched actions retained in the store history.
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: AuthBackendKind::Mock,
            api_url: DEFAULT_AUTH_API_URL.to_string(),
            timeouts: HttpTimeouts::default(),
            mock_latency: MockLatency::Simulated,
            session_path: PathBuf::from(DEFAULT_SESSION_STORE_PATH),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `AUTH_BACKEND`: `mock` (default) or `http`
    /// - `AUTH_API_URL`: default `http://localhost:3000/api/auth`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 30
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: default 10
    /// - `AUTH_MOCK_LATENCY`: `simulated` (default) or `none`
    /// - `SESSION_STORE_PATH`: default `.taskflow/session.json`
    /// - `STORE_HISTORY_LIMIT`: default 25
    ///
    /// # Errors
    ///
    /// Returns an error if `AUTH_BACKEND` or `AUTH_MOCK_LATENCY` hold an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = std::env::var("AUTH_BACKEND")
            .ok()
            .as_deref()
            .unwrap_or("mock")
            .parse::<AuthBackendKind>()?;
        let api_url = std::env::var("AUTH_API_URL")
            .unwrap_or_else(|_| DEFAULT_AUTH_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = HttpTimeouts {
            request_secs: env_parse("AUTH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("AUTH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let mock_latency = parse_mock_latency(std::env::var("AUTH_MOCK_LATENCY").ok().as_deref())?;
        let session_path = std::env::var("SESSION_STORE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_SESSION_STORE_PATH), PathBuf::from);
        let history_limit = env_parse("STORE_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT);

        Ok(Self { backend, api_url, timeouts, mock_latency, session_path, history_limit })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_mock_latency(raw: Option<&str>) -> Result<MockLatency, ConfigError> {
    match raw.unwrap_or("simulated") {
        "simulated" => Ok(MockLatency::Simulated),
        "none" => Ok(MockLatency::None),
        other => Err(ConfigError::Parse(format!(
            "unsupported AUTH_MOCK_LATENCY '{other}' (expected 'simulated' or 'none')"
        ))),
    }
}
