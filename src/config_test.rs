use super::*;

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_config_env() {
    unsafe {
        std::env::remove_var("AUTH_BACKEND");
        std::env::remove_var("AUTH_API_URL");
        std::env::remove_var("AUTH_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("AUTH_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("AUTH_MOCK_LATENCY");
        std::env::remove_var("SESSION_STORE_PATH");
        std::env::remove_var("STORE_HISTORY_LIMIT");
    }
}

// All env-dependent assertions live in one test so parallel test threads
// never observe each other's variables.
#[test]
fn from_env_defaults_overrides_and_errors() {
    unsafe { clear_config_env() };
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg, AppConfig::default());

    unsafe {
        std::env::set_var("AUTH_BACKEND", "http");
        std::env::set_var("AUTH_API_URL", "https://api.example.test/auth/");
        std::env::set_var("AUTH_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("AUTH_CONNECT_TIMEOUT_SECS", "not-a-number");
        std::env::set_var("AUTH_MOCK_LATENCY", "none");
        std::env::set_var("SESSION_STORE_PATH", "/tmp/tf/session.json");
        std::env::set_var("STORE_HISTORY_LIMIT", "5");
    }
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.backend, AuthBackendKind::Http);
    assert_eq!(cfg.api_url, "https://api.example.test/auth");
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS });
    assert_eq!(cfg.mock_latency, MockLatency::None);
    assert_eq!(cfg.session_path, PathBuf::from("/tmp/tf/session.json"));
    assert_eq!(cfg.history_limit, 5);

    unsafe {
        clear_config_env();
        std::env::set_var("AUTH_BACKEND", "grpc");
    }
    let err = AppConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unknown AUTH_BACKEND"));

    unsafe {
        clear_config_env();
        std::env::set_var("AUTH_MOCK_LATENCY", "slow");
    }
    let err = AppConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unsupported AUTH_MOCK_LATENCY"));

    unsafe { clear_config_env() };
}

#[test]
fn backend_kind_parses_known_values() {
    assert_eq!("mock".parse::<AuthBackendKind>().unwrap(), AuthBackendKind::Mock);
    assert_eq!("http".parse::<AuthBackendKind>().unwrap(), AuthBackendKind::Http);
    assert!("MOCK".parse::<AuthBackendKind>().is_err());
}

#[test]
fn parse_mock_latency_defaults_to_simulated() {
    assert_eq!(parse_mock_latency(None).unwrap(), MockLatency::Simulated);
    assert_eq!(parse_mock_latency(Some("none")).unwrap(), MockLatency::None);
}

#[test]
fn default_history_limit_is_25() {
    assert_eq!(AppConfig::default().history_limit, 25);
}
