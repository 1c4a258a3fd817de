use super::*;
use crate::models::UserRole;
use time::macros::datetime;

fn sample_user() -> User {
    User {
        id: "user_7".into(),
        email: "user@test.com".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        role: UserRole::User,
        avatar: None,
        created_at: datetime!(2025-01-01 00:00:00 UTC),
        updated_at: datetime!(2025-01-01 00:00:00 UTC),
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_get_missing_is_none() {
    let store = MemoryStorage::new();
    assert!(store.get("token").unwrap().is_none());
}

#[test]
fn memory_set_get_remove() {
    let store = MemoryStorage::new();
    store.set("token", "abc").unwrap();
    assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));
    store.remove("token").unwrap();
    assert!(store.get("token").unwrap().is_none());
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::new(dir.path().join("absent.json"));
    assert!(store.get("token").unwrap().is_none());
}

#[test]
fn file_set_creates_parent_dirs_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");
    let store = FileStorage::new(&path);
    store.set("token", "mock_token_1").unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get("token").unwrap().as_deref(), Some("mock_token_1"));
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("mock_token_1"));
}

#[test]
fn file_remove_missing_key_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::new(dir.path().join("s.json"));
    store.remove("token").unwrap();
    assert!(!store.path().exists());
}

#[test]
fn file_corrupt_contents_is_serde_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, "not json").unwrap();
    let store = FileStorage::new(&path);
    assert!(matches!(store.get("token"), Err(StorageError::Serde(_))));
}

#[test]
fn file_set_overwrites_corrupt_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, "{not json").unwrap();
    let store = FileStorage::new(&path);
    store.set("token", "t1").unwrap();
    assert_eq!(store.get("token").unwrap().as_deref(), Some("t1"));
}

#[test]
fn file_remove_resets_corrupt_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, "{not json").unwrap();
    let store = FileStorage::new(&path);
    store.remove("token").unwrap();
    assert_eq!(store.get("token").unwrap(), None);
}

#[test]
fn file_set_many_writes_every_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStorage::new(dir.path().join("s.json"));
    store.set_many(&[("a", "1"), ("b", "2")]).unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
}

/// Memory backend that refuses writes to `user`.
#[derive(Default)]
struct UserWriteFails(MemoryStorage);

impl KeyValueStore for UserWriteFails {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == USER_KEY {
            return Err(StorageError::Io { path: PathBuf::from("s.json"), source: std::io::Error::other("disk full") });
        }
        self.0.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.0.remove(key)
    }
}

// =============================================================================
// SessionStorage
// =============================================================================

#[test]
fn session_save_failure_does_not_mix_sessions() {
    let backend = Arc::new(UserWriteFails::default());
    backend.0.set(USER_KEY, r#"{"id":"previous"}"#).unwrap();
    let storage = SessionStorage::new(backend.clone());

    assert!(storage.save(&sample_user(), "new_token", "new_refresh").is_err());
    assert_eq!(storage.load().unwrap(), None);
    for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
        assert!(backend.get(key).unwrap().is_none(), "{key} should be cleared");
    }
}

#[test]
fn session_clear_recovers_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, "{not json").unwrap();
    let storage = SessionStorage::new(Arc::new(FileStorage::new(&path)));
    assert!(storage.load().is_err());
    storage.clear().unwrap();
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn session_save_then_load() {
    let storage = SessionStorage::in_memory();
    storage.save(&sample_user(), "mock_token_1", "mock_refresh_token_1").unwrap();

    let stored = storage.load().unwrap().unwrap();
    assert_eq!(stored.token, "mock_token_1");
    assert_eq!(stored.refresh_token, "mock_refresh_token_1");
    let user: User = serde_json::from_str(&stored.user_json).unwrap();
    assert_eq!(user, sample_user());
}

#[test]
fn session_load_requires_all_three_keys() {
    let backend = Arc::new(MemoryStorage::new());
    let storage = SessionStorage::new(backend.clone());
    backend.set(TOKEN_KEY, "t").unwrap();
    backend.set(REFRESH_TOKEN_KEY, "r").unwrap();
    assert!(storage.load().unwrap().is_none());

    backend.set(USER_KEY, "{}").unwrap();
    assert!(storage.load().unwrap().is_some());
}

#[test]
fn session_load_treats_empty_value_as_missing() {
    let backend = Arc::new(MemoryStorage::new());
    let storage = SessionStorage::new(backend.clone());
    backend.set(TOKEN_KEY, "").unwrap();
    backend.set(REFRESH_TOKEN_KEY, "r").unwrap();
    backend.set(USER_KEY, "{}").unwrap();
    assert!(storage.load().unwrap().is_none());
}

#[test]
fn session_clear_removes_every_key() {
    let backend = Arc::new(MemoryStorage::new());
    let storage = SessionStorage::new(backend.clone());
    storage.save(&sample_user(), "t", "r").unwrap();
    storage.clear().unwrap();
    for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
        assert!(backend.get(key).unwrap().is_none(), "{key} should be cleared");
    }
}

#[test]
fn session_save_user_keeps_tokens() {
    let backend = Arc::new(MemoryStorage::new());
    let storage = SessionStorage::new(backend.clone());
    storage.save(&sample_user(), "t", "r").unwrap();

    let mut renamed = sample_user();
    renamed.first_name = "Renamed".into();
    storage.save_user(&renamed).unwrap();

    assert_eq!(backend.get(TOKEN_KEY).unwrap().as_deref(), Some("t"));
    assert!(backend.get(USER_KEY).unwrap().unwrap().contains("Renamed"));
}

#[test]
fn storage_error_display_includes_path() {
    let err = StorageError::Io {
        path: PathBuf::from("/tmp/x.json"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    let msg = err.to_string();
    assert!(msg.contains("/tmp/x.json"));
    assert!(msg.contains("denied"));
}
