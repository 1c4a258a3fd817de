use super::*;
use time::macros::datetime;

fn sample_user() -> User {
    User {
        id: "user_1".into(),
        email: "sonia@example.com".into(),
        first_name: "Sonia".into(),
        last_name: "Kumar".into(),
        role: UserRole::User,
        avatar: None,
        created_at: datetime!(2025-01-02 03:04:05 UTC),
        updated_at: datetime!(2025-01-02 03:04:05 UTC),
    }
}

// =============================================================================
// UserRole
// =============================================================================

#[test]
fn role_serializes_upper_case() {
    assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), r#""ADMIN""#);
    assert_eq!(serde_json::to_string(&UserRole::Manager).unwrap(), r#""MANAGER""#);
}

#[test]
fn role_display_matches_wire_name() {
    assert_eq!(UserRole::User.to_string(), "USER");
}

// =============================================================================
// User serde
// =============================================================================

#[test]
fn user_serializes_camel_case_fields() {
    let json = serde_json::to_value(sample_user()).unwrap();
    assert_eq!(json["firstName"], "Sonia");
    assert_eq!(json["lastName"], "Kumar");
    assert_eq!(json["createdAt"], "2025-01-02T03:04:05Z");
    assert!(json.get("avatar").is_none());
}

#[test]
fn user_deserializes_without_avatar() {
    let json = r#"{
        "id": "u9",
        "email": "a@b.c",
        "firstName": "A",
        "lastName": "B",
        "role": "MANAGER",
        "createdAt": "2024-06-01T12:00:00Z",
        "updatedAt": "2024-06-01T12:00:00Z"
    }"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.role, UserRole::Manager);
    assert!(user.avatar.is_none());
}

// =============================================================================
// apply_update
// =============================================================================

#[test]
fn apply_update_overwrites_only_present_fields() {
    let update = UserUpdate { first_name: Some("Priya".into()), ..UserUpdate::default() };
    let updated = sample_user().apply_update(&update);
    assert_eq!(updated.first_name, "Priya");
    assert_eq!(updated.last_name, "Kumar");
    assert_eq!(updated.id, "user_1");
}

#[test]
fn apply_update_sets_avatar() {
    let update = UserUpdate { avatar: Some("https://img/1.png".into()), ..UserUpdate::default() };
    let updated = sample_user().apply_update(&update);
    assert_eq!(updated.avatar.as_deref(), Some("https://img/1.png"));
}

#[test]
fn user_id_ignores_empty_string() {
    let update = UserUpdate { id: Some(String::new()), ..UserUpdate::default() };
    assert!(update.user_id().is_none());
    let update = UserUpdate { id: Some("u1".into()), ..UserUpdate::default() };
    assert_eq!(update.user_id(), Some("u1"));
}

#[test]
fn user_update_omits_absent_fields() {
    let update = UserUpdate { last_name: Some("K".into()), ..UserUpdate::default() };
    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json, serde_json::json!({ "lastName": "K" }));
}

#[test]
fn credentials_debug_redacts_password() {
    let debug = format!("{:?}", LoginRequest::new("a@b.c", "hunter2"));
    assert!(debug.contains("a@b.c"));
    assert!(!debug.contains("hunter2"));
}
