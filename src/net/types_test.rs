use super::*;
use serde_json::json;

#[test]
fn resource_id_accepts_numbers_and_strings() {
    let n: ResourceId = serde_json::from_value(json!(42)).unwrap();
    let s: ResourceId = serde_json::from_value(json!("abc")).unwrap();
    assert_eq!(n, ResourceId::Number(42));
    assert_eq!(s, ResourceId::Text("abc".to_owned()));
    assert_eq!(n.to_string(), "42");
    assert_eq!(s.to_string(), "abc");
}

#[test]
fn credential_debug_is_redacted() {
    let token = Credential::new("s3cret");
    let printed = format!("{token:?}");
    assert!(!printed.contains("s3cret"));
    assert_eq!(token.bearer(), "Bearer s3cret");
}

#[test]
fn auth_response_parses_token_and_user() {
    let resp: AuthResponse = serde_json::from_value(json!({
        "token": "tok",
        "user": { "id": 1, "email": "a@b.com" }
    }))
    .unwrap();
    assert_eq!(resp.token.as_str(), "tok");
    assert_eq!(resp.user.email, "a@b.com");
    assert!(resp.user.name.is_none());
}

#[test]
fn user_profile_keeps_unknown_attributes() {
    let raw = json!({ "id": "u1", "email": "a@b.com", "plan": "pro", "quota": 50 });
    let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(profile.extra.get("plan"), Some(&json!("pro")));
    assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
}

#[test]
fn profile_patch_omits_unset_fields() {
    let patch = ProfilePatch { name: Some("Ada".to_owned()), ..ProfilePatch::default() };
    assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "name": "Ada" }));
}

#[test]
fn password_change_uses_snake_case_fields() {
    let body = PasswordChange { old_password: "old", new_password: "new" };
    assert_eq!(
        serde_json::to_value(body).unwrap(),
        json!({ "old_password": "old", "new_password": "new" })
    );
}

#[test]
fn link_defaults_missing_counters() {
    let link: Link = serde_json::from_value(json!({
        "id": 3,
        "original_url": "https://example.com",
        "short_code": "ex"
    }))
    .unwrap();
    assert_eq!(link.clicks, 0);
    assert!(link.title.is_none());
}

#[test]
fn error_body_tolerates_missing_field() {
    let body: ErrorBody = serde_json::from_str("{}").unwrap();
    assert!(body.error.is_none());
    let body: ErrorBody = serde_json::from_str(r#"{"error":"Email taken"}"#).unwrap();
    assert_eq!(body.error.as_deref(), Some("Email taken"));
}

#[test]
fn resource_ids_match_across_number_and_text() {
    assert!(ResourceId::Number(7).refers_to(&ResourceId::from("7")));
    assert!(ResourceId::from("7").refers_to(&ResourceId::Number(7)));
    assert!(ResourceId::from("abc").refers_to(&ResourceId::from("abc")));
    assert!(!ResourceId::Number(7).refers_to(&ResourceId::from("7a")));
    assert!(!ResourceId::Number(7).refers_to(&ResourceId::Number(8)));
}
