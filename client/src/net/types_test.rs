use super::*;

#[test]
fn user_deserializes_from_camel_case_wire_form() {
    let json = r#"{
        "id": "8f9f1c4e-6a3b-4a57-9a51-2f4d53d9a001",
        "email": "ada@example.com",
        "fullName": "Ada Lovelace",
        "profilePicture": "/avatar.png",
        "createdAt": "2026-08-01"
    }"#;
    let user: User = serde_json::from_str(json).expect("deserialize");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.full_name, "Ada Lovelace");
    assert_eq!(user.created_at, "2026-08-01");
}

#[test]
fn signup_request_serializes_full_name_as_camel_case() {
    let request = SignupRequest {
        email: "new@x.com".to_owned(),
        full_name: "New User".to_owned(),
        password: "StrongPass1".to_owned(),
    };
    let json = serde_json::to_string(&request).expect("serialize");
    assert!(json.contains("\"fullName\":\"New User\""));
}

#[test]
fn profile_patch_omits_unset_fields() {
    let patch = ProfilePatch { full_name: Some("Renamed".to_owned()), profile_picture: None };
    let json = serde_json::to_string(&patch).expect("serialize");
    assert!(json.contains("fullName"));
    assert!(!json.contains("profilePicture"));

    let empty = serde_json::to_string(&ProfilePatch::default()).expect("serialize");
    assert_eq!(empty, "{}");
}

#[test]
fn error_body_parses_kind_and_message() {
    let body: ErrorBody =
        serde_json::from_str(r#"{"error":"invalid_credentials","message":"Invalid credentials"}"#).expect("parse");
    assert_eq!(body.error, "invalid_credentials");
    assert_eq!(body.message, "Invalid credentials");
}
