use super::*;

// =============================================================================
// endpoint / header helpers
// =============================================================================

#[test]
fn auth_endpoint_joins_base_and_path() {
    assert_eq!(auth_endpoint("http://localhost:3000", "/api/auth/check"), "http://localhost:3000/api/auth/check");
}

#[test]
fn auth_endpoint_trims_trailing_slash() {
    assert_eq!(auth_endpoint("http://localhost:3000/", "/api/auth/login"), "http://localhost:3000/api/auth/login");
}

#[test]
fn cookie_header_carries_the_proof() {
    assert_eq!(cookie_header("abc123"), "session_token=abc123");
}

// =============================================================================
// token_from_set_cookie
// =============================================================================

#[test]
fn token_parsed_from_set_cookie_with_attributes() {
    let value = "session_token=tok-1; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800";
    assert_eq!(token_from_set_cookie(value), Some("tok-1".to_owned()));
}

#[test]
fn token_parsed_from_bare_set_cookie() {
    assert_eq!(token_from_set_cookie("session_token=tok-2"), Some("tok-2".to_owned()));
}

#[test]
fn other_cookies_are_ignored() {
    assert_eq!(token_from_set_cookie("theme=dark; Path=/"), None);
}

#[test]
fn cleared_cookie_yields_no_token() {
    assert_eq!(token_from_set_cookie("session_token=; Max-Age=0"), None);
}

// =============================================================================
// error surface
// =============================================================================

#[test]
fn server_error_exposes_kind_and_message() {
    let err = ApiError::Server { kind: "invalid_credentials".to_owned(), message: "Invalid credentials".to_owned() };
    assert_eq!(err.kind(), "invalid_credentials");
    assert_eq!(err.message(), "Invalid credentials");
}

#[test]
fn network_error_has_the_network_kind() {
    let err = ApiError::Network("connection refused".to_owned());
    assert_eq!(err.kind(), "network");
    assert!(err.message().contains("connection refused"));
}

#[test]
fn fallback_message_names_the_operation_and_status() {
    assert_eq!(request_failed_message("login", 502), "login failed: 502");
}
