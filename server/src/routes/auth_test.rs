use super::*;
use axum::http::HeaderValue;

// =============================================================================
// proof_from_headers
// =============================================================================

#[test]
fn proof_read_from_session_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("session_token=abc123"));
    assert_eq!(proof_from_headers(&headers), Some("abc123".to_owned()));
}

#[test]
fn proof_read_from_bearer_header() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-456"));
    assert_eq!(proof_from_headers(&headers), Some("tok-456".to_owned()));
}

#[test]
fn cookie_takes_precedence_over_bearer() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("session_token=from-cookie"));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
    assert_eq!(proof_from_headers(&headers), Some("from-cookie".to_owned()));
}

#[test]
fn empty_cookie_falls_back_to_bearer() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("session_token="));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer fallback"));
    assert_eq!(proof_from_headers(&headers), Some("fallback".to_owned()));
}

#[test]
fn no_proof_is_none() {
    assert_eq!(proof_from_headers(&HeaderMap::new()), None);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(proof_from_headers(&headers), None);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert_eq!(proof_from_headers(&headers), None);
}

// =============================================================================
// ApiError rendering
// =============================================================================

#[test]
fn validation_maps_to_400_with_its_message() {
    let err = ApiError::from(AuthError::Validation("Email is required".to_owned()));
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.kind, "validation");
    assert_eq!(err.message, "Email is required");
}

#[test]
fn duplicate_email_maps_to_409() {
    let err = ApiError::from(AuthError::DuplicateEmail);
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.kind, "duplicate_email");
}

#[test]
fn credential_and_session_failures_map_to_401() {
    let err = ApiError::from(AuthError::InvalidCredentials);
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.kind, "invalid_credentials");

    let err = ApiError::from(AuthError::Unauthenticated);
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.kind, "unauthenticated");
}

#[test]
fn not_found_maps_to_404() {
    let err = ApiError::from(AuthError::NotFound);
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.kind, "not_found");
}

#[test]
fn infrastructure_failures_collapse_to_generic_500() {
    let err = ApiError::from(AuthError::Db(sqlx::Error::RowNotFound));
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.kind, "internal");
    assert!(!err.message.contains("row"));

    let err = ApiError::from(AuthError::Hash("kdf exploded".to_owned()));
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.kind, "internal");
    assert!(!err.message.contains("kdf"));
}

// =============================================================================
// session cookies
// =============================================================================

#[test]
fn session_cookie_is_http_only_with_ttl() {
    let rendered = session_cookie("tok".to_owned(), Duration::days(7)).to_string();
    assert!(rendered.starts_with("session_token=tok"));
    assert!(rendered.contains("HttpOnly"));
    assert!(rendered.contains("SameSite=Lax"));
    assert!(rendered.contains("Path=/"));
    assert!(rendered.contains("Max-Age=604800"));
}

#[test]
fn clear_cookie_expires_immediately() {
    let rendered = clear_session_cookie().to_string();
    assert!(rendered.starts_with("session_token="));
    assert!(rendered.contains("Max-Age=0"));
}
