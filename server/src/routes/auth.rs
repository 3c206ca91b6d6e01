//! Auth routes — signup, login, logout, session check, profile update.

use axum::extract::{FromRef, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::services::auth::{self, AuthError, PublicUser};
use crate::services::directory::ProfilePatch;
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";

fn cookie_secure() -> bool {
    std::env::var("COOKIE_SECURE")
        .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Pull the session proof out of the request: the session cookie if present,
/// otherwise an `Authorization: Bearer` header.
fn proof_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }

    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(ttl)
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// ERROR RENDERING
// =============================================================================

/// HTTP rendering of an [`AuthError`]: a status plus a JSON body with a
/// machine-readable `error` kind and a human `message`.
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: "Something went wrong. Please try again.".to_owned(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(message) => Self { status: StatusCode::BAD_REQUEST, kind: "validation", message },
            AuthError::DuplicateEmail => Self {
                status: StatusCode::CONFLICT,
                kind: "duplicate_email",
                message: "An account with that email already exists".to_owned(),
            },
            AuthError::InvalidCredentials => Self {
                status: StatusCode::UNAUTHORIZED,
                kind: "invalid_credentials",
                message: "Invalid credentials".to_owned(),
            },
            AuthError::Unauthenticated => Self {
                status: StatusCode::UNAUTHORIZED,
                kind: "unauthenticated",
                message: "Authentication required".to_owned(),
            },
            AuthError::NotFound => Self {
                status: StatusCode::NOT_FOUND,
                kind: "not_found",
                message: "Account not found".to_owned(),
            },
            AuthError::Db(e) => {
                tracing::error!(error = %e, "database failure");
                Self::internal()
            }
            AuthError::Hash(e) => {
                tracing::error!(error = %e, "credential hashing failure");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.kind, "message": self.message }));
        (self.status, body).into_response()
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the request's session proof.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: PublicUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = proof_from_headers(&parts.headers) else {
            return Err(AuthError::Unauthenticated.into());
        };

        let app_state = AppState::from_ref(state);
        let user = auth::check_session(&app_state.pool, &app_state.sessions, &token).await?;
        Ok(Self { user, token })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    email: String,
    full_name: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    full_name: Option<String>,
    profile_picture: Option<String>,
}

/// `POST /api/auth/signup` — register, set the session cookie, return the
/// public projection.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<(CookieJar, Json<PublicUser>), ApiError> {
    let (user, token) =
        auth::register(&state.pool, &state.sessions, &payload.email, &payload.full_name, &payload.password).await?;

    let jar = CookieJar::new().add(session_cookie(token, state.sessions.ttl()));
    Ok((jar, Json(user)))
}

/// `POST /api/auth/login` — verify credentials, set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<PublicUser>), ApiError> {
    let (user, token) = auth::login(&state.pool, &state.sessions, &payload.email, &payload.password).await?;

    let jar = CookieJar::new().add(session_cookie(token, state.sessions.ttl()));
    Ok((jar, Json(user)))
}

/// `POST /api/auth/logout` — revoke the proof (best-effort) and clear the
/// cookie. Always succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = proof_from_headers(&headers) {
        if let Err(e) = auth::logout(&state.pool, &state.sessions, &token).await {
            tracing::warn!(error = %e, "session revocation failed");
        }
    }

    let jar = CookieJar::new().add(clear_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/check` — return the current user.
pub async fn check(auth: AuthUser) -> Json<PublicUser> {
    Json(auth.user)
}

/// `PUT /api/auth/update-profile` — partial profile update for the proof's
/// account.
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<PublicUser>, ApiError> {
    let Some(token) = proof_from_headers(&headers) else {
        return Err(AuthError::Unauthenticated.into());
    };

    let patch = ProfilePatch { full_name: payload.full_name, profile_picture: payload.profile_picture };
    let user = auth::update_profile(&state.pool, &state.sessions, &token, patch).await?;
    Ok(Json(user))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
