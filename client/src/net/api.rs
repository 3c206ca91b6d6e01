//! REST transport for the auth server.
//!
//! The store talks to the server through the [`AuthApi`] trait so tests can
//! substitute an in-memory fake; [`HttpAuthApi`] is the real reqwest-backed
//! implementation. The session proof travels in the `session_token` cookie
//! header and is captured from `Set-Cookie` on signup/login.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use reqwest::header;

use super::types::{AuthSession, ErrorBody, LoginRequest, ProfilePatch, SignupRequest, User};

const COOKIE_NAME: &str = "session_token";

/// Transport failure surfaced to the store.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a typed error body.
    #[error("{message}")]
    Server { kind: String, message: String },
    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Machine-readable kind: the server's `error` field, or `"network"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Server { kind, .. } => kind,
            Self::Network(_) => "network",
        }
    }

    /// Human-readable message for display.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// The auth server's surface, as the client store sees it.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, ApiError>;
    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError>;
    async fn check(&self, token: &str) -> Result<User, ApiError>;
    async fn logout(&self, token: &str) -> Result<(), ApiError>;
    async fn update_profile(&self, token: &str, patch: &ProfilePatch) -> Result<User, ApiError>;
}

fn auth_endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn cookie_header(token: &str) -> String {
    format!("{COOKIE_NAME}={token}")
}

fn token_from_set_cookie(value: &str) -> Option<String> {
    let rest = value.strip_prefix(COOKIE_NAME)?.strip_prefix('=')?;
    let token = rest.split(';').next().unwrap_or_default().trim();
    if token.is_empty() { None } else { Some(token.to_owned()) }
}

fn request_failed_message(what: &str, status: u16) -> String {
    format!("{what} failed: {status}")
}

async fn error_from(what: &str, resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    match resp.json::<ErrorBody>().await {
        Ok(body) => ApiError::Server { kind: body.error, message: body.message },
        Err(_) => ApiError::Server {
            kind: "http".to_owned(),
            message: request_failed_message(what, status),
        },
    }
}

fn session_token_from(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .find_map(|v| v.to_str().ok().and_then(token_from_set_cookie))
}

/// reqwest-backed [`AuthApi`] implementation.
pub struct HttpAuthApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    fn endpoint(&self, path: &str) -> String {
        auth_endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("/api/auth/signup"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from("signup", resp).await);
        }

        let Some(token) = session_token_from(&resp) else {
            return Err(ApiError::Server {
                kind: "http".to_owned(),
                message: "signup response carried no session proof".to_owned(),
            });
        };
        let user = resp.json::<User>().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(AuthSession { user, token })
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("/api/auth/login"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from("login", resp).await);
        }

        let Some(token) = session_token_from(&resp) else {
            return Err(ApiError::Server {
                kind: "http".to_owned(),
                message: "login response carried no session proof".to_owned(),
            });
        };
        let user = resp.json::<User>().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(AuthSession { user, token })
    }

    async fn check(&self, token: &str) -> Result<User, ApiError> {
        let resp = self
            .http
            .get(self.endpoint("/api/auth/check"))
            .header(header::COOKIE, cookie_header(token))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from("session check", resp).await);
        }
        resp.json::<User>().await.map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint("/api/auth/logout"))
            .header(header::COOKIE, cookie_header(token))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from("logout", resp).await);
        }
        Ok(())
    }

    async fn update_profile(&self, token: &str, patch: &ProfilePatch) -> Result<User, ApiError> {
        let resp = self
            .http
            .put(self.endpoint("/api/auth/update-profile"))
            .header(header::COOKIE, cookie_header(token))
            .json(patch)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(error_from("profile update", resp).await);
        }
        resp.json::<User>().await.map_err(|e| ApiError::Network(e.to_string()))
    }
}
