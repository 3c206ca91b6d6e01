//! Auth service — registration, login, logout, session check, profile update.
//!
//! SYSTEM CONTEXT
//! ==============
//! Orchestrates the credential hasher, the account directory, and the session
//! layer. Owns the error taxonomy the HTTP surface renders; hashing and
//! session internals never leak past this boundary.

use sqlx::PgPool;
use uuid::Uuid;

use crate::services::directory::{self, Account, DirectoryError, ProfilePatch};
use crate::services::password;
use crate::services::session::{self, SessionConfig, SessionError};

/// Served to clients whose account has no stored picture.
pub const DEFAULT_AVATAR: &str = "/avatar.png";

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("an account with that email already exists")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("account not found")]
    NotFound,
    #[error("credential hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail => Self::DuplicateEmail,
            DirectoryError::NotFound => Self::NotFound,
            DirectoryError::Db(e) => Self::Db(e),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Db(e) => Self::Db(e),
            // Invalid vs Expired is session-layer detail; callers of this
            // service only learn that authentication is required.
            SessionError::Invalid | SessionError::Expired => Self::Unauthenticated,
        }
    }
}

/// Public projection of an account. Never carries the password secret.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub profile_picture: String,
    pub created_at: String,
}

impl From<Account> for PublicUser {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            full_name: account.full_name,
            profile_picture: account
                .profile_picture
                .unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
            created_at: account.created_at,
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.contains(char::is_whitespace) {
        return None;
    }
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }
    let (host, tld) = domain.rsplit_once('.')?;
    if host.is_empty() || tld.is_empty() {
        return None;
    }
    Some(normalized)
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::Validation("Email is required".to_owned()));
    }
    normalize_email(email)
        .ok_or_else(|| AuthError::Validation("Please enter a valid email".to_owned()))
}

fn validate_full_name(full_name: &str) -> Result<String, AuthError> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation("Full name is required".to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_owned()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters".to_owned(),
        ));
    }
    Ok(())
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Register a new account and mint its first session proof.
///
/// Validation runs before the directory is touched.
///
/// # Errors
///
/// `Validation`, `DuplicateEmail`, or the infrastructure variants.
pub async fn register(
    pool: &PgPool,
    sessions: &SessionConfig,
    email: &str,
    full_name: &str,
    password: &str,
) -> Result<(PublicUser, String), AuthError> {
    let email = validate_email(email)?;
    let full_name = validate_full_name(full_name)?;
    validate_password(password)?;

    let secret = password::hash_password(password).map_err(|e| AuthError::Hash(e.to_string()))?;
    let account = directory::create(pool, &email, &full_name, &secret).await?;
    let token = sessions.issue(account.id);

    tracing::info!(account_id = %account.id, "account registered");
    Ok((account.into(), token))
}

/// Verify credentials and mint a session proof.
///
/// # Errors
///
/// Unknown email and wrong password both fail with the same
/// `InvalidCredentials`; the caller learns nothing about which branch fired.
pub async fn login(
    pool: &PgPool,
    sessions: &SessionConfig,
    email: &str,
    password: &str,
) -> Result<(PublicUser, String), AuthError> {
    let Some(account) = directory::find_by_email(pool, email).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if !password::verify_password(password, &account.password_secret) {
        return Err(AuthError::InvalidCredentials);
    }

    let token = sessions.issue(account.id);
    tracing::info!(account_id = %account.id, "login succeeded");
    Ok((account.into(), token))
}

/// Revoke a session proof. Idempotent; revoking an invalid proof succeeds.
///
/// # Errors
///
/// Only infrastructure failures surface.
pub async fn logout(
    pool: &PgPool,
    sessions: &SessionConfig,
    token: &str,
) -> Result<(), AuthError> {
    session::revoke(pool, sessions, token).await?;
    Ok(())
}

/// Resolve a session proof to the account it names.
///
/// # Errors
///
/// `Unauthenticated` if the proof fails validation or the account is gone.
pub async fn check_session(
    pool: &PgPool,
    sessions: &SessionConfig,
    token: &str,
) -> Result<PublicUser, AuthError> {
    let account_id = session::validate(pool, sessions, token).await?;
    let account = directory::find_by_id(pool, account_id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;
    Ok(account.into())
}

/// Apply a partial profile update on behalf of the proof's account.
///
/// # Errors
///
/// `Unauthenticated` for a bad proof, `Validation` for an empty name,
/// `NotFound` if the account vanished out from under a valid proof.
pub async fn update_profile(
    pool: &PgPool,
    sessions: &SessionConfig,
    token: &str,
    mut patch: ProfilePatch,
) -> Result<PublicUser, AuthError> {
    let account_id = session::validate(pool, sessions, token).await?;

    if let Some(name) = patch.full_name.take() {
        patch.full_name = Some(validate_full_name(&name)?);
    }

    let account = directory::update_profile(pool, account_id, &patch)
        .await
        .map_err(|e| {
            if matches!(e, DirectoryError::NotFound) {
                tracing::warn!(%account_id, "valid session proof for a missing account");
            }
            AuthError::from(e)
        })?;
    Ok(account.into())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
