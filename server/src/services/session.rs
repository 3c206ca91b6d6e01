//! Session proof issuance, verification, and revocation.
//!
//! ARCHITECTURE
//! ============
//! A proof is `base64(claims).base64(hmac-sha256(claims))` signed with the
//! process-wide session secret, so any bit flip fails verification
//! deterministically. Logout is enforced server-side: revoked proofs are
//! recorded by digest until their natural expiry and rejected on validation.
//!
//! TRADE-OFFS
//! ==========
//! Signed proofs keep per-request validation free of a session table lookup
//! for the happy path's signature/expiry checks; the revocation list is the
//! one piece of server state, and it is bounded by the TTL.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_TTL_DAYS: i64 = 7;
const PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("malformed or tampered session proof")]
    Invalid,
    #[error("session proof past its expiry")]
    Expired,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Signing secret and time-to-live for issued proofs.
#[derive(Clone)]
pub struct SessionConfig {
    secret: String,
    ttl: Duration,
}

impl SessionConfig {
    #[must_use]
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        Self { secret: secret.into(), ttl: Duration::days(ttl_days) }
    }

    /// Load from `SESSION_SECRET` and optional `SESSION_TTL_DAYS`.
    /// Returns `None` if the secret is missing or empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let secret = std::env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty())?;
        let ttl_days = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TTL_DAYS);
        Some(Self::new(secret, ttl_days))
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a proof for the given account, expiring one TTL from now.
    #[must_use]
    pub fn issue(&self, account_id: Uuid) -> String {
        self.issue_at(account_id, OffsetDateTime::now_utc().unix_timestamp())
    }

    fn issue_at(&self, account_id: Uuid, issued_at: i64) -> String {
        let claims = Claims {
            sub: account_id,
            iat: issued_at,
            exp: issued_at + self.ttl.whole_seconds(),
        };
        let claims_json = serde_json::to_vec(&claims).expect("claims are always serializable");
        let payload = URL_SAFE_NO_PAD.encode(claims_json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&payload));
        format!("{payload}.{signature}")
    }

    /// Check signature and expiry, returning the account id the proof names.
    ///
    /// # Errors
    ///
    /// `Invalid` for anything that does not carry a valid signature over
    /// well-formed claims; `Expired` for a genuine proof past its TTL.
    pub fn verify(&self, token: &str) -> Result<Uuid, SessionError> {
        let claims = self.decode(token)?;
        if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(SessionError::Expired);
        }
        Ok(claims.sub)
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.as_bytes()).expect("hmac accepts keys of any length")
    }

    fn decode(&self, token: &str) -> Result<Claims, SessionError> {
        let Some((payload, signature)) = token.split_once('.') else {
            return Err(SessionError::Invalid);
        };
        let Ok(sig_bytes) = URL_SAFE_NO_PAD.decode(signature) else {
            return Err(SessionError::Invalid);
        };

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        if mac.verify_slice(&sig_bytes).is_err() {
            return Err(SessionError::Invalid);
        }

        let Ok(claims_json) = URL_SAFE_NO_PAD.decode(payload) else {
            return Err(SessionError::Invalid);
        };
        serde_json::from_slice(&claims_json).map_err(|_| SessionError::Invalid)
    }
}

fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

/// Record a proof as revoked until its natural expiry.
///
/// Idempotent: revoking an already-revoked, malformed, or expired proof is a
/// no-op success.
///
/// # Errors
///
/// Returns an error only if the revocation insert itself fails.
pub async fn revoke(pool: &PgPool, config: &SessionConfig, token: &str) -> Result<(), sqlx::Error> {
    let Ok(claims) = config.decode(token) else {
        return Ok(());
    };
    if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
        return Ok(());
    }

    sqlx::query(
        r"INSERT INTO revoked_sessions (token_digest, expires_at)
          VALUES ($1, to_timestamp($2::double precision))
          ON CONFLICT (token_digest) DO NOTHING",
    )
    .bind(token_digest(token))
    .bind(claims.exp)
    .execute(pool)
    .await?;
    Ok(())
}

/// Full validation: signature, expiry, then the revocation list.
///
/// # Errors
///
/// `Invalid` / `Expired` as [`SessionConfig::verify`]; a revoked proof is
/// `Invalid`; `Db` if the revocation lookup fails.
pub async fn validate(pool: &PgPool, config: &SessionConfig, token: &str) -> Result<Uuid, SessionError> {
    let account_id = config.verify(token)?;

    let revoked: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_sessions WHERE token_digest = $1)")
            .bind(token_digest(token))
            .fetch_one(pool)
            .await?;
    if revoked {
        return Err(SessionError::Invalid);
    }

    Ok(account_id)
}

/// Delete revocation rows whose proofs have expired on their own.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM revoked_sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Spawn the hourly revocation-list purge task.
pub fn spawn_purge_task(pool: PgPool) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match purge_expired(&pool).await {
                Ok(0) => {}
                Ok(rows) => tracing::debug!(rows, "purged expired revocations"),
                Err(e) => tracing::warn!(error = %e, "revocation purge failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
