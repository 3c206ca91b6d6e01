//! Account directory — persistence and lookup for identity records.
//!
//! Emails are canonicalized to lowercase before they touch the database, and
//! the `accounts_email_key` unique index is the single authority for
//! registration conflicts: concurrent creates race on the constraint, not on
//! service-level locking.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("an account with that email already exists")]
    DuplicateEmail,
    #[error("no account with that id")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Full account record. `password_secret` never leaves the service layer.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_secret: String,
    pub profile_picture: Option<String>,
    /// Creation date projected as `YYYY-MM-DD`.
    pub created_at: String,
}

/// Partial profile update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
}

pub(crate) fn canonical_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn row_to_account(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        password_secret: row.get("password_secret"),
        profile_picture: row.get("profile_picture"),
        created_at: row.get("created_at"),
    }
}

/// Create an account, assigning its id and creation timestamp.
///
/// # Errors
///
/// `DuplicateEmail` if the canonical email is already taken; `Db` otherwise.
pub async fn create(
    pool: &PgPool,
    email: &str,
    full_name: &str,
    password_secret: &str,
) -> Result<Account, DirectoryError> {
    let row = sqlx::query(
        r"INSERT INTO accounts (email, full_name, password_secret)
          VALUES ($1, $2, $3)
          RETURNING id, email, full_name, password_secret, profile_picture,
                    to_char(created_at, 'YYYY-MM-DD') AS created_at",
    )
    .bind(canonical_email(email))
    .bind(full_name)
    .bind(password_secret)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            DirectoryError::DuplicateEmail
        } else {
            DirectoryError::Db(e)
        }
    })?;

    Ok(row_to_account(&row))
}

/// Look up an account by email, case-insensitively.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT id, email, full_name, password_secret, profile_picture,
                 to_char(created_at, 'YYYY-MM-DD') AS created_at
          FROM accounts WHERE email = $1",
    )
    .bind(canonical_email(email))
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_account))
}

/// Look up an account by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT id, email, full_name, password_secret, profile_picture,
                 to_char(created_at, 'YYYY-MM-DD') AS created_at
          FROM accounts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_account))
}

/// Apply a partial profile update. Email and password are not reachable
/// through this path.
///
/// # Errors
///
/// `NotFound` if the id names no account; `Db` otherwise.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    patch: &ProfilePatch,
) -> Result<Account, DirectoryError> {
    let row = sqlx::query(
        r"UPDATE accounts
          SET full_name = COALESCE($2, full_name),
              profile_picture = COALESCE($3, profile_picture)
          WHERE id = $1
          RETURNING id, email, full_name, password_secret, profile_picture,
                    to_char(created_at, 'YYYY-MM-DD') AS created_at",
    )
    .bind(id)
    .bind(patch.full_name.as_deref())
    .bind(patch.profile_picture.as_deref())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_account).ok_or(DirectoryError::NotFound)
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
