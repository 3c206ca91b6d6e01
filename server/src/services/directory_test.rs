use super::*;

#[cfg(feature = "live-db-tests")]
use sqlx::postgres::PgPoolOptions;

// =============================================================================
// canonical_email
// =============================================================================

#[test]
fn canonical_email_lowercases_and_trims() {
    assert_eq!(canonical_email("  USER@Example.COM "), "user@example.com");
}

#[test]
fn canonical_email_leaves_canonical_input_alone() {
    assert_eq!(canonical_email("user@example.com"), "user@example.com");
}

// =============================================================================
// directory operations — require a live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
async fn live_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for live-db-tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("database connect failed");
    sqlx::migrate!("src/db/migrations").run(&pool).await.expect("migrations failed");
    pool
}

#[cfg(feature = "live-db-tests")]
fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4())
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn create_assigns_id_and_created_at() {
    let pool = live_pool().await;
    let email = unique_email();
    let account = create(&pool, &email, "Ada Lovelace", "phc-secret")
        .await
        .expect("create should succeed");

    assert_eq!(account.email, email);
    assert_eq!(account.full_name, "Ada Lovelace");
    assert_eq!(account.password_secret, "phc-secret");
    assert!(account.profile_picture.is_none());
    assert_eq!(account.created_at.len(), "2026-01-01".len());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn duplicate_email_rejected_case_insensitively() {
    let pool = live_pool().await;
    let email = unique_email();

    create(&pool, &email, "First", "secret-a").await.expect("first create");
    let second = create(&pool, &email.to_ascii_uppercase(), "Second", "secret-b").await;
    assert!(matches!(second, Err(DirectoryError::DuplicateEmail)));

    // Still exactly one record for that email.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("count query");
    assert_eq!(count, 1);
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn find_by_email_is_case_insensitive() {
    let pool = live_pool().await;
    let email = unique_email();
    let created = create(&pool, &email, "Finder", "secret").await.expect("create");

    let found = find_by_email(&pool, &email.to_ascii_uppercase())
        .await
        .expect("query")
        .expect("account should exist");
    assert_eq!(found.id, created.id);

    assert!(find_by_email(&pool, &unique_email()).await.expect("query").is_none());
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn update_profile_is_partial() {
    let pool = live_pool().await;
    let created = create(&pool, &unique_email(), "Before", "secret").await.expect("create");

    let patch = ProfilePatch { full_name: Some("After".to_owned()), profile_picture: None };
    let updated = update_profile(&pool, created.id, &patch).await.expect("update");
    assert_eq!(updated.full_name, "After");
    assert!(updated.profile_picture.is_none());

    let patch = ProfilePatch { full_name: None, profile_picture: Some("data:image/png;base64,xyz".to_owned()) };
    let updated = update_profile(&pool, created.id, &patch).await.expect("update");
    assert_eq!(updated.full_name, "After");
    assert_eq!(updated.profile_picture.as_deref(), Some("data:image/png;base64,xyz"));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn update_profile_never_touches_email_or_secret() {
    let pool = live_pool().await;
    let created = create(&pool, &unique_email(), "Keep Me", "phc-secret").await.expect("create");

    let patch = ProfilePatch { full_name: Some("Renamed".to_owned()), profile_picture: None };
    update_profile(&pool, created.id, &patch).await.expect("update");

    let reloaded = find_by_id(&pool, created.id)
        .await
        .expect("query")
        .expect("account should exist");
    assert_eq!(reloaded.email, created.email);
    assert_eq!(reloaded.password_secret, created.password_secret);
    assert_eq!(reloaded.created_at, created.created_at);
    assert_eq!(reloaded.full_name, "Renamed");
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn update_profile_unknown_id_is_not_found() {
    let pool = live_pool().await;
    let patch = ProfilePatch { full_name: Some("Ghost".to_owned()), profile_picture: None };
    let result = update_profile(&pool, Uuid::new_v4(), &patch).await;
    assert!(matches!(result, Err(DirectoryError::NotFound)));
}
