mod db;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let sessions = services::session::SessionConfig::from_env().expect("SESSION_SECRET required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::connect(&database_url)
        .await
        .expect("database init failed");
    tracing::info!("database connected");

    let state = state::AppState::new(pool, sessions);

    // Spawn the hourly revocation-list purge.
    let _purge = services::session::spawn_purge_task(state.pool.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "converse auth listening");
    axum::serve(listener, app).await.expect("server failed");
}
