use tracing_subscriber::EnvFilter;

use healthcare_api_rust::database::Database;
use healthcare_api_rust::{app, config, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Healthcare API in {:?} mode", config.environment);

    let db = Database::connect(&config.database.url)
        .await
        .unwrap_or_else(|e| panic!("failed to open database {}: {}", config.database.url, e));
    db.init_schema().await.expect("database schema initialization");

    let state = AppState { db };
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("HEALTHCARE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Healthcare Backend Server running on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
