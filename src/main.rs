use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learnwa::api::{cors_layer, router};
use learnwa::config::AppConfig;
use learnwa::db;
use learnwa::services::seed_if_empty;
use learnwa::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "learnwa=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections, config.busy_timeout).await?;

    let state = AppState::new(pool);

    if let Some(seed_file) = &config.seed_file {
        seed_if_empty(&state.catalog, seed_file).await?;
    }

    let app = router(state).layer(cors_layer(&config.cors_origins));

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
