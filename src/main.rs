use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lecturemark::api::router;
use lecturemark::config::AppConfig;
use lecturemark::player::NoopVideoPlayer;
use lecturemark::render::MarkdownRenderer;
use lecturemark::state::AppState;
use lecturemark::store::seed::initial_store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lecturemark=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let store = initial_store(&config)?;

    let state = AppState::new(store, Arc::new(NoopVideoPlayer), Arc::new(MarkdownRenderer));

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
