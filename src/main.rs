//! quran-roots HTTP API

use quran_roots::{api, AppState, Config};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quran_roots=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(db = ?config.db_path, "Loading corpus");

    // The corpus must be fully loaded before any query is accepted
    let state = Arc::new(AppState::new(&config)?);

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
