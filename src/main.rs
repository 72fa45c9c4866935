mod config;
mod error;
mod fixtures;
mod latency;
mod models;
mod record;
mod routes;
mod services;
mod state;
mod store;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ppc_hub=info,tower_http=info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "ppc-hub failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::AppConfig::from_env()?;
    let backend = config.backend.kind().as_str();
    let state = state::AppState::from_config(&config).await?;
    tracing::info!(backend, latency = ?config.latency, "collections ready");

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "ppc-hub listening");
    axum::serve(listener, app).await?;
    Ok(())
}
