use anyhow::Context;
use readmesmith::{
    api::{self, AppState, GENERATE_PATH},
    config::env_manager::GEMINI_API_KEY_VAR,
    logging, Config, ReadmeService,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing("info,tower_http=debug")?;

    let config = Config::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    let addr = config.bind_addr()?;

    if !config.api_keys.has_gemini_key() {
        warn!(
            "{} is not set; {} will answer with a configuration error",
            GEMINI_API_KEY_VAR, GENERATE_PATH
        );
    }

    info!("readmesmith server starting...");
    info!("Model: {}", config.gemini.model);
    info!("Working directories under {}", config.temp_root().display());

    let service = ReadmeService::from_config(config)?;
    let app = api::router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
