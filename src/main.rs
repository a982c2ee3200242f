use dday_manager::{router, AppState, Config, JsonFileStore, Store};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let store = JsonFileStore::new(config.data_path.clone());
    let data = store.load().await;
    info!(
        path = %store.path().display(),
        events = data.events.len(),
        cart = data.cart.len(),
        "state loaded"
    );

    let addr = config.bind_address();
    let state = AppState::new(config, Arc::new(store), data);
    if !state.vision.is_configured() {
        warn!("OPENAI_API_KEY is not set; AI endpoints will answer with an error");
    }
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
