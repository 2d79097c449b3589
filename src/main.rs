use std::env;
use std::path::Path;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use gantry_backend::core::config::AppConfig;
use gantry_backend::core::logging;
use gantry_backend::server::router::router;
use gantry_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(Path::new("gantry.toml"))
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    logging::init(&config.log_dir);

    let state = AppState::new(config);

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(0);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("GANTRY_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
