//! Gateway entry point.

use anyhow::Result;
use mssql_gateway::{http, AppState, Config};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    info!("MSSQL Gateway v{version} starting");

    let config = Config::from_env()?;
    info!(
        servers = config.catalog.servers.len(),
        credentials = config.credentials.len(),
        project = %config.catalog.project,
        "configuration loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config);
    let app = http::router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(address = %bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize the tracing subscriber from `RUST_LOG`.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("info,mssql_gateway=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
