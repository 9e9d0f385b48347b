use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ezelectronics_carts::{app, connect, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let db = connect(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %listener.local_addr()?, "Running");

    axum::serve(listener, app(Arc::new(db), Arc::new(config))).await?;
    Ok(())
}
