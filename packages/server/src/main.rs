//! Care Resource Hub API server
//!
//! ```bash
//! cargo run -p carehub-server
//! RUST_LOG=carehub_server=debug,tower_http=debug cargo run -p carehub-server
//! ```

use carehub_server::{start_server, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("🔧 Starting Care Resource Hub API on {}", config.addr());

    let state = AppState::from_config(&config).await;
    start_server(state, &config).await
}
