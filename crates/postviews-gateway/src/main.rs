//! postviews gateway entry point.
//!
//! Loads [`GatewayConfig`] from `POSTVIEWS_CONFIG` and `POSTVIEWS_*`
//! environment variables (see the `config` module) and serves until SIGINT or
//! SIGTERM. Log verbosity follows `RUST_LOG`.

use postviews_gateway::config::GatewayConfig;
use postviews_gateway::server::GatewayServer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("postviews_gateway=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match GatewayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    info!(
        port = config.port,
        store = ?config.store,
        rate_limit = ?config.rate_limit,
        "postviews gateway configuration loaded"
    );

    GatewayServer::new(config).start().await
}
