use postviews_gateway::config::{GatewayConfig, StoreKind};
use postviews_gateway::server::{GatewayServer, build_router};
use postviews_kernel::{ContentStore, ManualClock};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A gateway served on `127.0.0.1` for the lifetime of the value.
///
/// Rate-limit buckets follow [`TestGateway::clock`], which starts at zero.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub clock: ManualClock,
    handle: JoinHandle<()>,
}

impl TestGateway {
    /// Memory-store config with every other setting at its default.
    pub fn config() -> GatewayConfig {
        GatewayConfig {
            store: StoreKind::Memory,
            ..GatewayConfig::default()
        }
    }

    pub async fn spawn(store: Arc<dyn ContentStore>) -> anyhow::Result<Self> {
        Self::spawn_with(store, Self::config()).await
    }

    pub async fn spawn_with(
        store: Arc<dyn ContentStore>,
        config: GatewayConfig,
    ) -> anyhow::Result<Self> {
        let clock = ManualClock::new(0);
        let debug_routes = config.enable_debug_routes;
        let server = GatewayServer::new(config);
        let state = server.build_state(store, Arc::new(clock.clone()));
        let app = build_router(state, debug_routes);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "test gateway stopped");
            }
        });

        Ok(Self {
            addr,
            clock,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
