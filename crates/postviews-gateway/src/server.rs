//! Axum-based HTTP server.
//!
//! [`GatewayServer`] wires the content store, the per-IP limiter and the
//! handlers into a running axum service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness check, always `200 OK`. |
//! | `POST` | `/api/increment-views` | Count one view of a post. |
//! | `GET`  | `/api/popular-posts` | Most-viewed published posts. |
//! | `POST` | `/api/debug-views` | Seed random counters (debug builds of the config only). |

use crate::backend::{MemoryStore, SanityStore};
use crate::config::{GatewayConfig, StoreKind};
use crate::counter::ViewCounter;
use crate::handlers::{debug_router, health_router, popular_router, views_router};
use crate::middleware::{IpRateLimiter, security_headers};
use crate::state::AppState;
use axum::Router;
use axum::middleware::from_fn;
use postviews_kernel::{Clock, ContentStore, PostId, StoreError, SystemClock};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Assemble the full route tree around `state`.
///
/// Every `/api/*` response carries the hardening headers, 404s included;
/// `/health` does not.
pub fn build_router(state: Arc<AppState>, debug_routes: bool) -> Router {
    let mut app = views_router()
        .merge(popular_router())
        .merge(health_router());
    if debug_routes {
        app = app.merge(debug_router());
    }

    app.layer(from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayServer
// ─────────────────────────────────────────────────────────────────────────────

/// High-level server owning the loaded [`GatewayConfig`].
pub struct GatewayServer {
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Instantiate the configured [`ContentStore`].
    pub fn build_store(&self) -> Result<Arc<dyn ContentStore>, StoreError> {
        match self.config.store {
            StoreKind::Sanity => {
                if self.config.sanity.write_token.is_none() {
                    warn!("no Sanity write token configured, increments will fail");
                }
                Ok(Arc::new(SanityStore::new(&self.config.sanity)?))
            }
            StoreKind::Memory => {
                let store = MemoryStore::new();
                for raw in &self.config.memory_seed {
                    match PostId::parse(raw) {
                        Ok(id) => store.insert(id, None),
                        Err(e) => warn!(post_id = %raw, error = %e, "skipping memory seed"),
                    }
                }
                Ok(Arc::new(store))
            }
        }
    }

    /// Shared handler state over `store`, with rate-limit buckets read from
    /// `clock`.
    pub fn build_state(&self, store: Arc<dyn ContentStore>, clock: Arc<dyn Clock>) -> Arc<AppState> {
        let limits = &self.config.rate_limit;
        let limiter = IpRateLimiter::new(limits.max_requests, limits.window(), clock)
            .with_cleanup_threshold(limits.cleanup_threshold);
        let counter = ViewCounter::new(
            store.clone(),
            Arc::new(limiter),
            self.config.lookup_timeout(),
            self.config.view_ceiling,
        );
        Arc::new(AppState::new(Arc::new(counter), store))
    }

    /// Build the axum [`Router`] against the configured store and the system
    /// clock. Call [`start()`](Self::start) to bind and serve.
    pub fn build_app(&self) -> Result<Router, StoreError> {
        let store = self.build_store()?;
        let state = self.build_state(store, Arc::new(SystemClock));
        Ok(build_router(state, self.config.enable_debug_routes))
    }

    /// Bind to `0.0.0.0:{port}` and serve until SIGINT or SIGTERM.
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.build_app()?;
        let addr = format!("0.0.0.0:{}", self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(
            addr = %addr,
            store = ?self.config.store,
            debug_routes = self.config.enable_debug_routes,
            "postviews gateway starting"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("postviews gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
