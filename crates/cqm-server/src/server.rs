use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers;
use crate::registry::MeasureRegistry;

pub struct CqmServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(registry: Arc<MeasureRegistry>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/measures", get(handlers::list_measures))
        .route("/api/measures/{measure_id}", get(handlers::get_measure))
        .route("/api/measures/evaluate", post(handlers::evaluate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    registry: Arc<MeasureRegistry>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            addr: AppConfig::default().addr(),
            registry: Arc::new(MeasureRegistry::new()),
        }
    }

    pub fn with_config(mut self, cfg: &AppConfig) -> Self {
        self.addr = cfg.addr();
        self
    }

    pub fn with_registry(mut self, registry: Arc<MeasureRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn build(self) -> CqmServer {
        CqmServer {
            addr: self.addr,
            app: build_app(self.registry),
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CqmServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
