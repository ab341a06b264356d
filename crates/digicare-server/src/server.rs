use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use digicare_card::bundle::BundleAssembler;
use digicare_card::service::CardService;
use digicare_card::storage::SessionStorage;
use digicare_card::verifier::ScanVerifier;

use crate::{config::AppConfig, handlers};

/// Shared handler state. Everything is behind an `Arc`, so cloning per
/// request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CardService>,
    pub verifier: Arc<ScanVerifier>,
    pub sessions: Arc<dyn SessionStorage>,
    pub assembler: Arc<BundleAssembler>,
}

pub struct DigicareServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        // Public scan path
        .route("/health-card/scan/{access_token}", get(handlers::scan_card))
        // Owner routes (bearer session)
        .route("/health-card/me", get(handlers::my_card))
        .route("/health-card/regenerate-qr", post(handlers::regenerate_qr))
        .route("/health-card/set-pin", post(handlers::set_pin))
        .route("/health-card/remove-pin", delete(handlers::remove_pin))
        .route("/health-card/scan-history", get(handlers::scan_history))
        .route("/health-card/download", get(handlers::download_records))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Covers the whole request, body read included.
        .layer(TimeoutLayer::new(cfg.request_timeout()))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    state: Option<AppState>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            state: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn build(self) -> anyhow::Result<DigicareServer> {
        let state = self
            .state
            .ok_or_else(|| anyhow::anyhow!("server state not configured"))?;
        let app = build_app(&self.config, state);
        Ok(DigicareServer {
            addr: self.addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DigicareServer {
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
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
