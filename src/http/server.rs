//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the echo stage
//! - Wire up middleware (tracing, trusted header gate)
//! - Serve plaintext or TLS with per-connection handshake capture
//! - Graceful shutdown on Ctrl+C

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::Request,
    response::{IntoResponse, Json},
    routing::any,
    Router,
};
use axum_server::Handle;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config::GateConfig;
use crate::gate::{GateDecision, RequestGate, TrustedHeadersLayer};
use crate::net::handshake::ConnectionContext;
use crate::net::tls::{load_acceptor, PlainAcceptor, TlsError};

/// Error type for server startup and operation.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind address `{0}`")]
    Address(String),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server fronted by the trusted header gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and gate.
    pub fn new(config: GateConfig, gate: RequestGate) -> Self {
        let router = build_router(gate);
        Self { router, config }
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|_| ServerError::Address(self.config.listener.bind_address.clone()))?;

        let handle = Handle::new();
        tokio::spawn(shutdown_signal(handle.clone()));

        let app = self.router.into_make_service();

        match &self.config.listener.tls {
            Some(tls) => {
                let acceptor = load_acceptor(tls)?;
                tracing::info!(address = %addr, client_auth = %tls.client_auth, "HTTPS server starting");
                axum_server::bind(addr)
                    .acceptor(acceptor)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::info!(address = %addr, "HTTP server starting");
                axum_server::bind(addr)
                    .acceptor(PlainAcceptor::new())
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(gate: RequestGate) -> Router {
    Router::new()
        .route("/", any(echo_handler))
        .route("/{*path}", any(echo_handler))
        .layer(TrustedHeadersLayer::new(gate))
        .layer(TraceLayer::new_for_http())
}

/// Next pipeline stage: reports what survived the gate.
async fn echo_handler(request: Request) -> impl IntoResponse {
    let decision = request
        .extensions()
        .get::<GateDecision>()
        .map(|d| d.as_str())
        .unwrap_or("none");
    let connection_id = request
        .extensions()
        .get::<ConnectionContext>()
        .map(|c| c.id().to_string());

    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in request.headers() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    Json(json!({
        "decision": decision,
        "connection_id": connection_id,
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "headers": headers,
    }))
}

/// Wait for shutdown signal (Ctrl+C), then drain connections.
async fn shutdown_signal(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
