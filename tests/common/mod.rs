//! Shared utilities for integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use trusted_headers::gate::{AllowWhen, HostBlacklist, RequestGate};
use trusted_headers::http::build_router;
use trusted_headers::net::{ClientAuth, ConnectionContext, HandshakeInfo};

/// Build the full router with a static blacklist.
pub fn router(allow_when: AllowWhen, blacklist: &[&str]) -> Router {
    let gate = RequestGate::new(allow_when, Arc::new(HostBlacklist::new(blacklist.iter().copied())));
    build_router(gate)
}

/// Connection context for a TLS connection with the given client-auth requirement.
pub fn tls_connection(client_auth: ClientAuth) -> ConnectionContext {
    ConnectionContext::with_handshake(HandshakeInfo::with_client_auth(client_auth))
}

/// A request carrying every kind of proxy header, as seen on `conn`.
pub fn spoofed_request(host: &str, conn: Option<ConnectionContext>) -> Request<Body> {
    let mut req = Request::builder()
        .uri("/api/v1")
        .header("Host", host)
        .header("x-forwarded-for", "10.0.0.1")
        .header("x-forwarded-for", "10.0.0.2")
        .header("x-forwarded-port", "443")
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-proto-version", "HTTP/2")
        .header("x-real-ip", "10.0.0.1")
        .header("user-agent", "curl/8.0")
        .body(Body::empty())
        .unwrap();
    if let Some(conn) = conn {
        req.extensions_mut().insert(conn);
    }
    req
}

/// Send one request through the router and return the echoed JSON.
#[allow(dead_code)]
pub async fn echo(app: Router, req: Request<Body>) -> Value {
    let res = app.oneshot(req).await.unwrap();
    assert!(res.status().is_success());
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub const PROXY_HEADER_NAMES: [&str; 5] = [
    "x-forwarded-for",
    "x-forwarded-port",
    "x-forwarded-proto",
    "x-forwarded-proto-version",
    "x-real-ip",
];

/// True if none of the proxy headers reached the echo stage.
pub fn all_stripped(echoed: &Value) -> bool {
    PROXY_HEADER_NAMES
        .iter()
        .all(|name| echoed["headers"].get(*name).is_none())
}

/// True if every proxy header reached the echo stage with all its values.
pub fn all_intact(echoed: &Value) -> bool {
    PROXY_HEADER_NAMES
        .iter()
        .all(|name| echoed["headers"].get(*name).is_some())
        && echoed["headers"]["x-forwarded-for"].as_array().map(Vec::len) == Some(2)
}
