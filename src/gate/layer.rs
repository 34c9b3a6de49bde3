//! Tower middleware running the gate in front of the next pipeline stage.

use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::gate::handler::RequestGate;
use crate::net::handshake::ConnectionContext;

/// Layer that applies [`TrustedHeaders`] to every request.
#[derive(Debug, Clone)]
pub struct TrustedHeadersLayer {
    gate: RequestGate,
}

impl TrustedHeadersLayer {
    pub fn new(gate: RequestGate) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for TrustedHeadersLayer {
    type Service = TrustedHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TrustedHeaders {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Middleware that strips untrusted proxy headers before calling the inner service.
///
/// The connection is read from the request's [`ConnectionContext`] extension;
/// the resulting [`GateDecision`](crate::gate::GateDecision) is left in the
/// request extensions for later stages.
#[derive(Debug, Clone)]
pub struct TrustedHeaders<S> {
    inner: S,
    gate: RequestGate,
}

impl<S, B> Service<Request<B>> for TrustedHeaders<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let conn = req.extensions().get::<ConnectionContext>().cloned();
        let decision = self.gate.process(conn.as_ref(), &mut req);
        req.extensions_mut().insert(decision);
        self.inner.call(req)
    }
}
