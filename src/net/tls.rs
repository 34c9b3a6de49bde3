//! TLS configuration, certificate loading and handshake capture.
//!
//! # Responsibilities
//! - Build a rustls server config with the configured client-auth requirement
//! - Record handshake facts once per accepted connection
//! - Attach a [`ConnectionContext`] to every request on that connection

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use axum::middleware::AddExtension;
use axum::Extension;
use axum_server::accept::{Accept, DefaultAcceptor};
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use futures_util::future::BoxFuture;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, ServerConnection};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower::Layer;

use crate::config::TlsConfig;
use crate::net::handshake::{ClientAuth, ConnectionContext, HandshakeInfo};

/// Error building the TLS server configuration.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("no certificates found in {0}")]
    NoCertificates(String),

    #[error("no private key found in {0}")]
    NoPrivateKey(String),

    #[error("client_auth = \"{0}\" requires client_ca_path")]
    MissingClientCa(ClientAuth),

    #[error("invalid client CA: {0}")]
    ClientVerifier(String),

    #[error(transparent)]
    Rustls(#[from] rustls::Error),
}

fn open(path: &str) -> Result<BufReader<File>, TlsError> {
    File::open(path).map(BufReader::new).map_err(|source| TlsError::Io {
        path: path.to_string(),
        source,
    })
}

fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: path.to_string(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_string()));
    }
    Ok(certs)
}

fn load_key(path: &str) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Io {
            path: path.to_string(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_string()))
}

fn load_roots(path: &str) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();
    for cert in load_certs(path)? {
        roots.add(cert)?;
    }
    Ok(roots)
}

/// Build the rustls server config for the listener.
pub fn build_server_config(tls: &TlsConfig) -> Result<ServerConfig, TlsError> {
    let certs = load_certs(&tls.cert_path)?;
    let key = load_key(&tls.key_path)?;

    let builder = ServerConfig::builder();
    let builder = match tls.client_auth {
        ClientAuth::None => builder.with_no_client_auth(),
        ClientAuth::Optional | ClientAuth::Require => {
            let ca_path = tls
                .client_ca_path
                .as_deref()
                .ok_or(TlsError::MissingClientCa(tls.client_auth))?;
            let roots = Arc::new(load_roots(ca_path)?);

            let verifier = WebPkiClientVerifier::builder(roots);
            let verifier = if tls.client_auth == ClientAuth::Optional {
                verifier.allow_unauthenticated()
            } else {
                verifier
            };
            let verifier = verifier
                .build()
                .map_err(|e| TlsError::ClientVerifier(e.to_string()))?;
            builder.with_client_cert_verifier(verifier)
        }
    };

    let mut config = builder.with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(config)
}

/// Load TLS configuration and wrap it in an acceptor that records handshakes.
pub fn load_acceptor(tls: &TlsConfig) -> Result<HandshakeAcceptor, TlsError> {
    for path in [&tls.cert_path, &tls.key_path] {
        if !Path::new(path).exists() {
            return Err(TlsError::Io {
                path: path.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
            });
        }
    }

    let config = build_server_config(tls)?;
    tracing::info!(client_auth = %tls.client_auth, "TLS configuration loaded");

    Ok(HandshakeAcceptor::new(
        RustlsConfig::from_config(Arc::new(config)),
        tls.client_auth,
    ))
}

/// Snapshot the facts of a completed server-side handshake.
pub fn handshake_info(client_auth: ClientAuth, session: &ServerConnection) -> HandshakeInfo {
    HandshakeInfo {
        client_auth,
        protocol: session.protocol_version().map(|v| format!("{v:?}")),
        cipher: session
            .negotiated_cipher_suite()
            .map(|s| format!("{:?}", s.suite())),
        peer_certificate: session.peer_certificates().is_some_and(|c| !c.is_empty()),
    }
}

/// TLS acceptor that attaches the handshake facts to each connection's requests.
#[derive(Clone)]
pub struct HandshakeAcceptor {
    inner: RustlsAcceptor,
    client_auth: ClientAuth,
}

impl HandshakeAcceptor {
    pub fn new(config: RustlsConfig, client_auth: ClientAuth) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
            client_auth,
        }
    }
}

impl<I, S> Accept<I, S> for HandshakeAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, ConnectionContext>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();
        let client_auth = self.client_auth;

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let (_, session) = stream.get_ref();
            let info = handshake_info(client_auth, session);
            let ctx = ConnectionContext::with_handshake(info);

            tracing::debug!(
                connection_id = %ctx.id(),
                client_auth = %client_auth,
                protocol = ?ctx.handshake().and_then(|h| h.protocol.as_deref()),
                peer_certificate = ctx.handshake().is_some_and(|h| h.peer_certificate),
                "TLS handshake complete"
            );

            Ok((stream, Extension(ctx).layer(service)))
        })
    }
}

/// Plaintext acceptor: each connection gets a context without handshake facts.
#[derive(Clone)]
pub struct PlainAcceptor {
    inner: DefaultAcceptor,
}

impl PlainAcceptor {
    pub fn new() -> Self {
        Self {
            inner: DefaultAcceptor::new(),
        }
    }
}

impl Default for PlainAcceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> Accept<I, S> for PlainAcceptor
where
    I: Send + 'static,
    S: Send + 'static,
{
    type Stream = I;
    type Service = AddExtension<S, ConnectionContext>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let ctx = ConnectionContext::plain();
            tracing::trace!(connection_id = %ctx.id(), "Plaintext connection accepted");
            Ok((stream, Extension(ctx).layer(service)))
        })
    }
}
