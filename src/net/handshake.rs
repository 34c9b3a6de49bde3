//! Per-connection handshake facts.
//!
//! The acceptor records what the TLS handshake settled on exactly once per
//! connection and attaches it to every request read off that connection as a
//! [`ConnectionContext`] extension. Later stages only ever read it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::net::connection::ConnectionId;

/// Client certificate requirement negotiated for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientAuth {
    /// Server-only TLS (or no TLS at all).
    #[default]
    None,
    /// A client certificate is verified when presented, but not demanded.
    Optional,
    /// The handshake fails unless the client presents a valid certificate.
    #[serde(alias = "required")]
    Require,
}

impl std::fmt::Display for ClientAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientAuth::None => write!(f, "none"),
            ClientAuth::Optional => write!(f, "optional"),
            ClientAuth::Require => write!(f, "require"),
        }
    }
}

/// Immutable snapshot of a completed TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandshakeInfo {
    pub client_auth: ClientAuth,
    /// Negotiated protocol version, e.g. `TLSv1_3`.
    pub protocol: Option<String>,
    /// Negotiated cipher suite.
    pub cipher: Option<String>,
    /// Whether the client presented a certificate chain.
    pub peer_certificate: bool,
}

impl HandshakeInfo {
    /// Facts for a handshake that negotiated the given client-auth requirement.
    pub fn with_client_auth(client_auth: ClientAuth) -> Self {
        Self {
            client_auth,
            ..Self::default()
        }
    }

    /// True when the handshake demanded mutual authentication.
    pub fn requires_client_auth(&self) -> bool {
        self.client_auth == ClientAuth::Require
    }
}

/// Read-only view of the connection a request arrived on.
///
/// Cloned into each request's extensions; the handshake facts behind it are
/// shared, never copied or mutated.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    id: ConnectionId,
    handshake: Option<Arc<HandshakeInfo>>,
}

impl ConnectionContext {
    /// Context for a plaintext connection: no handshake facts.
    pub fn plain() -> Self {
        Self {
            id: ConnectionId::new(),
            handshake: None,
        }
    }

    /// Context for a connection whose TLS handshake has completed.
    pub fn with_handshake(info: HandshakeInfo) -> Self {
        Self {
            id: ConnectionId::new(),
            handshake: Some(Arc::new(info)),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Handshake facts, if the connection went through TLS.
    pub fn handshake(&self) -> Option<&HandshakeInfo> {
        self.handshake.as_deref()
    }
}
