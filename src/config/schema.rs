//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::gate::{AllowWhen, HostBlacklist};
use crate::net::handshake::ClientAuth;

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Proxy header trust settings.
    pub trusted_headers: TrustedHeadersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration. Plaintext when absent.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,

    /// CA bundle used to verify client certificates (PEM).
    #[serde(default)]
    pub client_ca_path: Option<String>,

    /// Client certificate requirement.
    #[serde(default)]
    pub client_auth: ClientAuth,
}

/// Proxy header trust configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TrustedHeadersConfig {
    /// When client proxy headers may be trusted. Fixed for the process lifetime.
    pub allow_when: AllowWhen,

    /// Hosts whose proxy headers are stripped even on trusted connections.
    /// Matched exactly against the Host header, ignoring ASCII case.
    pub host_blacklist: Vec<String>,
}

impl TrustedHeadersConfig {
    /// Build the blacklist snapshot for this config.
    pub fn blacklist(&self) -> HostBlacklist {
        HostBlacklist::new(&self.host_blacklist)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: GateConfig = toml::from_str("").unwrap();
        assert_eq!(config, GateConfig::default());
        assert_eq!(config.trusted_headers.allow_when, AllowWhen::Never);
        assert!(config.listener.tls.is_none());
    }

    #[test]
    fn parses_full_config() {
        let config: GateConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:8443"

            [listener.tls]
            cert_path = "server.pem"
            key_path = "server.key"
            client_ca_path = "ca.pem"
            client_auth = "require"

            [trusted_headers]
            allow_when = "mutual_ssl_auth"
            host_blacklist = ["netflix.com", "Example.ORG"]

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        let tls = config.listener.tls.as_ref().unwrap();
        assert_eq!(tls.client_auth, ClientAuth::Require);
        assert_eq!(tls.client_ca_path.as_deref(), Some("ca.pem"));
        assert_eq!(config.trusted_headers.allow_when, AllowWhen::MutualSslAuth);

        let blacklist = config.trusted_headers.blacklist();
        assert!(blacklist.matches("example.org"));
        assert!(blacklist.matches("NETFLIX.COM"));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = toml::from_str::<GateConfig>(
            r#"
            [trusted_headers]
            allow_when = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn accepts_mode_alias() {
        let config: GateConfig = toml::from_str(
            r#"
            [trusted_headers]
            allow_when = "mutual_tls_required"
            "#,
        )
        .unwrap();
        assert_eq!(config.trusted_headers.allow_when, AllowWhen::MutualSslAuth);
    }
}
