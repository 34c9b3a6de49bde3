//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic, including unknown modes)
//! - Validate addresses and TLS file settings
//! - Catch blacklist entries that could never match a Host header
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::net::handshake::ClientAuth;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("listener.tls.client_ca_path is required when client_auth = \"{0}\"")]
    MissingClientCa(ClientAuth),

    #[error("trusted_headers.host_blacklist entry `{0}` contains whitespace")]
    InvalidBlacklistEntry(String),
}

/// Check a parsed configuration, collecting every error found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyPath("listener.tls.cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyPath("listener.tls.key_path"));
        }
        let has_ca = tls.client_ca_path.as_deref().is_some_and(|p| !p.trim().is_empty());
        if tls.client_auth != ClientAuth::None && !has_ca {
            errors.push(ValidationError::MissingClientCa(tls.client_auth));
        }
    }

    for entry in &config.trusted_headers.host_blacklist {
        if entry.trim().chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidBlacklistEntry(entry.clone()));
        }
    }

    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
