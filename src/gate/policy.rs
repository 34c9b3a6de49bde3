//! Transport trust policy.
//!
//! # Responsibilities
//! - Define the configured trust mode (`AllowWhen`)
//! - Map mode + handshake facts to a trust verdict
//!
//! # Design Decisions
//! - Pure and total: absent handshake facts count as "no client auth"
//! - Unknown mode strings are rejected when configuration is parsed

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::net::handshake::HandshakeInfo;

/// When client-supplied proxy headers may survive the transport check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowWhen {
    /// Never trusted; always stripped.
    #[default]
    Never,
    /// Trusted on every connection, subject to the host blacklist.
    Always,
    /// Trusted only on connections whose handshake required a client certificate.
    #[serde(alias = "mutual_tls_required")]
    MutualSslAuth,
}

/// Verdict of the transport trust check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    Trusted,
    Untrusted,
}

impl AllowWhen {
    /// Evaluate the policy against a connection's handshake facts.
    pub fn evaluate(self, handshake: Option<&HandshakeInfo>) -> Trust {
        let trusted = match self {
            AllowWhen::Never => false,
            AllowWhen::Always => true,
            AllowWhen::MutualSslAuth => handshake.is_some_and(HandshakeInfo::requires_client_auth),
        };

        if trusted {
            Trust::Trusted
        } else {
            Trust::Untrusted
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AllowWhen::Never => "never",
            AllowWhen::Always => "always",
            AllowWhen::MutualSslAuth => "mutual_ssl_auth",
        }
    }
}

impl std::fmt::Display for AllowWhen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known trust mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown allow_when mode `{0}` (expected never, always or mutual_ssl_auth)")]
pub struct UnknownModeError(pub String);

impl FromStr for AllowWhen {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(AllowWhen::Never),
            "always" => Ok(AllowWhen::Always),
            "mutual_ssl_auth" | "mutual_tls_required" => Ok(AllowWhen::MutualSslAuth),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::handshake::ClientAuth;

    fn facts(client_auth: ClientAuth) -> HandshakeInfo {
        HandshakeInfo::with_client_auth(client_auth)
    }

    #[test]
    fn never_is_untrusted_for_every_handshake() {
        assert_eq!(AllowWhen::Never.evaluate(None), Trust::Untrusted);
        for auth in [ClientAuth::None, ClientAuth::Optional, ClientAuth::Require] {
            assert_eq!(AllowWhen::Never.evaluate(Some(&facts(auth))), Trust::Untrusted);
        }
    }

    #[test]
    fn always_is_trusted_even_without_handshake() {
        assert_eq!(AllowWhen::Always.evaluate(None), Trust::Trusted);
        assert_eq!(
            AllowWhen::Always.evaluate(Some(&facts(ClientAuth::None))),
            Trust::Trusted
        );
    }

    #[test]
    fn mutual_auth_requires_required_client_auth() {
        let mode = AllowWhen::MutualSslAuth;
        assert_eq!(mode.evaluate(None), Trust::Untrusted);
        assert_eq!(mode.evaluate(Some(&facts(ClientAuth::None))), Trust::Untrusted);
        assert_eq!(mode.evaluate(Some(&facts(ClientAuth::Optional))), Trust::Untrusted);
        assert_eq!(mode.evaluate(Some(&facts(ClientAuth::Require))), Trust::Trusted);
    }

    #[test]
    fn parse_mode_strings() {
        assert_eq!("never".parse::<AllowWhen>(), Ok(AllowWhen::Never));
        assert_eq!("ALWAYS".parse::<AllowWhen>(), Ok(AllowWhen::Always));
        assert_eq!("mutual_tls_required".parse::<AllowWhen>(), Ok(AllowWhen::MutualSslAuth));
        assert_eq!(
            "sometimes".parse::<AllowWhen>(),
            Err(UnknownModeError("sometimes".into()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in [AllowWhen::Never, AllowWhen::Always, AllowWhen::MutualSslAuth] {
            assert_eq!(mode.to_string().parse::<AllowWhen>(), Ok(mode));
        }
    }
}
