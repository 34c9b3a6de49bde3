//! Proxy-provenance header stripping.
//!
//! Any client that speaks HTTP can claim an original client address through
//! these headers, so an untrusted request must lose all of them at once.

use axum::http::{header::HeaderName, HeaderMap};

/// Headers through which an upstream hop claims the original client's identity.
pub static PROXY_HEADERS: [HeaderName; 5] = [
    HeaderName::from_static("x-forwarded-for"),
    HeaderName::from_static("x-forwarded-port"),
    HeaderName::from_static("x-forwarded-proto"),
    HeaderName::from_static("x-forwarded-proto-version"),
    HeaderName::from_static("x-real-ip"),
];

/// Remove every value of every proxy-provenance header.
///
/// Returns how many header values were dropped.
pub fn strip_proxy_headers(headers: &mut HeaderMap) -> usize {
    let mut removed = 0;
    for name in &PROXY_HEADERS {
        // `remove` only hands back the first value; count them before dropping.
        removed += headers.get_all(name).iter().count();
        headers.remove(name);
    }
    removed
}

/// True if any proxy-provenance header is present.
#[cfg(test)]
pub(crate) fn has_proxy_headers(headers: &HeaderMap) -> bool {
    PROXY_HEADERS.iter().any(|name| headers.contains_key(name))
}
