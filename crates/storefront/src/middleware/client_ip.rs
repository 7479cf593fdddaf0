//! Client IP resolution for the admin login lockout.
//!
//! The socket peer address is used unless `TRUST_PROXY_HEADERS` is set, in
//! which case the Cloudflare and Fly.io proxy headers take precedence. Those
//! headers are client-controlled when the server is reachable directly.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::state::AppState;

/// Proxy headers carrying the real client IP, in order of trust.
const CLIENT_IP_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Extractor for the requesting client's IP address.
///
/// Falls back to `0.0.0.0` when the server was started without connect info
/// and no trusted header names the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state.config().trust_proxy_headers)))
    }
}

/// Client IP for a request, consulting proxy headers only when trusted.
#[must_use]
pub fn resolve(parts: &Parts, trust_proxy_headers: bool) -> IpAddr {
    trust_proxy_headers
        .then(|| from_headers(&parts.headers))
        .flatten()
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// First parseable client IP from the proxy headers.
fn from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            // X-Forwarded-For lists the original client first
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderValue, Request};

    use super::*;

    fn peer() -> SocketAddr {
        "192.0.2.4:5555".parse().unwrap()
    }

    fn resolve_request(request: Request<()>, trust_proxy_headers: bool) -> IpAddr {
        let (parts, ()) = request.into_parts();
        resolve(&parts, trust_proxy_headers)
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let request = Request::builder()
            .header("x-forwarded-for", "198.51.100.1")
            .header("cf-connecting-ip", "203.0.113.9")
            .body(())
            .unwrap();
        assert_eq!(
            resolve_request(request, true),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let request = Request::builder()
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(
            resolve_request(request, true),
            "198.51.100.1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_untrusted_headers_ignored() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "198.51.100.1")
            .header("cf-connecting-ip", "203.0.113.9")
            .body(())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer()));
        assert_eq!(resolve_request(request, false), peer().ip());
    }

    #[test]
    fn test_untrusted_headers_without_connect_info() {
        let request = Request::builder()
            .header("x-forwarded-for", "198.51.100.1")
            .body(())
            .unwrap();
        assert_eq!(
            resolve_request(request, false),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_falls_back_to_connect_info() {
        let mut request = Request::builder()
            .header("x-real-ip", HeaderValue::from_static("garbage"))
            .body(())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer()));
        assert_eq!(resolve_request(request, true), peer().ip());
    }

    #[test]
    fn test_unknown_client() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(
            resolve_request(request, true),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }
}
