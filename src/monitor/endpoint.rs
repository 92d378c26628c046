//! Service endpoint derived from the page origin.
//!
//! The service listens on a fixed port of the same host that served the
//! page. A page loaded over `https` talks to `wss`, anything else to `ws`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use url::Url;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Host used when the origin has none (e.g. a `file:` page).
pub const FALLBACK_HOST: &str = "localhost";

// ============================================================================
// Endpoint
// ============================================================================

/// WebSocket URL of the monitored service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Derives the endpoint from a page origin and the service port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`](crate::Error::Url) if the resulting URL does
    /// not parse.
    pub fn from_origin(origin: &Url, service_port: u16) -> Result<Self> {
        let scheme = if origin.scheme() == "https" { "wss" } else { "ws" };

        let host = match origin.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => FALLBACK_HOST,
        };

        let url = Url::parse(&format!("{scheme}://{host}:{service_port}"))?;
        Ok(Self { url })
    }

    /// Returns the full URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns `true` for `wss` endpoints.
    #[inline]
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(origin: &str, port: u16) -> Endpoint {
        let origin = Url::parse(origin).expect("valid origin");
        Endpoint::from_origin(&origin, port).expect("valid endpoint")
    }

    #[test]
    fn test_plain_origin_uses_ws() {
        let ep = endpoint("http://dashboard.local:8000/logs?x=1", 8081);
        assert_eq!(ep.url().as_str(), "ws://dashboard.local:8081/");
        assert!(!ep.is_secure());
    }

    #[test]
    fn test_secure_origin_uses_wss() {
        let ep = endpoint("https://dashboard.local/", 8081);
        assert_eq!(ep.url().scheme(), "wss");
        assert_eq!(ep.url().port(), Some(8081));
        assert!(ep.is_secure());
    }

    #[test]
    fn test_missing_host_falls_back_to_localhost() {
        let ep = endpoint("file:///srv/www/index.html", 8081);
        assert_eq!(ep.url().host_str(), Some("localhost"));
    }

    #[test]
    fn test_ipv6_host_is_kept() {
        let ep = endpoint("http://[::1]:8000/", 9000);
        assert_eq!(ep.to_string(), "ws://[::1]:9000/");
    }
}
