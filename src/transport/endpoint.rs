//! Remote endpoint addressing and connection establishment.
//!
//! An [`Endpoint`] is the `ws://` or `wss://` URL of a remote browser
//! endpoint, plus the query parameters the service expects: an opaque
//! authentication token and arbitrary provider-specific options, both
//! carried in the URL.
//!
//! # Example
//!
//! ```ignore
//! let connection = Endpoint::new("wss://cloud.example.com")?
//!     .with_token("your-token-here")
//!     .with_param("device_type", "mac")
//!     .connect()
//!     .await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Endpoint
// ============================================================================

/// Address of a remote browser endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parses an endpoint URL.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the URL does not parse
    /// - [`Error::Protocol`] if the scheme is not `ws` or `wss`
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        match url.scheme() {
            "ws" | "wss" => Ok(Self { url }),
            scheme => Err(Error::protocol(format!(
                "Unsupported endpoint scheme: {scheme}"
            ))),
        }
    }

    /// Attaches the authentication token as the `token` query parameter.
    #[must_use]
    pub fn with_token(mut self, token: impl AsRef<str>) -> Self {
        self.url
            .query_pairs_mut()
            .append_pair("token", token.as_ref());
        self
    }

    /// Appends an arbitrary query parameter.
    ///
    /// Remote endpoints accept provider-specific options this way, e.g.
    /// `--proxy-server` or `device_type`.
    #[must_use]
    pub fn with_param(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.url
            .query_pairs_mut()
            .append_pair(key.as_ref(), value.as_ref());
        self
    }

    /// Returns the full endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Connects to the endpoint with the default handshake timeout (30s).
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake does not complete in time
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(&self) -> Result<Connection> {
        self.connect_with_timeout(CONNECT_TIMEOUT).await
    }

    /// Connects to the endpoint with a custom handshake timeout.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    pub async fn connect_with_timeout(&self, connect_timeout: Duration) -> Result<Connection> {
        debug!(host = self.url.host_str().unwrap_or_default(), "Connecting to endpoint");

        let (ws_stream, _response) = timeout(connect_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))??;

        debug!("Endpoint connected");
        Ok(Connection::new(ws_stream))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_in_url() {
        let endpoint = Endpoint::new("wss://cloud.example.com")
            .expect("valid url")
            .with_token("secret");
        assert_eq!(endpoint.url().as_str(), "wss://cloud.example.com/?token=secret");
    }

    #[test]
    fn test_extra_params_appended() {
        let endpoint = Endpoint::new("wss://cloud.example.com")
            .expect("valid url")
            .with_token("t")
            .with_param("device_type", "mac");
        let url = endpoint.url().as_str();
        assert!(url.contains("token=t"));
        assert!(url.contains("device_type=mac"));
    }

    #[test]
    fn test_param_values_are_encoded() {
        let endpoint = Endpoint::new("ws://127.0.0.1:9222")
            .expect("valid url")
            .with_param("--proxy-server", "user:pass@proxy.example.com:4600");
        assert!(endpoint.url().as_str().contains("--proxy-server=user%3Apass%40proxy.example.com%3A4600"));
    }

    #[test]
    fn test_rejects_http_scheme() {
        let err = Endpoint::new("https://example.com").expect_err("not a ws scheme");
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_rejects_garbage_url() {
        let err = Endpoint::new("not a url").expect_err("invalid");
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
