//! High-level client facade.
//!
//! [`CdpClient`] wraps a [`Connection`] with thin, payload-level helpers for
//! the target lifecycle a remote automation session typically walks through:
//! query the browser version, create a target, attach to it, then issue
//! session-scoped commands through the resulting [`CdpSession`].
//!
//! These helpers only build `params` payloads and pick known fields out of
//! replies; everything protocol-mechanical (IDs, correlation, timeouts)
//! lives in the transport layer.
//!
//! # Example
//!
//! ```ignore
//! use cdp_pipe::{CdpClient, Endpoint, Result};
//!
//! async fn example() -> Result<()> {
//!     let endpoint = Endpoint::new("wss://cloud.example.com")?.with_token("token");
//!     let client = CdpClient::connect(&endpoint).await?;
//!
//!     let target = client.create_target("https://example.com").await?;
//!     let session = client.attach_to_target(&target).await?;
//!
//!     session.enable("Page").await?;
//!     let reply = session.evaluate("document.title").await?;
//!     println!("title reply: {}", reply.raw());
//!
//!     client.close_target(&target).await?;
//!     Ok(())
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde_json::json;

use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::Reply;
use crate::transport::{Connection, Endpoint, EventHandler};

// ============================================================================
// BrowserVersion
// ============================================================================

/// Browser identity reported by `Browser.getVersion`.
#[derive(Debug, Clone)]
pub struct BrowserVersion {
    /// Product string, e.g. `Chrome/122.0.6261.94`.
    pub product: String,
    /// Default user agent of the remote browser.
    pub user_agent: String,
}

// ============================================================================
// CdpClient
// ============================================================================

/// Client for a remote browser endpoint.
///
/// Cheap to clone; clones share the underlying connection.
#[derive(Clone)]
pub struct CdpClient {
    connection: Connection,
}

impl CdpClient {
    /// Connects to a remote endpoint.
    ///
    /// # Errors
    ///
    /// See [`Endpoint::connect`].
    pub async fn connect(endpoint: &Endpoint) -> Result<Self> {
        let connection = endpoint.connect().await?;
        Ok(Self { connection })
    }

    /// Wraps an already-established connection.
    #[inline]
    #[must_use]
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Sends a raw command against the connection's default context.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn send(&self, method: impl Into<String>, params: serde_json::Value) -> Result<Reply> {
        self.connection.send(method, params).await
    }

    /// Queries the remote browser's version and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reply lacks the expected fields.
    pub async fn version(&self) -> Result<BrowserVersion> {
        let reply = self.connection.send("Browser.getVersion", json!({})).await?;

        let product = reply
            .field("product")
            .ok_or_else(|| Error::protocol("Browser.getVersion reply missing product"))?
            .to_string();
        let user_agent = reply
            .field("userAgent")
            .ok_or_else(|| Error::protocol("Browser.getVersion reply missing userAgent"))?
            .to_string();

        Ok(BrowserVersion {
            product,
            user_agent,
        })
    }

    /// Creates a new target (page) at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reply lacks a `targetId`.
    pub async fn create_target(&self, url: impl AsRef<str>) -> Result<TargetId> {
        let reply = self
            .connection
            .send("Target.createTarget", json!({"url": url.as_ref()}))
            .await?;

        reply
            .field("targetId")
            .map(TargetId::new)
            .ok_or_else(|| Error::protocol("Target.createTarget reply missing targetId"))
    }

    /// Attaches to a target, returning a session scoped to it.
    ///
    /// Uses flat session mode: subsequent commands carry the returned
    /// session's ID instead of going through a separate connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reply lacks a `sessionId`.
    pub async fn attach_to_target(&self, target: &TargetId) -> Result<CdpSession> {
        let reply = self
            .connection
            .send(
                "Target.attachToTarget",
                json!({"targetId": target.as_str(), "flatten": true}),
            )
            .await?;

        let session_id = reply
            .field("sessionId")
            .map(SessionId::new)
            .ok_or_else(|| Error::protocol("Target.attachToTarget reply missing sessionId"))?;

        Ok(CdpSession {
            connection: self.connection.clone(),
            session_id,
        })
    }

    /// Closes a target.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn close_target(&self, target: &TargetId) -> Result<()> {
        self.connection
            .send("Target.closeTarget", json!({"targetId": target.as_str()}))
            .await?;
        Ok(())
    }

    /// Sets the handler for unsolicited events.
    pub fn set_event_handler(&self, handler: EventHandler) {
        self.connection.set_event_handler(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        self.connection.clear_event_handler();
    }

    /// Shuts down the underlying connection.
    pub fn shutdown(&self) {
        self.connection.shutdown();
    }
}

// ============================================================================
// CdpSession
// ============================================================================

/// A command scope attached to one remote target.
///
/// Every command sent through a session carries its `sessionId`, so it
/// executes against that target rather than the connection's default
/// context. Sessions multiplex freely over the one connection.
#[derive(Clone)]
pub struct CdpSession {
    connection: Connection,
    session_id: SessionId,
}

impl CdpSession {
    /// Returns the session's ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.session_id
    }

    /// Sends a command scoped to this session.
    ///
    /// # Errors
    ///
    /// See [`Connection::send_in_session`].
    pub async fn send(
        &self,
        method: impl Into<String>,
        params: serde_json::Value,
    ) -> Result<Reply> {
        self.connection
            .send_in_session(&self.session_id, method, params)
            .await
    }

    /// Enables a protocol domain (`Page`, `Network`, ...).
    ///
    /// # Errors
    ///
    /// See [`Connection::send_in_session`].
    pub async fn enable(&self, domain: impl AsRef<str>) -> Result<()> {
        self.send(format!("{}.enable", domain.as_ref()), json!({}))
            .await?;
        Ok(())
    }

    /// Navigates the target to `url`.
    ///
    /// # Errors
    ///
    /// See [`Connection::send_in_session`].
    pub async fn navigate(&self, url: impl AsRef<str>) -> Result<Reply> {
        self.send("Page.navigate", json!({"url": url.as_ref()})).await
    }

    /// Evaluates a JavaScript expression in the target, by value.
    ///
    /// # Errors
    ///
    /// See [`Connection::send_in_session`].
    pub async fn evaluate(&self, expression: impl AsRef<str>) -> Result<Reply> {
        self.send(
            "Runtime.evaluate",
            json!({"expression": expression.as_ref(), "returnByValue": true}),
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::protocol::extract_field;
    use crate::transport::{FrameSink, FrameStream};

    // A remote end that answers the target-lifecycle commands.
    struct ScriptedSink {
        inbound: mpsc::UnboundedSender<String>,
        seen: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl FrameSink for ScriptedSink {
        async fn send_frame(&mut self, frame: String) -> crate::Result<()> {
            let id = extract_field(&frame, "id").unwrap_or("0").to_string();
            let method = extract_field(&frame, "method").unwrap_or_default();

            let reply = match method {
                "Browser.getVersion" => format!(
                    r#"{{"id":{id},"result":{{"product":"Chrome/122.0","userAgent":"Mozilla/5.0 (test)"}}}}"#
                ),
                "Target.createTarget" => format!(r#"{{"id":{id},"result":{{"targetId":"T1"}}}}"#),
                "Target.attachToTarget" => {
                    format!(r#"{{"id":{id},"result":{{"sessionId":"S1"}}}}"#)
                }
                _ => format!(r#"{{"id":{id},"result":{{}}}}"#),
            };

            let _ = self.seen.send(frame);
            let _ = self.inbound.send(reply);
            Ok(())
        }

        async fn close(&mut self) -> crate::Result<()> {
            Ok(())
        }
    }

    struct StubStream {
        inbound: mpsc::UnboundedReceiver<String>,
    }

    #[async_trait]
    impl FrameStream for StubStream {
        async fn next_frame(&mut self) -> Option<crate::Result<String>> {
            self.inbound.recv().await.map(Ok)
        }
    }

    fn scripted_client() -> (CdpClient, mpsc::UnboundedReceiver<String>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();

        let connection = Connection::from_transport(
            Box::new(ScriptedSink {
                inbound: inbound_tx,
                seen: seen_tx,
            }),
            Box::new(StubStream {
                inbound: inbound_rx,
            }),
        );

        (CdpClient::from_connection(connection), seen_rx)
    }

    #[tokio::test]
    async fn test_version() {
        let (client, _seen) = scripted_client();

        let version = client.version().await.expect("version");
        assert_eq!(version.product, "Chrome/122.0");
        assert_eq!(version.user_agent, "Mozilla/5.0 (test)");
    }

    #[tokio::test]
    async fn test_target_lifecycle() {
        let (client, mut seen) = scripted_client();

        let target = client.create_target("https://example.com").await.expect("target");
        assert_eq!(target.as_str(), "T1");

        let session = client.attach_to_target(&target).await.expect("session");
        assert_eq!(session.id().as_str(), "S1");

        client.close_target(&target).await.expect("close");

        let create_frame = seen.recv().await.expect("createTarget frame");
        assert!(create_frame.contains(r#""url":"https://example.com""#));
        let attach_frame = seen.recv().await.expect("attachToTarget frame");
        assert!(attach_frame.contains(r#""flatten":true"#));
        let close_frame = seen.recv().await.expect("closeTarget frame");
        assert!(close_frame.contains(r#""targetId":"T1""#));
    }

    #[tokio::test]
    async fn test_session_commands_carry_session_id() {
        let (client, mut seen) = scripted_client();

        let target = client.create_target("about:blank").await.expect("target");
        let session = client.attach_to_target(&target).await.expect("session");

        session.enable("Page").await.expect("enable");
        session.navigate("https://example.com").await.expect("navigate");
        session.evaluate("document.title").await.expect("evaluate");

        // Skip the two lifecycle frames.
        let _ = seen.recv().await;
        let _ = seen.recv().await;

        let enable_frame = seen.recv().await.expect("enable frame");
        assert!(enable_frame.contains(r#""method":"Page.enable""#));
        assert!(enable_frame.contains(r#""sessionId":"S1""#));

        let navigate_frame = seen.recv().await.expect("navigate frame");
        assert!(navigate_frame.contains(r#""sessionId":"S1""#));

        let evaluate_frame = seen.recv().await.expect("evaluate frame");
        assert!(evaluate_frame.contains(r#""returnByValue":true"#));
        assert!(evaluate_frame.contains(r#""sessionId":"S1""#));
    }
}
