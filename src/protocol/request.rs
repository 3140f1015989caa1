//! Outbound command request wire type.
//!
//! # Format
//!
//! ```json
//! {
//!   "id": 1,
//!   "method": "Page.navigate",
//!   "params": { "url": "https://example.com" },
//!   "sessionId": "ABC..."
//! }
//! ```
//!
//! `sessionId` is present only when the command is scoped to a session;
//! an unscoped command omits the field entirely.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::identifiers::{CommandId, SessionId};

// ============================================================================
// CommandRequest
// ============================================================================

/// One outbound command frame.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest {
    /// Unique identifier for request/reply correlation.
    pub id: CommandId,

    /// Protocol method in `Module.methodName` format.
    pub method: String,

    /// Method parameters.
    pub params: Value,

    /// Session scope; omitted from the wire when `None`.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl CommandRequest {
    /// Creates a request executed against the connection's default context.
    #[inline]
    #[must_use]
    pub fn new(id: CommandId, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
            session_id: None,
        }
    }

    /// Creates a request scoped to a session.
    #[inline]
    #[must_use]
    pub fn in_session(
        id: CommandId,
        session: SessionId,
        method: impl Into<String>,
        params: Value,
    ) -> Self {
        Self {
            id,
            method: method.into(),
            params,
            session_id: Some(session),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
