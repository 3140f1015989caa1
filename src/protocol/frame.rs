//! Inbound frame classification.
//!
//! Every text frame delivered by the transport is either a **reply** (it
//! carries the `id` of a previously sent command) or an **event** (no `id`).
//! [`Frame::classify`] makes that split using the field scanner; the
//! connection's event loop then routes replies into the pending-command
//! table and events to the optional event handler.
//!
//! # Wire shapes
//!
//! Reply: `{"id": <int>, "result": {...}}` or `{"id": <int>, "error": {...}}`
//!
//! Event: `{"method": "Target.targetCreated", "params": {...}}` (no `id`)

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::CommandId;

use super::fields::extract_field;

// ============================================================================
// Frame
// ============================================================================

/// A classified view of one inbound text frame.
///
/// Borrows from the raw frame; classification allocates nothing.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    /// A reply to a previously sent command.
    Reply {
        /// The command ID this reply correlates to.
        id: CommandId,
        /// The raw `error` payload when the reply is error-marked.
        error: Option<&'a str>,
    },
    /// An unsolicited notification (no `id` field).
    Event {
        /// The event method, when present.
        method: Option<&'a str>,
    },
}

impl<'a> Frame<'a> {
    /// Classifies a raw inbound frame.
    ///
    /// A frame is a reply when it has an `id` field parseable as an
    /// unsigned integer; anything else is an event. An `error` field on a
    /// reply marks it as failed.
    #[must_use]
    pub fn classify(raw: &'a str) -> Self {
        if let Some(id) = extract_field(raw, "id").and_then(|v| v.parse::<u64>().ok()) {
            return Frame::Reply {
                id: CommandId::from_raw(id),
                error: extract_field(raw, "error"),
            };
        }

        Frame::Event {
            method: extract_field(raw, "method"),
        }
    }
}

// ============================================================================
// Reply
// ============================================================================

/// A successful reply delivered to the caller that sent the command.
///
/// Owns the raw frame text; the known fields are reachable through the
/// scanner without a full parse, and [`json`](Self::json) gives the
/// structured view when a caller needs arbitrary nesting.
#[derive(Debug, Clone)]
pub struct Reply {
    id: CommandId,
    raw: String,
}

impl Reply {
    /// Creates a reply from its correlation ID and raw frame text.
    #[inline]
    #[must_use]
    pub fn new(id: CommandId, raw: impl Into<String>) -> Self {
        Self {
            id,
            raw: raw.into(),
        }
    }

    /// Returns the command ID this reply correlates to.
    #[inline]
    #[must_use]
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Returns the raw frame text.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Consumes the reply, returning the raw frame text.
    #[inline]
    #[must_use]
    pub fn into_raw(self) -> String {
        self.raw
    }

    /// Extracts a top-level field from the frame via the field scanner.
    ///
    /// See [`extract_field`] for shape handling and limitations.
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        extract_field(&self.raw, name)
    }

    /// Returns the raw `result` payload, when present.
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.field("result")
    }

    /// Parses the full frame as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the frame is not
    /// valid JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.raw)?)
    }
}

// ============================================================================
// Event
// ============================================================================

/// An unsolicited notification forwarded to the registered event handler.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event method (`Module.eventName`), when the frame carried one.
    pub method: Option<String>,
    /// Raw frame text.
    pub raw: String,
}

// ============================================================================
// Tests
// ============================================================================
