//! Transport layer: connection lifecycle and command correlation.
//!
//! ```text
//! ┌──────────────────┐                              ┌──────────────────┐
//! │  Callers (Rust)  │                              │  Remote browser  │
//! │                  │          WebSocket           │  endpoint        │
//! │  Connection ─────┼──────────────────────────────┼─►                │
//! │  PendingCommands │   one persistent connection  │  replies/events  │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. [`Endpoint::connect`] - Dial the remote endpoint (token in the URL)
//! 2. [`Connection`] - Send commands, receive correlated replies and events
//! 3. [`Connection::shutdown`] - Close and fail anything still in flight
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Command channel, frame dispatcher, event loop |
//! | `endpoint` | Endpoint URL building and WebSocket connect |
//! | `pending` | In-flight command table |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Remote endpoint addressing and connection establishment.
pub mod endpoint;

/// Pending command table.
pub mod pending;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{
    Connection, EventHandler, FrameSink, FrameStream, WsStream, DEFAULT_COMMAND_TIMEOUT,
};
pub use endpoint::Endpoint;
pub use pending::PendingCommands;
