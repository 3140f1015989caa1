//! cdp-pipe - Chrome DevTools Protocol client over one WebSocket.
//!
//! This library issues CDP commands over a single persistent WebSocket
//! connection to a remote browser endpoint and correlates the out-of-order
//! asynchronous replies with their originating requests.
//!
//! # Architecture
//!
//! The engine is a single-producer, multi-consumer correlation structure:
//!
//! - Any number of tasks issue commands concurrently through [`Connection`]
//! - One event loop task owns the socket, serializes writes, and
//!   demultiplexes inbound frames into replies and events
//! - Each command gets a strictly increasing ID and an entry in the pending
//!   table; the matching reply (or a timeout, whichever first) resolves it
//!   exactly once
//!
//! Session scoping layers a second addressing dimension on the same
//! connection: a command tagged with a [`SessionId`] executes against a
//! specific remote target without opening another socket.
//!
//! # Quick Start
//!
//! ```no_run
//! use cdp_pipe::{CdpClient, Endpoint, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let endpoint = Endpoint::new("wss://cloud.example.com")?
//!         .with_token("your-token-here");
//!     let client = CdpClient::connect(&endpoint).await?;
//!
//!     let version = client.version().await?;
//!     println!("Browser: {}", version.product);
//!
//!     let target = client.create_target("https://example.com").await?;
//!     let session = client.attach_to_target(&target).await?;
//!     session.enable("Page").await?;
//!     session.navigate("https://example.com").await?;
//!
//!     let title = session.evaluate("document.title").await?;
//!     println!("Title reply: {}", title.raw());
//!
//!     client.close_target(&target).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | High-level facade: [`CdpClient`], [`CdpSession`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers and the command ID allocator |
//! | [`protocol`] | Wire message types and frame classification |
//! | [`transport`] | Connection, correlation table, endpoint dialing |

// ============================================================================
// Modules
// ============================================================================

/// High-level client facade.
///
/// [`CdpClient`] wraps a connection with target-lifecycle helpers;
/// [`CdpSession`] scopes commands to one remote target.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Protocol message types.
///
/// Outbound command frames, inbound frame classification, field scanner.
pub mod protocol;

/// Transport layer.
///
/// Connection event loop, pending command table, endpoint dialing.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{BrowserVersion, CdpClient, CdpSession};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandId, CommandIdAllocator, SessionId, TargetId};

// Protocol types
pub use protocol::{extract_field, CommandRequest, Event, Frame, Reply};

// Transport types
pub use transport::{Connection, Endpoint, EventHandler, DEFAULT_COMMAND_TIMEOUT};
