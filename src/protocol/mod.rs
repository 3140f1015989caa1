//! Protocol message types.
//!
//! This module defines the wire-level pieces of the engine: the outbound
//! command frame, the inbound frame classification, and the narrow field
//! scanner both sides share.
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | [`CommandRequest`] | Local → Remote | Command frame |
//! | [`Reply`] | Remote → Local | Correlated command reply |
//! | [`Event`] | Remote → Local | Unsolicited notification |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `fields` | Best-effort top-level field extraction |
//! | `frame` | Inbound frame classification, [`Reply`] and [`Event`] |
//! | `request` | Outbound [`CommandRequest`] |

// ============================================================================
// Submodules
// ============================================================================

/// Best-effort field extraction from raw frames.
pub mod fields;

/// Inbound frame classification.
pub mod frame;

/// Outbound command request wire type.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use fields::extract_field;
pub use frame::{Event, Frame, Reply};
pub use request::CommandRequest;
