//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers prevent mixing incompatible identifiers at compile time:
//!
//! | Type | Underlying | Purpose |
//! |------|------------|---------|
//! | [`CommandId`] | `u64` | Request/response correlation key |
//! | [`SessionId`] | `String` | Scopes a command to a remote session |
//! | [`TargetId`] | `String` | Names a remote page/target |
//!
//! Command identifiers come from [`CommandIdAllocator`], which hands out a
//! strictly increasing sequence starting at 1 and never reuses a value for
//! the lifetime of a connection.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// CommandId
// ============================================================================

/// Unique identifier correlating a command with its reply.
///
/// Positive, strictly increasing within one connection, never reused even
/// after the command completes or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    /// Creates a command ID from a raw value.
    ///
    /// Intended for tests and for the frame dispatcher, which recovers the
    /// ID from an inbound frame. Normal allocation goes through
    /// [`CommandIdAllocator::next`].
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CommandIdAllocator
// ============================================================================

/// Allocator producing a strictly increasing stream of [`CommandId`]s.
///
/// Safe for concurrent allocation from multiple tasks: each call to
/// [`next`](Self::next) returns a value greater than every previously
/// returned value, with no duplicates, ever.
#[derive(Debug)]
pub struct CommandIdAllocator {
    next: AtomicU64,
}

impl CommandIdAllocator {
    /// Creates an allocator whose first ID is 1.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocates the next command ID.
    #[inline]
    #[must_use]
    pub fn next(&self) -> CommandId {
        CommandId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CommandIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Opaque session identifier scoping a command to a remote execution context.
///
/// Obtained from a prior reply (`Target.attachToTarget` returns one); the
/// correlation engine only passes it through as the `sessionId` field of an
/// outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from its wire representation.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the session ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// TargetId
// ============================================================================

/// Opaque identifier of a remote target (page, worker, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Creates a target ID from its wire representation.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the target ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
