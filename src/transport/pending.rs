//! Pending command table.
//!
//! A concurrency-safe map from [`CommandId`] to the oneshot sender that
//! resolves the caller blocked on that command. Entries are inserted when a
//! command goes out on the wire and removed by exactly one of: a matching
//! reply, an error-marked reply, a timeout, or connection shutdown.
//!
//! Removal happens under the map lock, so when a reply and a timeout race
//! for the same ID, whichever takes the entry first delivers the outcome and
//! the loser observes the entry already gone and is a no-op.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::CommandId;
use crate::protocol::Reply;

// ============================================================================
// Types
// ============================================================================

/// Sender half resolving one awaited command.
pub type ReplySlot = oneshot::Sender<Result<Reply>>;

// ============================================================================
// PendingCommands
// ============================================================================

/// Table of in-flight commands awaiting replies.
///
/// Cheap to clone; all clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct PendingCommands {
    inner: Arc<Mutex<FxHashMap<CommandId, ReplySlot>>>,
}

impl PendingCommands {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reply slot for `id`.
    ///
    /// # Errors
    ///
    /// When `id` is already in flight the slot is handed back so the caller
    /// can fail it with [`Error::DuplicateCommandId`]. The allocator never
    /// repeats IDs, so a duplicate signals a logic bug.
    pub fn register(&self, id: CommandId, slot: ReplySlot) -> StdResult<(), ReplySlot> {
        let mut inner = self.inner.lock();
        if inner.contains_key(&id) {
            return Err(slot);
        }
        inner.insert(id, slot);
        trace!(%id, pending = inner.len(), "Command registered");
        Ok(())
    }

    /// Delivers a successful reply to the waiter for `id`.
    ///
    /// Returns `false` when no entry exists, which is the expected outcome
    /// for a reply arriving after its command timed out.
    pub fn complete(&self, id: CommandId, reply: Reply) -> bool {
        match self.take(id) {
            Some(slot) => {
                // The waiter may have dropped its receiver; either way the
                // entry is gone and the resolution happened here.
                let _ = slot.send(Ok(reply));
                true
            }
            None => {
                debug!(%id, "Reply for unknown command dropped");
                false
            }
        }
    }

    /// Delivers a failure to the waiter for `id`.
    ///
    /// Used for error-marked replies and for transport-level send failures.
    /// Returns `false` when no entry exists.
    pub fn fail(&self, id: CommandId, error: Error) -> bool {
        match self.take(id) {
            Some(slot) => {
                let _ = slot.send(Err(error));
                true
            }
            None => {
                debug!(%id, "Failure for unknown command dropped");
                false
            }
        }
    }

    /// Removes the entry for `id` without delivering anything.
    ///
    /// Called by the timeout path after the waiter has already given up;
    /// a reply arriving later finds no entry and is discarded.
    pub fn abandon(&self, id: CommandId) -> bool {
        let removed = self.inner.lock().remove(&id).is_some();
        if removed {
            debug!(%id, "Timed-out command removed");
        }
        removed
    }

    /// Fails every in-flight command with [`Error::ConnectionClosed`].
    ///
    /// Called when the connection's event loop terminates. Returns the
    /// number of waiters notified.
    pub fn fail_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut inner = self.inner.lock();
            inner.drain().collect()
        };
        let count = drained.len();

        for (_, slot) in drained {
            let _ = slot.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending commands on shutdown");
        }
        count
    }

    /// Returns the number of in-flight commands.
    ///
    /// The public view of this count is
    /// [`Connection::pending_count`](crate::transport::Connection::pending_count).
    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if no commands are in flight.
    #[inline]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns `true` if `id` is in flight.
    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, id: CommandId) -> bool {
        self.inner.lock().contains_key(&id)
    }

    /// Atomically removes and returns the slot for `id`.
    fn take(&self, id: CommandId) -> Option<ReplySlot> {
        self.inner.lock().remove(&id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> (ReplySlot, oneshot::Receiver<Result<Reply>>) {
        oneshot::channel()
    }

    #[tokio::test]
    async fn test_register_and_complete() {
        let pending = PendingCommands::new();
        let id = CommandId::from_raw(1);
        let (tx, rx) = slot();

        pending.register(id, tx).ok().expect("register");
        assert_eq!(pending.len(), 1);

        assert!(pending.complete(id, Reply::new(id, r#"{"id":1,"result":{}}"#)));
        assert!(pending.is_empty());

        let reply = rx.await.expect("resolved").expect("success");
        assert_eq!(reply.id(), id);
    }

    #[tokio::test]
    async fn test_register_duplicate_hands_slot_back() {
        let pending = PendingCommands::new();
        let id = CommandId::from_raw(5);
        let (tx1, _rx1) = slot();
        let (tx2, rx2) = slot();

        pending.register(id, tx1).ok().expect("first register");
        let rejected = pending.register(id, tx2).expect_err("duplicate");
        // The original entry is untouched.
        assert_eq!(pending.len(), 1);

        let _ = rejected.send(Err(Error::duplicate_command_id(id)));
        let outcome = rx2.await.expect("resolved");
        assert!(matches!(outcome, Err(Error::DuplicateCommandId { .. })));
    }

    #[tokio::test]
    async fn test_fail_delivers_error() {
        let pending = PendingCommands::new();
        let id = CommandId::from_raw(3);
        let (tx, rx) = slot();

        pending.register(id, tx).ok().expect("register");
        assert!(pending.fail(id, Error::command_failed(id, r#"{"error":{}}"#)));

        let outcome = rx.await.expect("resolved");
        assert!(matches!(outcome, Err(Error::CommandFailed { .. })));
        assert!(!pending.contains(id));
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_noop() {
        let pending = PendingCommands::new();
        let id = CommandId::from_raw(5);

        assert!(!pending.complete(id, Reply::new(id, "{}")));
        assert!(!pending.fail(id, Error::ConnectionClosed));
        assert!(!pending.abandon(id));
    }

    #[tokio::test]
    async fn test_at_most_one_resolution() {
        let pending = PendingCommands::new();
        let id = CommandId::from_raw(9);
        let (tx, rx) = slot();

        pending.register(id, tx).ok().expect("register");
        assert!(pending.complete(id, Reply::new(id, r#"{"id":9,"result":{}}"#)));

        // Both later paths find the entry gone.
        assert!(!pending.fail(id, Error::ConnectionClosed));
        assert!(!pending.abandon(id));

        let reply = rx.await.expect("resolved").expect("success");
        assert_eq!(reply.id(), id);
    }

    #[tokio::test]
    async fn test_abandon_discards_late_reply() {
        let pending = PendingCommands::new();
        let id = CommandId::from_raw(4);
        let (tx, mut rx) = slot();

        pending.register(id, tx).ok().expect("register");
        assert!(pending.abandon(id));

        // The late reply is a no-op and the waiter never hears anything.
        assert!(!pending.complete(id, Reply::new(id, "{}")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fail_all_notifies_every_waiter() {
        let pending = PendingCommands::new();
        let mut receivers = Vec::new();

        for raw in 1..=5u64 {
            let id = CommandId::from_raw(raw);
            let (tx, rx) = slot();
            pending.register(id, tx).ok().expect("register");
            receivers.push(rx);
        }

        assert_eq!(pending.fail_all(), 5);
        assert!(pending.is_empty());

        for rx in receivers {
            let outcome = rx.await.expect("resolved");
            assert!(matches!(outcome, Err(Error::ConnectionClosed)));
        }
    }

    #[tokio::test]
    async fn test_concurrent_registration() {
        let pending = PendingCommands::new();
        let mut tasks = Vec::new();

        for raw in 1..=64u64 {
            let pending = pending.clone();
            tasks.push(tokio::spawn(async move {
                let (tx, _rx) = oneshot::channel();
                pending.register(CommandId::from_raw(raw), tx)
            }));
        }

        for task in tasks {
            task.await.expect("join").ok().expect("register");
        }
        assert_eq!(pending.len(), 64);
    }
}
