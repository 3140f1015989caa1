//! WebSocket connection and event loop.
//!
//! This module is the caller-facing command channel and the inbound frame
//! dispatcher, glued together by a tokio task.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming frames from the remote end (replies, events)
//! - Outgoing commands from the Rust API
//! - Request/reply correlation by command ID
//! - Event handler callbacks
//!
//! Callers suspend only while awaiting their own command's oneshot; the
//! event loop itself never waits on a reply, so a slow command stalls
//! nobody else. All outbound frames funnel through the loop's single write
//! half, which serializes writes on a transport that is not safe for
//! concurrent writers.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{CommandId, CommandIdAllocator, SessionId};
use crate::protocol::{CommandRequest, Event, Frame, Reply};

use super::pending::{PendingCommands, ReplySlot};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending commands before rejecting new ones.
const MAX_PENDING_COMMANDS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream type produced by `connect_async`.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Event handler callback type.
///
/// Called for each unsolicited event frame. Runs on the event loop task, so
/// it must not block; hand the event off to a channel for heavy work.
pub type EventHandler = Box<dyn Fn(Event) + Send + Sync>;

// ============================================================================
// Transport Adapter
// ============================================================================

/// Write half of the transport: delivers one text frame per call.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends a text frame.
    async fn send_frame(&mut self, frame: String) -> Result<()>;

    /// Closes the transport.
    async fn close(&mut self) -> Result<()>;
}

/// Read half of the transport: yields inbound text frames.
#[async_trait]
pub trait FrameStream: Send {
    /// Returns the next text frame, or `None` once the transport closed.
    async fn next_frame(&mut self) -> Option<Result<String>>;
}

#[async_trait]
impl FrameSink for SplitSink<WsStream, Message> {
    async fn send_frame(&mut self, frame: String) -> Result<()> {
        self.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        SinkExt::close(self).await?;
        Ok(())
    }
}

#[async_trait]
impl FrameStream for SplitStream<WsStream> {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.to_string())),
                Some(Ok(Message::Close(_))) => {
                    debug!("WebSocket closed by remote");
                    return None;
                }
                // Ignore Binary, Ping, Pong, Frame
                Some(Ok(_)) => {}
                Some(Err(e)) => return Some(Err(Error::WebSocket(e))),
                None => return None,
            }
        }
    }
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a request; the slot resolves when its reply arrives.
    Send {
        request: CommandRequest,
        reply_tx: ReplySlot,
    },
    /// Remove a timed-out pending entry.
    Abandon(CommandId),
    /// Shutdown the connection.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// A live protocol connection to a remote browser endpoint.
///
/// Handles command/reply correlation and event routing over one persistent
/// WebSocket. The connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone; clones share the same
/// socket, ID allocator, and pending table, so commands issued from many
/// tasks are independently tracked.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// In-flight command table (shared with event loop).
    pending: PendingCommands,
    /// Command ID allocator, strictly increasing per connection.
    ids: Arc<CommandIdAllocator>,
    /// Event handler (shared with event loop).
    event_handler: Arc<Mutex<Option<EventHandler>>>,
}

impl Connection {
    /// Creates a connection from an established WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    #[must_use]
    pub fn new(ws_stream: WsStream) -> Self {
        let (ws_write, ws_read) = ws_stream.split();
        Self::from_transport(Box::new(ws_write), Box::new(ws_read))
    }

    /// Creates a connection over an arbitrary transport.
    ///
    /// The transport only needs to deliver text frames in both directions;
    /// this is also the seam tests use to substitute a stub.
    #[must_use]
    pub fn from_transport(sink: Box<dyn FrameSink>, stream: Box<dyn FrameStream>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let pending = PendingCommands::new();
        let event_handler: Arc<Mutex<Option<EventHandler>>> = Arc::new(Mutex::new(None));

        tokio::spawn(Self::run_event_loop(
            sink,
            stream,
            command_rx,
            pending.clone(),
            Arc::clone(&event_handler),
        ));

        Self {
            command_tx,
            pending,
            ids: Arc::new(CommandIdAllocator::new()),
            event_handler,
        }
    }

    /// Sets the event handler callback.
    ///
    /// The handler is called for each unsolicited event frame. Without a
    /// handler, events are dropped.
    pub fn set_event_handler(&self, handler: EventHandler) {
        let mut guard = self.event_handler.lock();
        *guard = Some(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        let mut guard = self.event_handler.lock();
        *guard = None;
    }

    /// Sends a command and waits for its reply with the default timeout (30s).
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::CommandTimeout`] if no reply arrives within the timeout
    /// - [`Error::CommandFailed`] if the remote end returns an error reply
    /// - [`Error::Protocol`] if too many commands are in flight
    pub async fn send(&self, method: impl Into<String>, params: Value) -> Result<Reply> {
        self.send_with_timeout(method, params, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends a command and waits for its reply with a custom timeout.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn send_with_timeout(
        &self,
        method: impl Into<String>,
        params: Value,
        command_timeout: Duration,
    ) -> Result<Reply> {
        let request = CommandRequest::new(self.ids.next(), method, params);
        self.send_request(request, command_timeout).await
    }

    /// Sends a command scoped to a session, with the default timeout.
    ///
    /// The outbound frame carries `sessionId`, directing the remote end to
    /// execute the command in that session's context.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn send_in_session(
        &self,
        session: &SessionId,
        method: impl Into<String>,
        params: Value,
    ) -> Result<Reply> {
        self.send_in_session_with_timeout(session, method, params, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends a session-scoped command with a custom timeout.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send).
    pub async fn send_in_session_with_timeout(
        &self,
        session: &SessionId,
        method: impl Into<String>,
        params: Value,
        command_timeout: Duration,
    ) -> Result<Reply> {
        let request =
            CommandRequest::in_session(self.ids.next(), session.clone(), method, params);
        self.send_request(request, command_timeout).await
    }

    /// Registers, transmits, and awaits one command.
    async fn send_request(
        &self,
        request: CommandRequest,
        command_timeout: Duration,
    ) -> Result<Reply> {
        let id = request.id;

        // Check in-flight limit
        let in_flight = self.pending.len();
        if in_flight >= MAX_PENDING_COMMANDS {
            warn!(
                pending = in_flight,
                max = MAX_PENDING_COMMANDS,
                "Too many pending commands"
            );
            return Err(Error::protocol(format!(
                "Too many pending commands: {in_flight}/{MAX_PENDING_COMMANDS}"
            )));
        }

        // Create reply channel and hand the request to the event loop
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(ConnectionCommand::Send { request, reply_tx })
            .map_err(|_| Error::ConnectionClosed)?;

        // Wait for the reply with timeout
        match timeout(command_timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                // Deadline elapsed: purge the entry so a late reply is
                // discarded instead of resolving a vanished waiter. The
                // queued removal covers a request the event loop has not
                // registered yet; queue order puts it after the insert.
                self.pending.abandon(id);
                let _ = self.command_tx.send(ConnectionCommand::Abandon(id));
                Err(Error::command_timeout(
                    id,
                    command_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns the number of in-flight commands.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Shuts down the connection gracefully.
    ///
    /// Every in-flight command resolves with [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that owns both transport halves.
    async fn run_event_loop(
        mut sink: Box<dyn FrameSink>,
        mut stream: Box<dyn FrameStream>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        pending: PendingCommands,
        event_handler: Arc<Mutex<Option<EventHandler>>>,
    ) {
        loop {
            tokio::select! {
                // Inbound frames from the remote end
                frame = stream.next_frame() => {
                    match frame {
                        Some(Ok(text)) => {
                            Self::dispatch_frame(&text, &pending, &event_handler);
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "Transport error");
                            break;
                        }

                        None => {
                            debug!("Transport stream ended");
                            break;
                        }
                    }
                }

                // Commands from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, reply_tx }) => {
                            Self::handle_send_command(
                                request,
                                reply_tx,
                                sink.as_mut(),
                                &pending,
                            ).await;
                        }

                        Some(ConnectionCommand::Abandon(id)) => {
                            pending.abandon(id);
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = sink.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Fail all in-flight commands on shutdown
        pending.fail_all();

        debug!("Event loop terminated");
    }

    /// Classifies one inbound frame and routes it.
    ///
    /// Replies resolve their pending entry; events go to the handler or are
    /// dropped. Never awaits anything, so a burst of frames cannot stall
    /// behind a slow consumer.
    fn dispatch_frame(
        text: &str,
        pending: &PendingCommands,
        event_handler: &Arc<Mutex<Option<EventHandler>>>,
    ) {
        match Frame::classify(text) {
            Frame::Reply { id, error: None } => {
                pending.complete(id, Reply::new(id, text));
            }

            Frame::Reply {
                id,
                error: Some(payload),
            } => {
                trace!(%id, error = payload, "Error reply");
                pending.fail(id, Error::command_failed(id, text));
            }

            Frame::Event { method } => {
                let handler = event_handler.lock();
                if let Some(ref handler) = *handler {
                    handler(Event {
                        method: method.map(str::to_string),
                        raw: text.to_string(),
                    });
                } else {
                    trace!(method = method.unwrap_or_default(), "Event dropped");
                }
            }
        }
    }

    /// Handles a send command from the Rust API.
    async fn handle_send_command(
        request: CommandRequest,
        reply_tx: ReplySlot,
        sink: &mut dyn FrameSink,
        pending: &PendingCommands,
    ) {
        let id = request.id;

        // Serialize request
        let json = match serde_json::to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                let _ = reply_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Register before sending so an immediate reply finds its slot
        if let Err(rejected) = pending.register(id, reply_tx) {
            warn!(%id, "Command id already registered");
            let _ = rejected.send(Err(Error::duplicate_command_id(id)));
            return;
        }

        // Send over the transport; a failure resolves the waiter right away
        if let Err(e) = sink.send_frame(json).await {
            pending.fail(id, e);
            return;
        }

        trace!(%id, "Command sent");
    }
}

// ============================================================================
// Tests
// ============================================================================
