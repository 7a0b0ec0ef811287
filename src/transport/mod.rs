//! Message transport abstraction
//!
//! The session never blocks on the transport: `has_message`/`receive` are
//! polled from the frame pump, and the producer side (the thread reading
//! bytes from the remote process) pushes whole messages into a thread-safe
//! queue. [`ChannelPeer`] is the in-memory implementation; hosts bridge
//! their real transport thread onto the matching [`ChannelEndpoint`].

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::trace;

use crate::wire::{Message, Value};

/// Bidirectional, non-blocking message peer attached to a session.
///
/// All methods are non-blocking; `receive` returns `None` when no message is
/// buffered. Once `is_open` reports false the peer never recovers.
pub trait DebuggerPeer {
    /// Queue a message toward the remote process
    fn put_message(&mut self, message: Value);

    /// Whether a buffered inbound message is available
    fn has_message(&mut self) -> bool;

    /// Pop the next buffered inbound message, if any
    fn receive(&mut self) -> Option<Value>;

    /// Whether the connection is still usable
    fn is_open(&self) -> bool;

    /// Tear the connection down
    fn close(&mut self);
}

/// In-memory peer backed by a pair of unbounded channels.
///
/// The channels are the thread-safe seam between the session (consumer) and
/// the transport reader thread (producer).
pub struct ChannelPeer {
    incoming: mpsc::UnboundedReceiver<Value>,
    outgoing: mpsc::UnboundedSender<Value>,
    // one-slot lookahead so has_message() can answer without consuming
    pending: Option<Value>,
    open: bool,
}

impl ChannelPeer {
    /// Create a connected peer/endpoint pair
    pub fn pair() -> (ChannelPeer, ChannelEndpoint) {
        let (to_remote_tx, to_remote_rx) = mpsc::unbounded_channel();
        let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();
        let peer = ChannelPeer {
            incoming: to_host_rx,
            outgoing: to_remote_tx,
            pending: None,
            open: true,
        };
        let endpoint = ChannelEndpoint {
            incoming: to_remote_rx,
            outgoing: to_host_tx,
        };
        (peer, endpoint)
    }
}

impl DebuggerPeer for ChannelPeer {
    fn put_message(&mut self, message: Value) {
        if !self.open {
            return;
        }
        if self.outgoing.send(message).is_err() {
            trace!("peer outgoing channel closed");
            self.open = false;
        }
    }

    fn has_message(&mut self) -> bool {
        if !self.open {
            return self.pending.is_some();
        }
        if self.pending.is_none() {
            match self.incoming.try_recv() {
                Ok(message) => self.pending = Some(message),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    trace!("peer incoming channel closed");
                    self.open = false;
                }
            }
        }
        self.pending.is_some()
    }

    fn receive(&mut self) -> Option<Value> {
        self.has_message();
        self.pending.take()
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
        self.pending = None;
        self.incoming.close();
    }
}

/// The remote half of a [`ChannelPeer`] pair.
///
/// Held by the transport reader thread in production, or directly by tests
/// acting as the remote process. Dropping it makes the peer report closed.
pub struct ChannelEndpoint {
    incoming: mpsc::UnboundedReceiver<Value>,
    outgoing: mpsc::UnboundedSender<Value>,
}

impl ChannelEndpoint {
    /// Deliver a raw value to the host session
    pub fn send_raw(&self, value: Value) -> bool {
        self.outgoing.send(value).is_ok()
    }

    /// Deliver a well-formed `(tag, payload)` message to the host session
    pub fn send(&self, tag: &str, payload: Vec<Value>) -> bool {
        self.send_raw(Message::new(tag, payload).into_value())
    }

    /// Pop the next message the session sent toward the remote, if any
    pub fn try_recv(&mut self) -> Option<Message> {
        match self.incoming.try_recv() {
            Ok(value) => Message::from_value(value),
            Err(_) => None,
        }
    }

    /// Drain everything the session has sent so far
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_recv() {
            messages.push(msg);
        }
        messages
    }
}
