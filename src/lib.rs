//! Host-side controller for a remote debug session.
//!
//! This crate owns the session lifecycle of a debug connection to a running
//! instrumented process: it drains the inbound tagged message stream under a
//! per-tick budget, decodes messages into typed events, tracks run/break
//! state, and encodes outgoing control and live-edit commands. The embedding
//! host calls [`Session::poll`] once per tick and consumes the returned
//! events; everything visual (trees, graphs, profiler displays) lives in the
//! host.
//!
//! [`Session::poll`]: session::Session::poll

pub mod common;
pub mod session;
pub mod transport;
pub mod wire;

// Re-export commonly used types
pub use common::{DebuggerConfig, Error, Result};
pub use session::{
    CameraOverride, CameraSampler, Session, SessionEvent, SessionState, StopReason,
};
pub use transport::{ChannelEndpoint, ChannelPeer, DebuggerPeer};
pub use wire::{Message, Value};
