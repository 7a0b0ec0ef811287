//! Events forwarded to external collaborators
//!
//! The session does not render anything; decoded data that belongs to a
//! collaborator (tree view, inspector, profilers, error list, log sink) is
//! queued as a [`SessionEvent`] and drained by the host from
//! [`Session::poll`](super::Session::poll).

use super::messages::{
    ErrorRecord, NetworkNodeStats, RemoteObject, ResourceUsage, VisualProfilerFrame,
};
use super::profiler::ServersProfilerMetric;

/// Why the session transitioned to `Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The remote target asked to quit (`request_quit`)
    RemoteQuit,
    /// The peer was found closed outside an explicit `stop()`
    PeerClosed,
    /// A protocol-fatal message forced the teardown
    ProtocolError,
}

impl StopReason {
    /// Human-readable status line for the host UI
    pub fn status_text(self) -> &'static str {
        "Debug session closed."
    }
}

/// A state change or forwarded payload the host must react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Session attached to a peer and entered `Running`
    Started,
    /// Session was torn down outside a plain host-requested `stop()`
    Stopped { reason: StopReason },
    /// Target confirmed a break; `reason` is the target's own description
    Breaked { can_debug: bool, reason: String },
    /// Target resumed execution
    Resumed,
    /// Target reported its process id
    RemotePid(u32),
    /// The host may grant the remote process focus-stealing permission
    FocusStealRequested(u32),
    /// The remote scene-tree snapshot was replaced; read it off the session
    SceneTreeUpdated,
    /// A remote object snapshot for the inspector
    ObjectInspected(RemoteObject),
    /// A control in the running target was clicked
    ControlClicked { name: String, type_name: String },
    /// Video memory dump with the summed byte total
    VideoMemoryUsage {
        entries: Vec<ResourceUsage>,
        total_bytes: u64,
    },
    /// The stack dump was replaced; frame variables were cleared
    StackDumpUpdated,
    /// Frame variables changed (cleared or one appended)
    StackVariablesUpdated,
    /// One joined block of remote output lines for the log sink
    Output(String),
    /// One performance-monitor sample, already recorded in the history ring
    PerformanceFrame(Vec<f32>),
    /// Visual profiler frame, forwarded verbatim
    VisualProfile(VisualProfilerFrame),
    /// Servers/script profiler frame with signatures resolved
    ServersProfile {
        metric: ServersProfilerMetric,
        total: bool,
    },
    /// Network profiler per-node counters
    NetworkProfile(Vec<NetworkNodeStats>),
    /// Network bandwidth totals in bytes per second
    NetworkBandwidth { incoming: f64, outgoing: f64 },
    /// One decoded error/warning record; counters already incremented
    ErrorReported(ErrorRecord),
    /// The target asked the host to end the session
    StopRequested,
}
