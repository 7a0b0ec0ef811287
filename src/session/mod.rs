//! Debug session core: state machine, dispatcher, command encoder, frame pump

pub mod events;
pub mod messages;
pub mod path_cache;
pub mod perf;
pub mod profiler;
pub mod state;

pub use events::{SessionEvent, StopReason};
pub use messages::{
    ErrorRecord, Inbound, NetworkNodeStats, RemoteObject, ResourceUsage, SceneTreeNode,
    ScriptFunctionInfo, ServerFunction, ServerInfo, ServersProfilerFrame, StackFrame,
    StackVariable, VariableScope, VisualProfilerArea, VisualProfilerFrame,
};
pub use path_cache::PathCache;
pub use perf::PerfHistory;
pub use profiler::{ResolvedFunction, ServersProfilerMetric, SignatureTable};
pub use state::{Camera3dState, CameraOverride, CameraSampler, Session, SessionState};
