//! Debug session state machine
//!
//! Manages the lifecycle of a debug session from `start(peer)` through
//! teardown. The session is driven by confirmed events from the target:
//! `debug_break()` only sends the break command, and the transition to the
//! broken state happens when the matching `debug_enter` message arrives.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::common::{DebuggerConfig, Error, Result};
use crate::transport::DebuggerPeer;
use crate::wire::{Message, Projection, Transform2D, Transform3D, Value};

use super::events::{SessionEvent, StopReason};
use super::messages::{DecodeError, Inbound, SceneTreeNode, StackFrame, StackVariable};
use super::path_cache::PathCache;
use super::perf::PerfHistory;
use super::profiler::SignatureTable;

/// Coarse session state derived from peer attachment and break status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No peer attached, or the peer has closed
    Disconnected,
    /// Connected, target executing
    Running,
    /// Connected, target suspended at a debug point
    Broken,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Running => write!(f, "running"),
            Self::Broken => write!(f, "broken"),
        }
    }
}

/// Which camera the target's viewport is forced to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOverride {
    None,
    /// Mirror the host's 2D editor viewport
    TwoD,
    /// Mirror one of the host's 3D editor viewports
    ThreeD(usize),
}

/// Snapshot of a host 3D camera for an override-transform push
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera3dState {
    pub transform: Transform3D,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
}

/// Host hook the frame pump samples camera state through while an override
/// is active. Returning `None` skips the push for that tick.
pub trait CameraSampler {
    fn camera_2d(&self) -> Option<Transform2D>;
    fn camera_3d(&self, viewport: usize) -> Option<Camera3dState>;
}

/// Sampler for hosts without editor viewports (headless harnesses, tests)
impl CameraSampler for () {
    fn camera_2d(&self) -> Option<Transform2D> {
        None
    }
    fn camera_3d(&self, _viewport: usize) -> Option<Camera3dState> {
        None
    }
}

/// The single active debug connection to a running target process.
///
/// At most one session is active at a time; `start()` while connected
/// implicitly stops the previous session first. All state lives here and is
/// reset by `stop()`, except the error/warning counters which reset on
/// `start()` or an explicit `clear_errors()`.
pub struct Session {
    config: DebuggerConfig,
    peer: Option<Box<dyn DebuggerPeer>>,
    breaked: bool,
    can_debug: bool,
    remote_pid: Option<u32>,
    skip_breakpoints: bool,
    live_debug: bool,
    camera_override: CameraOverride,
    path_cache: PathCache,
    perf: PerfHistory,
    signatures: SignatureTable,
    scene_tree: Option<SceneTreeNode>,
    stack: Vec<StackFrame>,
    stack_variables: Vec<StackVariable>,
    error_count: u64,
    warning_count: u64,
    events: VecDeque<SessionEvent>,
}

impl Session {
    pub fn new(config: DebuggerConfig) -> Self {
        let perf_cap = config.perf_history_cap;
        Self {
            config,
            peer: None,
            breaked: false,
            can_debug: false,
            remote_pid: None,
            skip_breakpoints: false,
            live_debug: false,
            camera_override: CameraOverride::None,
            path_cache: PathCache::new(),
            perf: PerfHistory::new(perf_cap),
            signatures: SignatureTable::new(),
            scene_tree: None,
            stack: Vec::new(),
            stack_variables: Vec::new(),
            error_count: 0,
            warning_count: 0,
            events: VecDeque::new(),
        }
    }

    // === lifecycle ===

    /// Attach a connected peer and enter the running state.
    ///
    /// Any pre-existing session is stopped first; error/warning counters and
    /// the performance history reset here, not in `stop()`.
    pub fn start(&mut self, peer: Box<dyn DebuggerPeer>) {
        self.error_count = 0;
        self.warning_count = 0;
        self.stop();

        self.peer = Some(peer);
        self.perf.clear();
        self.breaked = false;
        self.can_debug = true;
        self.camera_override = CameraOverride::None;

        info!("debug session started");
        self.events.push_back(SessionEvent::Started);
    }

    /// Tear the session down: close the peer and reset session-lifetime
    /// state. Idempotent; safe to call mid-drain.
    pub fn stop(&mut self) {
        self.breaked = false;
        self.can_debug = false;
        self.remote_pid = None;
        self.clear_execution();
        self.scene_tree = None;
        self.perf.clear();
        self.path_cache.clear();
        self.signatures.clear();

        if let Some(mut peer) = self.peer.take() {
            peer.close();
            info!("debug session stopped");
        }
    }

    fn stop_and_notify(&mut self, reason: StopReason) {
        let was_attached = self.peer.is_some();
        self.stop();
        if was_attached {
            info!(?reason, "{}", reason.status_text());
        }
        self.events.push_back(SessionEvent::Stopped { reason });
    }

    // === state queries ===

    /// A session is active while a peer is attached and still open
    pub fn is_session_active(&self) -> bool {
        self.peer.as_ref().is_some_and(|p| p.is_open())
    }

    pub fn state(&self) -> SessionState {
        if !self.is_session_active() {
            SessionState::Disconnected
        } else if self.breaked {
            SessionState::Broken
        } else {
            SessionState::Running
        }
    }

    pub fn is_breaked(&self) -> bool {
        self.breaked
    }

    pub fn can_debug(&self) -> bool {
        self.can_debug
    }

    pub fn remote_pid(&self) -> Option<u32> {
        self.remote_pid
    }

    pub fn is_skip_breakpoints(&self) -> bool {
        self.skip_breakpoints
    }

    pub fn is_live_debug_enabled(&self) -> bool {
        self.live_debug
    }

    pub fn camera_override(&self) -> CameraOverride {
        self.camera_override
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn warning_count(&self) -> u64 {
        self.warning_count
    }

    /// Latest remote scene-tree snapshot, if one arrived this session
    pub fn scene_tree(&self) -> Option<&SceneTreeNode> {
        self.scene_tree.as_ref()
    }

    /// Current stack dump, innermost frame first
    pub fn stack(&self) -> &[StackFrame] {
        &self.stack
    }

    /// Variables of the currently inspected stack frame
    pub fn stack_variables(&self) -> &[StackVariable] {
        &self.stack_variables
    }

    pub fn perf_history(&self) -> &PerfHistory {
        &self.perf
    }

    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    /// Explicit reset of the error/warning counters (the error list's clear)
    pub fn clear_errors(&mut self) {
        self.error_count = 0;
        self.warning_count = 0;
    }

    // === control operations ===

    /// Ask the target to suspend. The session stays `Running` until the
    /// target confirms with a `debug_enter` message; there is no
    /// acknowledgement timeout.
    pub fn debug_break(&mut self) -> Result<()> {
        if self.state() != SessionState::Running {
            return Err(Error::invalid_state("break", &self.state().to_string()));
        }
        self.put_msg("break", vec![]);
        Ok(())
    }

    /// Resume execution.
    pub fn debug_continue(&mut self) -> Result<()> {
        self.ensure_broken("continue")?;

        // Focus stealing is only granted for a process this host launched;
        // the host decides, we just surface the pid.
        if let Some(pid) = self.remote_pid {
            self.events.push_back(SessionEvent::FocusStealRequested(pid));
        }

        self.clear_execution();
        self.put_msg("continue", vec![]);
        Ok(())
    }

    /// Step over the current line.
    pub fn debug_next(&mut self) -> Result<()> {
        self.ensure_broken("step over")?;
        self.put_msg("next", vec![]);
        self.clear_execution();
        Ok(())
    }

    /// Step into the current line.
    pub fn debug_step(&mut self) -> Result<()> {
        self.ensure_broken("step into")?;
        self.put_msg("step", vec![]);
        self.clear_execution();
        Ok(())
    }

    fn ensure_broken(&self, action: &str) -> Result<()> {
        if !self.breaked || !self.can_debug {
            return Err(Error::invalid_state(action, &self.state().to_string()));
        }
        Ok(())
    }

    /// Clear the highlighted execution line: drop the stack dump and the
    /// selected frame's variables.
    fn clear_execution(&mut self) {
        if self.stack.is_empty() && self.stack_variables.is_empty() {
            return;
        }
        self.stack.clear();
        self.stack_variables.clear();
        self.events.push_back(SessionEvent::StackDumpUpdated);
    }

    // === requests toward the target ===

    pub fn set_skip_breakpoints(&mut self, skip: bool) {
        self.skip_breakpoints = skip;
        self.put_msg("set_skip_breakpoints", vec![Value::Bool(skip)]);
    }

    pub fn set_breakpoint(&mut self, path: &str, line: u32, enabled: bool) {
        self.put_msg(
            "breakpoint",
            vec![Value::Str(path.into()), Value::from(line), Value::Bool(enabled)],
        );
    }

    pub fn reload_scripts(&mut self) {
        self.put_msg("reload_scripts", vec![]);
    }

    pub fn request_scene_tree(&mut self) {
        self.put_msg("scene:request_scene_tree", vec![]);
    }

    pub fn request_video_memory(&mut self) {
        self.put_msg("core:memory", vec![]);
    }

    pub fn inspect_object(&mut self, id: u64) {
        self.put_msg("scene:inspect_object", vec![Value::Object(id)]);
    }

    pub fn update_object_property(&mut self, id: u64, property: &str, value: Value) {
        self.put_msg(
            "scene:set_object_property",
            vec![Value::Object(id), Value::Str(property.into()), value],
        );
    }

    pub fn save_node(&mut self, id: u64, file: &str) {
        self.put_msg(
            "scene:save_node",
            vec![Value::Object(id), Value::Str(file.into())],
        );
    }

    /// Request the variables of one stack frame; they arrive as a
    /// `stack_frame_vars` clear followed by one `stack_frame_var` each.
    pub fn request_stack_frame_vars(&mut self, frame: u32) {
        self.put_msg("get_stack_frame_vars", vec![Value::from(frame)]);
    }

    // === profilers ===

    pub fn set_network_profiling(&mut self, enabled: bool) {
        self.put_msg("profiler:network", vec![Value::Bool(enabled)]);
    }

    pub fn set_visual_profiling(&mut self, enabled: bool) {
        self.put_msg("profiler:visual", vec![Value::Bool(enabled)]);
    }

    /// Enable or disable the servers/script profiler. Enabling clears stale
    /// signature definitions and passes the clamped max-functions option.
    pub fn set_servers_profiling(&mut self, enabled: bool) {
        let mut payload = vec![Value::Bool(enabled)];
        if enabled {
            self.signatures.clear();
            payload.push(Value::List(vec![Value::from(
                self.config.clamped_max_functions(),
            )]));
        }
        self.put_msg("profiler:servers", payload);
    }

    // === live edit ===

    pub fn set_live_debugging(&mut self, enabled: bool) {
        self.live_debug = enabled;
    }

    pub fn set_live_edit_root(&mut self, path: &str, scene_file: &str) {
        self.put_msg(
            "scene:live_set_root",
            vec![Value::NodePath(path.into()), Value::Str(scene_file.into())],
        );
    }

    pub fn live_create_node(&mut self, parent: &str, type_name: &str, name: &str) {
        if self.live_debug {
            self.put_msg(
                "scene:live_create_node",
                vec![
                    Value::NodePath(parent.into()),
                    Value::Str(type_name.into()),
                    Value::Str(name.into()),
                ],
            );
        }
    }

    pub fn live_instance_node(&mut self, parent: &str, scene_path: &str, name: &str) {
        if self.live_debug {
            self.put_msg(
                "scene:live_instance_node",
                vec![
                    Value::NodePath(parent.into()),
                    Value::Str(scene_path.into()),
                    Value::Str(name.into()),
                ],
            );
        }
    }

    pub fn live_remove_node(&mut self, at: &str) {
        if self.live_debug {
            self.put_msg("scene:live_remove_node", vec![Value::NodePath(at.into())]);
        }
    }

    pub fn live_remove_and_keep_node(&mut self, at: &str, keep_id: u64) {
        if self.live_debug {
            self.put_msg(
                "scene:live_remove_and_keep_node",
                vec![Value::NodePath(at.into()), Value::Object(keep_id)],
            );
        }
    }

    pub fn live_restore_node(&mut self, id: u64, at: &str, at_position: i64) {
        if self.live_debug {
            self.put_msg(
                "scene:live_restore_node",
                vec![
                    Value::Object(id),
                    Value::NodePath(at.into()),
                    Value::Int(at_position),
                ],
            );
        }
    }

    pub fn live_duplicate_node(&mut self, at: &str, new_name: &str) {
        if self.live_debug {
            self.put_msg(
                "scene:live_duplicate_node",
                vec![Value::NodePath(at.into()), Value::Str(new_name.into())],
            );
        }
    }

    pub fn live_reparent_node(&mut self, at: &str, new_place: &str, new_name: &str, at_position: i64) {
        if self.live_debug {
            self.put_msg(
                "scene:live_reparent_node",
                vec![
                    Value::NodePath(at.into()),
                    Value::NodePath(new_place.into()),
                    Value::Str(new_name.into()),
                    Value::Int(at_position),
                ],
            );
        }
    }

    /// Mirror a property change onto the live node at `path`
    pub fn live_node_property(&mut self, path: &str, property: &str, value: Value) {
        if !self.live_debug || !self.is_session_active() {
            return;
        }
        let id = self.node_path_id(path);
        self.put_msg(
            "scene:live_node_prop",
            vec![Value::from(id), Value::Str(property.into()), value],
        );
    }

    /// Property change whose value is a resource, referenced by path
    pub fn live_node_property_res(&mut self, path: &str, property: &str, resource_path: &str) {
        if !self.live_debug || !self.is_session_active() {
            return;
        }
        let id = self.node_path_id(path);
        self.put_msg(
            "scene:live_node_prop_res",
            vec![
                Value::from(id),
                Value::Str(property.into()),
                Value::Str(resource_path.into()),
            ],
        );
    }

    pub fn live_resource_property(&mut self, resource_path: &str, property: &str, value: Value) {
        if !self.live_debug || !self.is_session_active() {
            return;
        }
        let id = self.resource_path_id(resource_path);
        self.put_msg(
            "scene:live_res_prop",
            vec![Value::from(id), Value::Str(property.into()), value],
        );
    }

    pub fn live_resource_property_res(&mut self, resource_path: &str, property: &str, value_path: &str) {
        if !self.live_debug || !self.is_session_active() {
            return;
        }
        let id = self.resource_path_id(resource_path);
        self.put_msg(
            "scene:live_res_prop_res",
            vec![
                Value::from(id),
                Value::Str(property.into()),
                Value::Str(value_path.into()),
            ],
        );
    }

    /// Mirror a method call onto the live node at `path`
    pub fn live_node_call(&mut self, path: &str, method: &str, args: Vec<Value>) {
        if !self.live_debug || !self.is_session_active() {
            return;
        }
        let id = self.node_path_id(path);
        let mut payload = vec![Value::from(id), Value::Str(method.into())];
        payload.extend(args);
        self.put_msg("scene:live_node_call", payload);
    }

    pub fn live_resource_call(&mut self, resource_path: &str, method: &str, args: Vec<Value>) {
        if !self.live_debug || !self.is_session_active() {
            return;
        }
        let id = self.resource_path_id(resource_path);
        let mut payload = vec![Value::from(id), Value::Str(method.into())];
        payload.extend(args);
        self.put_msg("scene:live_res_call", payload);
    }

    /// Intern a node path; a newly assigned id is registered with the target
    /// before any command references it.
    fn node_path_id(&mut self, path: &str) -> u32 {
        let interned = self.path_cache.intern_node_path(path);
        if interned.newly_assigned {
            self.put_msg(
                "scene:live_node_path",
                vec![Value::NodePath(path.into()), Value::from(interned.id)],
            );
        }
        interned.id
    }

    fn resource_path_id(&mut self, path: &str) -> u32 {
        let interned = self.path_cache.intern_resource_path(path);
        if interned.newly_assigned {
            self.put_msg(
                "scene:live_res_path",
                vec![Value::Str(path.into()), Value::from(interned.id)],
            );
        }
        interned.id
    }

    // === camera override ===

    /// Switch the camera-override mode, notifying the target when the mode
    /// class (none/2D/3D) changes. Transform pushes happen in `poll`.
    pub fn set_camera_override(&mut self, mode: CameraOverride) {
        let was_2d = self.camera_override == CameraOverride::TwoD;
        let was_3d = matches!(self.camera_override, CameraOverride::ThreeD(_));
        let is_2d = mode == CameraOverride::TwoD;
        let is_3d = matches!(mode, CameraOverride::ThreeD(_));

        if is_2d && !was_2d {
            self.put_msg("scene:override_camera_2D:set", vec![Value::Bool(true)]);
        } else if !is_2d && was_2d {
            self.put_msg("scene:override_camera_2D:set", vec![Value::Bool(false)]);
        }
        if is_3d && !was_3d {
            self.put_msg("scene:override_camera_3D:set", vec![Value::Bool(true)]);
        } else if !is_3d && was_3d {
            self.put_msg("scene:override_camera_3D:set", vec![Value::Bool(false)]);
        }

        self.camera_override = mode;
    }

    fn push_camera_transform(&mut self, cameras: &dyn CameraSampler) {
        match self.camera_override {
            CameraOverride::None => {}
            CameraOverride::TwoD => {
                if let Some(transform) = cameras.camera_2d() {
                    self.put_msg(
                        "scene:override_camera_2D:transform",
                        vec![transform.to_value()],
                    );
                }
            }
            CameraOverride::ThreeD(viewport) => {
                if let Some(cam) = cameras.camera_3d(viewport) {
                    self.put_msg(
                        "scene:override_camera_3D:transform",
                        vec![
                            cam.transform.to_value(),
                            Value::Bool(cam.projection.is_perspective()),
                            Value::from(cam.projection.scalar()),
                            Value::from(cam.near),
                            Value::from(cam.far),
                        ],
                    );
                }
            }
        }
    }

    // === frame pump ===

    /// Per-tick entry point: push the camera override if active, then drain
    /// buffered inbound messages under the configured time budget, and
    /// finally detect an unexpectedly closed peer. Messages left in the
    /// queue when the budget runs out are picked up next tick, in order.
    ///
    /// Returns every event queued since the last drain, in order.
    pub fn poll(&mut self, cameras: &dyn CameraSampler) -> Vec<SessionEvent> {
        if self.is_session_active() {
            self.push_camera_transform(cameras);
        }

        let deadline = Instant::now() + self.config.tick_budget();
        loop {
            // a dispatch may have stopped the session; re-check liveness
            if !self.is_session_active() {
                break;
            }
            let raw = match self.peer.as_mut() {
                Some(peer) => peer.receive(),
                None => None,
            };
            let Some(raw) = raw else {
                break;
            };

            match Message::from_value(raw) {
                Some(message) => self.dispatch(&message.tag, message.payload),
                None => {
                    warn!("invalid message envelope received from peer");
                    self.stop_and_notify(StopReason::ProtocolError);
                    break;
                }
            }

            // budget bounds the host-thread stall, checked after each
            // message so every tick makes progress
            if Instant::now() > deadline {
                break;
            }
        }

        if self.peer.is_some() && !self.is_session_active() {
            warn!("debug session closed unexpectedly");
            self.stop_and_notify(StopReason::PeerClosed);
        }

        self.take_events()
    }

    /// Drain queued events without running the pump. `poll` already returns
    /// them; this exists for hosts that issue control calls between ticks.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    // === dispatcher ===

    fn dispatch(&mut self, tag: &str, payload: Vec<Value>) {
        // The stack dump request goes out before the payload is inspected,
        // so it precedes every other command the break triggers.
        if tag == "debug_enter" {
            self.put_msg("get_stack_dump", vec![]);
        }

        match Inbound::decode(tag, &payload) {
            Ok(message) => self.handle_inbound(message),
            Err(DecodeError::Malformed(what)) => {
                warn!(tag, what, "dropping malformed message");
            }
            Err(DecodeError::UnknownTag) => {
                warn!(tag, "unknown message");
            }
            Err(DecodeError::Fatal(what)) => {
                warn!(tag, what, "protocol violation, closing session");
                self.stop_and_notify(StopReason::ProtocolError);
            }
        }
    }

    fn handle_inbound(&mut self, message: Inbound) {
        match message {
            Inbound::DebugEnter {
                can_continue,
                reason,
            } => {
                debug!(can_continue, %reason, "target entered break");
                self.breaked = true;
                self.can_debug = can_continue;
                self.events.push_back(SessionEvent::Breaked {
                    can_debug: can_continue,
                    reason,
                });
            }
            Inbound::DebugExit => {
                debug!("target resumed");
                self.breaked = false;
                self.can_debug = false;
                self.clear_execution();
                self.events.push_back(SessionEvent::Resumed);
            }
            Inbound::SetPid(pid) => {
                self.remote_pid = Some(pid);
                self.events.push_back(SessionEvent::RemotePid(pid));
            }
            Inbound::ClickedControl { name, type_name } => {
                self.events
                    .push_back(SessionEvent::ControlClicked { name, type_name });
            }
            Inbound::SceneTree(tree) => {
                self.scene_tree = Some(tree);
                self.events.push_back(SessionEvent::SceneTreeUpdated);
            }
            Inbound::InspectObject(object) => {
                self.events.push_back(SessionEvent::ObjectInspected(object));
            }
            Inbound::MemoryUsage(entries) => {
                let total_bytes = entries.iter().map(|e| e.vram).sum();
                self.events.push_back(SessionEvent::VideoMemoryUsage {
                    entries,
                    total_bytes,
                });
            }
            Inbound::StackDump(frames) => {
                self.stack = frames;
                self.stack_variables.clear();
                self.events.push_back(SessionEvent::StackDumpUpdated);
            }
            Inbound::StackFrameVars => {
                self.stack_variables.clear();
                self.events.push_back(SessionEvent::StackVariablesUpdated);
            }
            Inbound::StackFrameVar(variable) => {
                self.stack_variables.push(variable);
                self.events.push_back(SessionEvent::StackVariablesUpdated);
            }
            Inbound::Output(lines) => {
                self.events.push_back(SessionEvent::Output(lines.join("\n")));
            }
            Inbound::PerformanceFrame(values) => {
                self.perf.push(values.clone());
                self.events.push_back(SessionEvent::PerformanceFrame(values));
            }
            Inbound::VisualProfileFrame(frame) => {
                self.events.push_back(SessionEvent::VisualProfile(frame));
            }
            Inbound::FunctionSignature { id, name } => {
                self.signatures.insert(id, name);
            }
            Inbound::ServersProfileFrame { frame, total } => {
                let metric = self.signatures.resolve_frame(frame);
                self.events
                    .push_back(SessionEvent::ServersProfile { metric, total });
            }
            Inbound::NetworkProfileFrame(stats) => {
                self.events.push_back(SessionEvent::NetworkProfile(stats));
            }
            Inbound::NetworkBandwidth { incoming, outgoing } => {
                self.events
                    .push_back(SessionEvent::NetworkBandwidth { incoming, outgoing });
            }
            Inbound::Error(record) => {
                if record.warning {
                    self.warning_count += 1;
                } else {
                    self.error_count += 1;
                }
                self.events.push_back(SessionEvent::ErrorReported(record));
            }
            Inbound::RequestQuit => {
                self.events.push_back(SessionEvent::StopRequested);
                self.stop_and_notify(StopReason::RemoteQuit);
            }
        }
    }

    // === outgoing ===

    /// Queue one tagged message toward the target. Dropped silently when no
    /// session is active, so callers don't need to gate every request.
    fn put_msg(&mut self, tag: &str, payload: Vec<Value>) {
        if !self.is_session_active() {
            return;
        }
        if let Some(peer) = self.peer.as_mut() {
            peer.put_message(Message::new(tag, payload).into_value());
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DebuggerConfig::default())
    }
}
