//! Typed inbound messages
//!
//! Every recognized `(tag, payload)` pair decodes into one [`Inbound`]
//! variant here, at the dispatcher boundary, so the rest of the session works
//! with statically typed data. Shape mismatches are message-local and drop
//! the message; the two protocol-fatal shapes (bad envelope, `debug_enter`
//! arity) are flagged so the session tears down.

use crate::wire::Value;

/// A decoded inbound message from the target process
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    DebugEnter { can_continue: bool, reason: String },
    DebugExit,
    SetPid(u32),
    ClickedControl { name: String, type_name: String },
    SceneTree(SceneTreeNode),
    InspectObject(RemoteObject),
    MemoryUsage(Vec<ResourceUsage>),
    StackDump(Vec<StackFrame>),
    StackFrameVars,
    StackFrameVar(StackVariable),
    Output(Vec<String>),
    PerformanceFrame(Vec<f32>),
    VisualProfileFrame(VisualProfilerFrame),
    FunctionSignature { id: u64, name: String },
    ServersProfileFrame { frame: ServersProfilerFrame, total: bool },
    NetworkProfileFrame(Vec<NetworkNodeStats>),
    NetworkBandwidth { incoming: f64, outgoing: f64 },
    Error(ErrorRecord),
    RequestQuit,
}

/// Why a message failed to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Recognized tag, bad payload shape: drop the message, keep the session
    Malformed(&'static str),
    /// Protocol violation that invalidates the whole session
    Fatal(&'static str),
    /// Tag outside the recognized set
    UnknownTag,
}

/// One frame of a stack dump or an error callstack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub file: String,
    pub function: String,
    pub line: u32,
}

/// Variable scope within the currently selected stack frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
    Local,
    Member,
    Global,
}

/// One local/member/global variable of the selected frame
#[derive(Debug, Clone, PartialEq)]
pub struct StackVariable {
    pub name: String,
    pub scope: VariableScope,
    pub value: Value,
}

/// One resource reported by the video-memory usage dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUsage {
    pub path: String,
    pub type_name: String,
    pub format: String,
    pub vram: u64,
}

/// A node of the remote scene-tree snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTreeNode {
    pub name: String,
    pub type_name: String,
    pub object_id: u64,
    pub children: Vec<SceneTreeNode>,
}

impl SceneTreeNode {
    /// Total node count including this node
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// A remote object snapshot handed to the inspector
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    pub id: u64,
    pub class_name: String,
    pub properties: Vec<(String, Value)>,
}

/// One timed area of a visual-profiler frame
#[derive(Debug, Clone, PartialEq)]
pub struct VisualProfilerArea {
    pub name: String,
    pub cpu_msec: f32,
    pub gpu_msec: f32,
}

/// A decoded visual-profiler frame
#[derive(Debug, Clone, PartialEq)]
pub struct VisualProfilerFrame {
    pub frame_number: u64,
    pub areas: Vec<VisualProfilerArea>,
}

/// Per-function timing inside one server category
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFunction {
    pub name: String,
    pub time: f32,
}

/// One server category of a servers-profiler frame
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub functions: Vec<ServerFunction>,
}

/// Script-function timings keyed by signature id
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFunctionInfo {
    pub signature_id: u64,
    pub call_count: u32,
    pub total_time: f32,
    pub self_time: f32,
}

/// A decoded servers-profiler frame
#[derive(Debug, Clone, PartialEq)]
pub struct ServersProfilerFrame {
    pub frame_number: u64,
    pub frame_time: f32,
    pub idle_time: f32,
    pub physics_time: f32,
    pub physics_frame_time: f32,
    pub script_time: f32,
    pub servers: Vec<ServerInfo>,
    pub script_functions: Vec<ScriptFunctionInfo>,
}

/// Per-node network profiler counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkNodeStats {
    pub object_id: u64,
    pub node_path: String,
    pub incoming_rpc: u32,
    pub incoming_rset: u32,
    pub outgoing_rpc: u32,
    pub outgoing_rset: u32,
}

/// A decoded error/warning record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    pub warning: bool,
    pub source_file: String,
    pub source_line: u32,
    pub source_function: String,
    /// Human-readable message, may be empty when only a native condition exists
    pub message: String,
    /// Native condition string from the runtime, may be empty
    pub condition: String,
    pub callstack: Vec<StackFrame>,
}

impl ErrorRecord {
    /// `H:MM:SS:MMMM` timestamp, the format the error list displays
    pub fn timestamp(&self) -> String {
        format!(
            "{}:{:02}:{:02}:{:04}",
            self.hour, self.minute, self.second, self.millisecond
        )
    }
}

// === payload accessors ===

fn get_bool(payload: &[Value], i: usize, what: &'static str) -> Result<bool, DecodeError> {
    payload
        .get(i)
        .and_then(Value::as_bool)
        .ok_or(DecodeError::Malformed(what))
}

fn get_u64(payload: &[Value], i: usize, what: &'static str) -> Result<u64, DecodeError> {
    payload
        .get(i)
        .and_then(Value::as_u64)
        .ok_or(DecodeError::Malformed(what))
}

fn get_u32(payload: &[Value], i: usize, what: &'static str) -> Result<u32, DecodeError> {
    u32::try_from(get_u64(payload, i, what)?).map_err(|_| DecodeError::Malformed(what))
}

fn get_u16(payload: &[Value], i: usize, what: &'static str) -> Result<u16, DecodeError> {
    u16::try_from(get_u64(payload, i, what)?).map_err(|_| DecodeError::Malformed(what))
}

fn get_u8(payload: &[Value], i: usize, what: &'static str) -> Result<u8, DecodeError> {
    u8::try_from(get_u64(payload, i, what)?).map_err(|_| DecodeError::Malformed(what))
}

fn get_f32(payload: &[Value], i: usize, what: &'static str) -> Result<f32, DecodeError> {
    payload
        .get(i)
        .and_then(Value::as_f32)
        .ok_or(DecodeError::Malformed(what))
}

fn get_f64(payload: &[Value], i: usize, what: &'static str) -> Result<f64, DecodeError> {
    payload
        .get(i)
        .and_then(Value::as_f64)
        .ok_or(DecodeError::Malformed(what))
}

fn get_str(payload: &[Value], i: usize, what: &'static str) -> Result<String, DecodeError> {
    payload
        .get(i)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DecodeError::Malformed(what))
}

fn get_list<'a>(
    payload: &'a [Value],
    i: usize,
    what: &'static str,
) -> Result<&'a [Value], DecodeError> {
    payload
        .get(i)
        .and_then(Value::as_list)
        .ok_or(DecodeError::Malformed(what))
}

impl Inbound {
    /// Decode one tagged message into its typed form.
    pub fn decode(tag: &str, payload: &[Value]) -> Result<Inbound, DecodeError> {
        match tag {
            "debug_enter" => {
                if payload.len() != 2 {
                    return Err(DecodeError::Fatal("debug_enter expects exactly 2 values"));
                }
                Ok(Inbound::DebugEnter {
                    can_continue: get_bool(payload, 0, "debug_enter can_continue")?,
                    reason: get_str(payload, 1, "debug_enter reason")?,
                })
            }
            "debug_exit" => Ok(Inbound::DebugExit),
            "set_pid" => Ok(Inbound::SetPid(get_u32(payload, 0, "set_pid pid")?)),
            "scene:click_ctrl" => Ok(Inbound::ClickedControl {
                name: get_str(payload, 0, "click_ctrl name")?,
                type_name: get_str(payload, 1, "click_ctrl type")?,
            }),
            "scene:scene_tree" => Ok(Inbound::SceneTree(decode_scene_tree(payload)?)),
            "scene:inspect_object" => Ok(Inbound::InspectObject(decode_remote_object(payload)?)),
            "memory:usage" => Ok(Inbound::MemoryUsage(decode_memory_usage(payload)?)),
            "stack_dump" => Ok(Inbound::StackDump(decode_stack_dump(payload)?)),
            "stack_frame_vars" => Ok(Inbound::StackFrameVars),
            "stack_frame_var" => Ok(Inbound::StackFrameVar(decode_stack_variable(payload)?)),
            "output" => {
                let lines = get_list(payload, 0, "output lines")?;
                let lines = lines
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or(DecodeError::Malformed("output line"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Inbound::Output(lines))
            }
            "performance:profile_frame" => {
                let values = payload
                    .iter()
                    .map(|v| v.as_f32().ok_or(DecodeError::Malformed("perf value")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Inbound::PerformanceFrame(values))
            }
            "visual:profile_frame" => Ok(Inbound::VisualProfileFrame(decode_visual_frame(payload)?)),
            "servers:function_signature" => Ok(Inbound::FunctionSignature {
                id: get_u64(payload, 0, "function_signature id")?,
                name: get_str(payload, 1, "function_signature name")?,
            }),
            "servers:profile_frame" => Ok(Inbound::ServersProfileFrame {
                frame: decode_servers_frame(payload)?,
                total: false,
            }),
            "servers:profile_total" => Ok(Inbound::ServersProfileFrame {
                frame: decode_servers_frame(payload)?,
                total: true,
            }),
            "network:profile_frame" => Ok(Inbound::NetworkProfileFrame(decode_network_frame(payload)?)),
            "network:bandwidth" => Ok(Inbound::NetworkBandwidth {
                incoming: get_f64(payload, 0, "bandwidth incoming")?,
                outgoing: get_f64(payload, 1, "bandwidth outgoing")?,
            }),
            "error" => Ok(Inbound::Error(decode_error_record(payload)?)),
            "request_quit" => Ok(Inbound::RequestQuit),
            _ => Err(DecodeError::UnknownTag),
        }
    }
}

/// Scene tree snapshot: flat pre-order traversal of
/// `[child_count, name, type, object_id]` groups.
///
/// The traversal runs on an explicit stack and child counts are checked
/// against the remaining payload before any allocation, so a hostile count
/// or a deeply nested payload stays a message-local decode failure.
fn decode_scene_tree(payload: &[Value]) -> Result<SceneTreeNode, DecodeError> {
    let mut pos = 0;
    let mut stack = vec![decode_scene_node(payload, &mut pos)?];

    while let Some((node, pending_children)) = stack.pop() {
        if pending_children > 0 {
            stack.push((node, pending_children - 1));
            stack.push(decode_scene_node(payload, &mut pos)?);
            continue;
        }
        match stack.pop() {
            Some((mut parent, parent_pending)) => {
                parent.children.push(node);
                stack.push((parent, parent_pending));
            }
            None => {
                if pos != payload.len() {
                    return Err(DecodeError::Malformed("scene_tree trailing data"));
                }
                return Ok(node);
            }
        }
    }
    Err(DecodeError::Malformed("scene_tree empty"))
}

fn decode_scene_node(
    payload: &[Value],
    pos: &mut usize,
) -> Result<(SceneTreeNode, usize), DecodeError> {
    let child_count = get_u64(payload, *pos, "scene_tree child_count")?;
    let name = get_str(payload, *pos + 1, "scene_tree name")?;
    let type_name = get_str(payload, *pos + 2, "scene_tree type")?;
    let object_id = get_u64(payload, *pos + 3, "scene_tree object_id")?;
    *pos += 4;

    // every claimed child needs at least a 4-element group of its own
    let remaining_groups = (payload.len() - *pos) / 4;
    let child_count = usize::try_from(child_count)
        .ok()
        .filter(|&n| n <= remaining_groups)
        .ok_or(DecodeError::Malformed("scene_tree child_count"))?;

    Ok((
        SceneTreeNode {
            name,
            type_name,
            object_id,
            children: Vec::with_capacity(child_count),
        },
        child_count,
    ))
}

fn decode_remote_object(payload: &[Value]) -> Result<RemoteObject, DecodeError> {
    let id = get_u64(payload, 0, "inspect_object id")?;
    let class_name = get_str(payload, 1, "inspect_object class")?;
    let raw_props = get_list(payload, 2, "inspect_object properties")?;

    let mut properties = Vec::with_capacity(raw_props.len());
    for prop in raw_props {
        let pair = prop
            .as_list()
            .ok_or(DecodeError::Malformed("inspect_object property pair"))?;
        let name = pair
            .first()
            .and_then(Value::as_str)
            .ok_or(DecodeError::Malformed("inspect_object property name"))?;
        let value = pair
            .get(1)
            .cloned()
            .ok_or(DecodeError::Malformed("inspect_object property value"))?;
        properties.push((name.to_string(), value));
    }
    Ok(RemoteObject {
        id,
        class_name,
        properties,
    })
}

/// Video memory usage: flat stride-4 list of `[path, type, format, vram]`.
fn decode_memory_usage(payload: &[Value]) -> Result<Vec<ResourceUsage>, DecodeError> {
    if payload.len() % 4 != 0 {
        return Err(DecodeError::Malformed("memory usage stride"));
    }
    let mut usages = Vec::with_capacity(payload.len() / 4);
    for chunk in payload.chunks_exact(4) {
        usages.push(ResourceUsage {
            path: get_str(chunk, 0, "memory usage path")?,
            type_name: get_str(chunk, 1, "memory usage type")?,
            format: get_str(chunk, 2, "memory usage format")?,
            vram: get_u64(chunk, 3, "memory usage vram")?,
        });
    }
    Ok(usages)
}

/// Stack dump: one list of `{file, func, line}` maps, innermost frame first.
fn decode_stack_dump(payload: &[Value]) -> Result<Vec<StackFrame>, DecodeError> {
    let raw_frames = get_list(payload, 0, "stack_dump frames")?;
    let mut frames = Vec::with_capacity(raw_frames.len());
    for raw in raw_frames {
        let map = raw.as_map().ok_or(DecodeError::Malformed("stack frame"))?;
        let file = map
            .get("file")
            .and_then(Value::as_str)
            .ok_or(DecodeError::Malformed("stack frame file"))?;
        let function = map
            .get("func")
            .and_then(Value::as_str)
            .ok_or(DecodeError::Malformed("stack frame func"))?;
        let line = map
            .get("line")
            .and_then(Value::as_u64)
            .ok_or(DecodeError::Malformed("stack frame line"))?;
        frames.push(StackFrame {
            file: file.to_string(),
            function: function.to_string(),
            line: u32::try_from(line).map_err(|_| DecodeError::Malformed("stack frame line"))?,
        });
    }
    Ok(frames)
}

fn decode_stack_variable(payload: &[Value]) -> Result<StackVariable, DecodeError> {
    let name = get_str(payload, 0, "stack_frame_var name")?;
    let scope = match get_u64(payload, 1, "stack_frame_var scope")? {
        0 => VariableScope::Local,
        1 => VariableScope::Member,
        2 => VariableScope::Global,
        _ => return Err(DecodeError::Malformed("stack_frame_var scope")),
    };
    let value = payload
        .get(2)
        .cloned()
        .ok_or(DecodeError::Malformed("stack_frame_var value"))?;
    Ok(StackVariable { name, scope, value })
}

fn decode_visual_frame(payload: &[Value]) -> Result<VisualProfilerFrame, DecodeError> {
    let frame_number = get_u64(payload, 0, "visual frame number")?;
    let raw_areas = get_list(payload, 1, "visual frame areas")?;
    let mut areas = Vec::with_capacity(raw_areas.len());
    for raw in raw_areas {
        let triple = raw.as_list().ok_or(DecodeError::Malformed("visual area"))?;
        areas.push(VisualProfilerArea {
            name: get_str(triple, 0, "visual area name")?,
            cpu_msec: get_f32(triple, 1, "visual area cpu")?,
            gpu_msec: get_f32(triple, 2, "visual area gpu")?,
        });
    }
    Ok(VisualProfilerFrame {
        frame_number,
        areas,
    })
}

fn decode_servers_frame(payload: &[Value]) -> Result<ServersProfilerFrame, DecodeError> {
    let frame_number = get_u64(payload, 0, "servers frame number")?;
    let frame_time = get_f32(payload, 1, "servers frame_time")?;
    let idle_time = get_f32(payload, 2, "servers idle_time")?;
    let physics_time = get_f32(payload, 3, "servers physics_time")?;
    let physics_frame_time = get_f32(payload, 4, "servers physics_frame_time")?;
    let script_time = get_f32(payload, 5, "servers script_time")?;

    let raw_servers = get_list(payload, 6, "servers list")?;
    let mut servers = Vec::with_capacity(raw_servers.len());
    for raw in raw_servers {
        let pair = raw.as_list().ok_or(DecodeError::Malformed("server entry"))?;
        let name = get_str(pair, 0, "server name")?;
        let raw_functions = get_list(pair, 1, "server functions")?;
        let mut functions = Vec::with_capacity(raw_functions.len());
        for f in raw_functions {
            let fpair = f.as_list().ok_or(DecodeError::Malformed("server function"))?;
            functions.push(ServerFunction {
                name: get_str(fpair, 0, "server function name")?,
                time: get_f32(fpair, 1, "server function time")?,
            });
        }
        servers.push(ServerInfo { name, functions });
    }

    let raw_funcs = get_list(payload, 7, "script functions")?;
    let mut script_functions = Vec::with_capacity(raw_funcs.len());
    for raw in raw_funcs {
        let quad = raw
            .as_list()
            .ok_or(DecodeError::Malformed("script function entry"))?;
        script_functions.push(ScriptFunctionInfo {
            signature_id: get_u64(quad, 0, "script function signature")?,
            call_count: get_u32(quad, 1, "script function calls")?,
            total_time: get_f32(quad, 2, "script function total")?,
            self_time: get_f32(quad, 3, "script function self")?,
        });
    }

    Ok(ServersProfilerFrame {
        frame_number,
        frame_time,
        idle_time,
        physics_time,
        physics_frame_time,
        script_time,
        servers,
        script_functions,
    })
}

fn decode_network_frame(payload: &[Value]) -> Result<Vec<NetworkNodeStats>, DecodeError> {
    let mut stats = Vec::with_capacity(payload.len());
    for raw in payload {
        let entry = raw.as_list().ok_or(DecodeError::Malformed("network entry"))?;
        stats.push(NetworkNodeStats {
            object_id: get_u64(entry, 0, "network object_id")?,
            node_path: get_str(entry, 1, "network node_path")?,
            incoming_rpc: get_u32(entry, 2, "network incoming_rpc")?,
            incoming_rset: get_u32(entry, 3, "network incoming_rset")?,
            outgoing_rpc: get_u32(entry, 4, "network outgoing_rpc")?,
            outgoing_rset: get_u32(entry, 5, "network outgoing_rset")?,
        });
    }
    Ok(stats)
}

/// Error record: ten timestamp/source/message fields followed by a flat
/// `[file, func, line]` callstack.
fn decode_error_record(payload: &[Value]) -> Result<ErrorRecord, DecodeError> {
    let hour = get_u8(payload, 0, "error hour")?;
    let minute = get_u8(payload, 1, "error minute")?;
    let second = get_u8(payload, 2, "error second")?;
    let millisecond = get_u16(payload, 3, "error millisecond")?;
    let source_function = get_str(payload, 4, "error source_func")?;
    let source_file = get_str(payload, 5, "error source_file")?;
    let source_line = get_u32(payload, 6, "error source_line")?;
    let message = get_str(payload, 7, "error message")?;
    let condition = get_str(payload, 8, "error condition")?;
    let warning = get_bool(payload, 9, "error warning flag")?;

    let raw_stack = get_list(payload, 10, "error callstack")?;
    if raw_stack.len() % 3 != 0 {
        return Err(DecodeError::Malformed("error callstack stride"));
    }
    let mut callstack = Vec::with_capacity(raw_stack.len() / 3);
    for chunk in raw_stack.chunks_exact(3) {
        callstack.push(StackFrame {
            file: get_str(chunk, 0, "error callstack file")?,
            function: get_str(chunk, 1, "error callstack func")?,
            line: get_u32(chunk, 2, "error callstack line")?,
        });
    }

    Ok(ErrorRecord {
        hour,
        minute,
        second,
        millisecond,
        warning,
        source_file,
        source_line,
        source_function,
        message,
        condition,
        callstack,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Value;
    use serde_json::json;

    fn payload(v: serde_json::Value) -> Vec<Value> {
        match Value::from(v) {
            Value::List(items) => items,
            other => vec![other],
        }
    }

    #[test]
    fn debug_enter_decodes() {
        let decoded = Inbound::decode("debug_enter", &payload(json!([true, "Breakpoint"]))).unwrap();
        assert_eq!(
            decoded,
            Inbound::DebugEnter {
                can_continue: true,
                reason: "Breakpoint".into()
            }
        );
    }

    #[test]
    fn debug_enter_wrong_arity_is_fatal() {
        let err = Inbound::decode("debug_enter", &payload(json!([true]))).unwrap_err();
        assert!(matches!(err, DecodeError::Fatal(_)));
        let err = Inbound::decode("debug_enter", &[]).unwrap_err();
        assert!(matches!(err, DecodeError::Fatal(_)));
    }

    #[test]
    fn bad_payload_shapes_are_local() {
        let err = Inbound::decode("set_pid", &payload(json!(["nope"]))).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
        let err = Inbound::decode("network:bandwidth", &payload(json!([1.0]))).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn unknown_tag() {
        assert_eq!(
            Inbound::decode("no_such_tag", &[]).unwrap_err(),
            DecodeError::UnknownTag
        );
    }

    #[test]
    fn stack_dump_frame_maps() {
        let decoded = Inbound::decode(
            "stack_dump",
            &payload(json!([[{"file": "a.gd", "func": "f", "line": 3}]])),
        )
        .unwrap();
        let Inbound::StackDump(frames) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "a.gd");
        assert_eq!(frames[0].function, "f");
        assert_eq!(frames[0].line, 3);
    }

    #[test]
    fn scene_tree_preorder() {
        // root with two children, second child has one child
        let decoded = Inbound::decode(
            "scene:scene_tree",
            &payload(json!([
                2, "Root", "Node", 1,
                0, "A", "Node2D", 2,
                1, "B", "Node2D", 3,
                0, "B1", "Sprite", 4
            ])),
        )
        .unwrap();
        let Inbound::SceneTree(root) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(root.name, "Root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].children[0].name, "B1");
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn scene_tree_trailing_data_rejected() {
        let err = Inbound::decode(
            "scene:scene_tree",
            &payload(json!([0, "Root", "Node", 1, 99])),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn scene_tree_overlong_child_count_rejected() {
        // a claimed count larger than the remaining payload can hold must
        // fail the decode, not drive an allocation
        let err = Inbound::decode(
            "scene:scene_tree",
            &payload(json!([i64::MAX, "Root", "Node", 1])),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));

        let err = Inbound::decode(
            "scene:scene_tree",
            &payload(json!([2, "Root", "Node", 1, 0, "OnlyChild", "Node2D", 2])),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn scene_tree_deep_chain_decodes() {
        const DEPTH: usize = 50_000;
        let mut flat = Vec::with_capacity(DEPTH * 4);
        for i in 0..DEPTH {
            let children = i64::from(i + 1 < DEPTH);
            flat.push(Value::Int(children));
            flat.push(Value::Str(format!("N{i}")));
            flat.push(Value::Str("Node".into()));
            flat.push(Value::Int(i as i64 + 1));
        }
        let decoded = Inbound::decode("scene:scene_tree", &flat).unwrap();
        let Inbound::SceneTree(root) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(root.node_count(), DEPTH);

        let mut depth = 1;
        let mut node = &root;
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, DEPTH);
    }

    #[test]
    fn memory_usage_stride() {
        let decoded = Inbound::decode(
            "memory:usage",
            &payload(json!(["res://a.png", "Texture", "RGBA8", 4096])),
        )
        .unwrap();
        let Inbound::MemoryUsage(usages) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(usages[0].vram, 4096);
        assert_eq!(usages[0].type_name, "Texture");

        let err =
            Inbound::decode("memory:usage", &payload(json!(["res://a.png", "Texture"]))).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn error_record_with_callstack() {
        let decoded = Inbound::decode(
            "error",
            &payload(json!([
                13, 5, 7, 42,
                "do_thing", "res://game.gd", 10,
                "Index out of bounds", "idx < size()", false,
                ["res://game.gd", "do_thing", 10, "res://main.gd", "_ready", 4]
            ])),
        )
        .unwrap();
        let Inbound::Error(record) = decoded else {
            panic!("wrong variant");
        };
        assert!(!record.warning);
        assert_eq!(record.timestamp(), "13:05:07:0042");
        assert_eq!(record.callstack.len(), 2);
        assert_eq!(record.callstack[1].function, "_ready");
    }

    #[test]
    fn error_timestamp_out_of_range_rejected() {
        let err = Inbound::decode(
            "error",
            &payload(json!([300, 0, 0, 0, "f", "a.gd", 1, "boom", "", false, []])),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));

        let err = Inbound::decode(
            "error",
            &payload(json!([0, 0, 0, 70_000, "f", "a.gd", 1, "boom", "", false, []])),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn servers_frame_full_shape() {
        let decoded = Inbound::decode(
            "servers:profile_frame",
            &payload(json!([
                120, 16.6, 10.0, 4.0, 6.0, 2.5,
                [["physics", [["step", 1.5], ["sync", 0.5]]]],
                [[7, 3, 1.25, 1.0]]
            ])),
        )
        .unwrap();
        let Inbound::ServersProfileFrame { frame, total } = decoded else {
            panic!("wrong variant");
        };
        assert!(!total);
        assert_eq!(frame.frame_number, 120);
        assert_eq!(frame.servers[0].functions[1].name, "sync");
        assert_eq!(frame.script_functions[0].signature_id, 7);
        assert_eq!(frame.script_functions[0].call_count, 3);
    }

    #[test]
    fn stack_variable_scopes() {
        let decoded =
            Inbound::decode("stack_frame_var", &payload(json!(["hp", 1, 100]))).unwrap();
        let Inbound::StackFrameVar(var) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(var.scope, VariableScope::Member);
        assert_eq!(var.value, Value::Int(100));

        let err = Inbound::decode("stack_frame_var", &payload(json!(["hp", 9, 100]))).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }
}
