//! Servers-profiler signature resolution
//!
//! High-frequency profiler frames reference script functions through small
//! signature ids; the target defines each id once via a
//! `servers:function_signature` message before using it. A signature name is
//! a `::`-joined `(script, line, function)` triple; built-in scripts carry an
//! extra `::` inside the script path.

use std::collections::HashMap;

use super::messages::{ScriptFunctionInfo, ServersProfilerFrame};

/// A signature id resolved to its script location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFunction {
    /// The raw signature string, or a placeholder for unknown ids
    pub signature: String,
    pub script: String,
    pub line: u32,
    pub name: String,
}

/// A servers-profiler frame with its script functions resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ServersProfilerMetric {
    pub frame: ServersProfilerFrame,
    /// Parallel to `frame.script_functions`
    pub resolved: Vec<ResolvedFunction>,
}

/// Session-lifetime table of signature-id definitions
#[derive(Debug, Default)]
pub struct SignatureTable {
    names: HashMap<u64, String>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, name: String) {
        self.names.insert(id, name);
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Cleared when servers profiling is (re)enabled and on session teardown
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Resolve one signature id. Names that don't split into 3 or 4 parts,
    /// and ids with no definition, become placeholders.
    pub fn resolve(&self, id: u64) -> ResolvedFunction {
        let Some(name) = self.names.get(&id) else {
            let placeholder = format!("SigErr {id}");
            return ResolvedFunction {
                signature: placeholder.clone(),
                script: String::new(),
                line: 0,
                name: placeholder,
            };
        };

        let parts: Vec<&str> = name.split("::").collect();
        let (script, line_str, function) = match parts.as_slice() {
            [script, line, function] => (script.to_string(), *line, *function),
            // built-in scripts have a :: inside the script path
            [outer, inner, line, function] => (format!("{outer}::{inner}"), *line, *function),
            _ => {
                return ResolvedFunction {
                    signature: name.clone(),
                    script: String::new(),
                    line: 0,
                    name: name.clone(),
                }
            }
        };

        ResolvedFunction {
            signature: name.clone(),
            script,
            line: line_str.parse().unwrap_or(0),
            name: function.to_string(),
        }
    }

    /// Attach resolved names to a decoded frame
    pub fn resolve_frame(&self, frame: ServersProfilerFrame) -> ServersProfilerMetric {
        let resolved = frame
            .script_functions
            .iter()
            .map(|f: &ScriptFunctionInfo| self.resolve(f.signature_id))
            .collect();
        ServersProfilerMetric { frame, resolved }
    }
}
