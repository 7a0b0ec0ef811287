//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::Result;

/// Tunables for the debug session controller.
///
/// All fields have defaults, so an empty (or absent) config file is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct DebuggerConfig {
    /// Per-tick budget for draining inbound messages, in milliseconds
    #[serde(default = "default_tick_budget")]
    pub tick_budget_ms: u64,

    /// Soft cap on the performance-history ring; oldest frames are dropped
    #[serde(default = "default_perf_history_cap")]
    pub perf_history_cap: usize,

    /// Maximum script functions per servers-profiler frame (clamped to
    /// 16..=512 when sent to the target)
    #[serde(default = "default_profiler_max_functions")]
    pub profiler_max_functions: u32,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: default_tick_budget(),
            perf_history_cap: default_perf_history_cap(),
            profiler_max_functions: default_profiler_max_functions(),
        }
    }
}

fn default_tick_budget() -> u64 {
    20
}
fn default_perf_history_cap() -> usize {
    3600
}
fn default_profiler_max_functions() -> u32 {
    64
}

impl DebuggerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// The drain budget as a [`Duration`]
    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }

    /// Profiler max-functions clamped to the range the target accepts
    pub fn clamped_max_functions(&self) -> u32 {
        self.profiler_max_functions.clamp(16, 512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DebuggerConfig::default();
        assert_eq!(config.tick_budget_ms, 20);
        assert_eq!(config.tick_budget(), Duration::from_millis(20));
        assert_eq!(config.perf_history_cap, 3600);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: DebuggerConfig = toml::from_str("tick_budget_ms = 5").unwrap();
        assert_eq!(config.tick_budget_ms, 5);
        assert_eq!(config.profiler_max_functions, 64);
    }

    #[test]
    fn max_functions_clamped() {
        let low: DebuggerConfig = toml::from_str("profiler_max_functions = 1").unwrap();
        assert_eq!(low.clamped_max_functions(), 16);
        let high: DebuggerConfig = toml::from_str("profiler_max_functions = 9000").unwrap();
        assert_eq!(high.clamped_max_functions(), 512);
    }
}
