//! Performance monitor history
//!
//! Each `performance:profile_frame` message carries one float per monitor.
//! Samples are kept most-recent-first so graph drawing walks forward from
//! "now", while CSV-style export walks from the oldest. Per-metric maxima
//! only ever grow within a session; they scale the graphs.

use std::collections::VecDeque;

/// Bounded most-recent-first ring of performance samples
#[derive(Debug)]
pub struct PerfHistory {
    frames: VecDeque<Vec<f32>>,
    max: Vec<f32>,
    capacity: usize,
}

impl PerfHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            max: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record one sample, updating per-metric maxima
    pub fn push(&mut self, values: Vec<f32>) {
        if self.max.len() < values.len() {
            self.max.resize(values.len(), 0.0);
        }
        for (i, v) in values.iter().enumerate() {
            if *v > self.max[i] {
                self.max[i] = *v;
            }
        }
        self.frames.push_front(values);
        while self.frames.len() > self.capacity {
            self.frames.pop_back();
        }
    }

    /// Per-metric maxima seen this session; maxima never decrease
    pub fn max(&self) -> &[f32] {
        &self.max
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Most recent sample first
    pub fn recent_first(&self) -> impl Iterator<Item = &[f32]> {
        self.frames.iter().map(Vec::as_slice)
    }

    /// Oldest sample first
    pub fn oldest_first(&self) -> impl Iterator<Item = &[f32]> {
        self.frames.iter().rev().map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.max.clear();
    }
}
