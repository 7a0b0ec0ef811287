//! Path interning for live-edit commands
//!
//! Live-edit traffic references the same node and resource paths over and
//! over; each path is registered with the target once and referenced by a
//! small integer id afterwards. Node and resource paths live in separate
//! tables but share one id counter, so an id is unambiguous session-wide.

use std::collections::HashMap;

/// Result of an intern lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interned {
    pub id: u32,
    /// True when this lookup assigned the id; the caller must register the
    /// (path, id) pair with the target before referencing the id
    pub newly_assigned: bool,
}

/// Session-lifetime interning tables for node and resource paths
#[derive(Debug, Default)]
pub struct PathCache {
    node_paths: HashMap<String, u32>,
    resource_paths: HashMap<String, u32>,
    last_id: u32,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_node_path(&mut self, path: &str) -> Interned {
        if let Some(&id) = self.node_paths.get(path) {
            return Interned {
                id,
                newly_assigned: false,
            };
        }
        self.last_id += 1;
        self.node_paths.insert(path.to_string(), self.last_id);
        Interned {
            id: self.last_id,
            newly_assigned: true,
        }
    }

    pub fn intern_resource_path(&mut self, path: &str) -> Interned {
        if let Some(&id) = self.resource_paths.get(path) {
            return Interned {
                id,
                newly_assigned: false,
            };
        }
        self.last_id += 1;
        self.resource_paths.insert(path.to_string(), self.last_id);
        Interned {
            id: self.last_id,
            newly_assigned: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_paths.is_empty() && self.resource_paths.is_empty()
    }

    /// Drop all assignments. Ids are never reused across sessions because the
    /// tables only clear together with the counter on session teardown.
    pub fn clear(&mut self) {
        self.node_paths.clear();
        self.resource_paths.clear();
        self.last_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_ids_within_session() {
        let mut cache = PathCache::new();
        let first = cache.intern_node_path("/root/Main");
        assert!(first.newly_assigned);
        let again = cache.intern_node_path("/root/Main");
        assert!(!again.newly_assigned);
        assert_eq!(first.id, again.id);
    }

    #[test]
    fn shared_counter_across_tables() {
        let mut cache = PathCache::new();
        let node = cache.intern_node_path("/root/Main");
        let res = cache.intern_resource_path("res://mat.tres");
        let node2 = cache.intern_node_path("/root/Main/Child");
        assert_eq!(node.id, 1);
        assert_eq!(res.id, 2);
        assert_eq!(node2.id, 3);
    }

    #[test]
    fn clear_resets_counter() {
        let mut cache = PathCache::new();
        cache.intern_node_path("/a");
        cache.intern_resource_path("res://b");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.intern_node_path("/c").id, 1);
    }
}
