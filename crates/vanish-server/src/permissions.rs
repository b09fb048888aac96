//! Permission nodes granted to players, persisted as a JSON object.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Node that grants every permission.
pub const WILDCARD: &str = "*";

/// Player name → granted nodes, plus operators who hold every node.
pub struct PermissionStore {
    grants: BTreeMap<String, BTreeSet<String>>,
    ops: BTreeSet<String>,
    path: Option<PathBuf>,
}

impl PermissionStore {
    /// In-memory store that never touches disk.
    pub fn new() -> Self {
        Self {
            grants: BTreeMap::new(),
            ops: BTreeSet::new(),
            path: None,
        }
    }

    /// Load grants from `path`. Creates empty defaults if the file doesn't exist.
    pub fn load(path: impl Into<PathBuf>, ops: &[String]) -> Self {
        let path = path.into();
        Self {
            grants: load_map(&path),
            ops: ops.iter().cloned().collect(),
            path: Some(path),
        }
    }

    pub fn is_op(&self, name: &str) -> bool {
        self.ops.contains(name)
    }

    pub fn set_op(&mut self, name: &str, op: bool) {
        if op {
            self.ops.insert(name.to_string());
        } else {
            self.ops.remove(name);
        }
    }

    /// Nodes for `name` as plugins see them; ops get the wildcard.
    pub fn nodes_for(&self, name: &str) -> BTreeSet<String> {
        let mut nodes = self.grants.get(name).cloned().unwrap_or_default();
        if self.is_op(name) {
            nodes.insert(WILDCARD.to_string());
        }
        nodes
    }

    pub fn has(&self, name: &str, node: &str) -> bool {
        self.is_op(name)
            || self
                .grants
                .get(name)
                .is_some_and(|nodes| nodes.contains(WILDCARD) || nodes.contains(node))
    }

    /// Returns whether the node was newly granted.
    pub fn grant(&mut self, name: &str, node: &str) -> bool {
        let added = self
            .grants
            .entry(name.to_string())
            .or_default()
            .insert(node.to_string());
        if added {
            self.save();
        }
        added
    }

    /// Returns whether the node was held.
    pub fn revoke(&mut self, name: &str, node: &str) -> bool {
        let Some(nodes) = self.grants.get_mut(name) else {
            return false;
        };
        let removed = nodes.remove(node);
        if nodes.is_empty() {
            self.grants.remove(name);
        }
        if removed {
            self.save();
        }
        removed
    }

    fn save(&self) {
        if let Some(path) = &self.path {
            save_map(path, &self.grants);
        }
    }
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load_map(path: &Path) -> BTreeMap<String, BTreeSet<String>> {
    if !path.exists() {
        return BTreeMap::new();
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<BTreeMap<String, BTreeSet<String>>>(&contents) {
            Ok(map) => {
                info!("Loaded permissions for {} players from {}", map.len(), path.display());
                map
            }
            Err(e) => {
                warn!("Failed to parse {}: {e}", path.display());
                BTreeMap::new()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            BTreeMap::new()
        }
    }
}

fn save_map(path: &Path, map: &BTreeMap<String, BTreeSet<String>>) {
    match serde_json::to_string_pretty(map) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                warn!("Failed to write {}: {e}", path.display());
            }
        }
        Err(e) => warn!("Failed to serialize {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_file() -> PathBuf {
        let dir = env::temp_dir().join(format!("vanish_perm_test_{}", rand::random::<u64>()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("permissions.json")
    }

    #[test]
    fn load_missing_file_is_empty() {
        let store = PermissionStore::load(temp_file(), &[]);
        assert!(!store.has("Steve", "vanish.use"));
        assert!(store.nodes_for("Steve").is_empty());
    }

    #[test]
    fn grant_and_reload() {
        let path = temp_file();
        {
            let mut store = PermissionStore::load(&path, &[]);
            assert!(store.grant("Steve", "vanish.use"));
            assert!(!store.grant("Steve", "vanish.use"));
            store.grant("Alex", "vanish.see");
        }
        let store = PermissionStore::load(&path, &[]);
        assert!(store.has("Steve", "vanish.use"));
        assert!(store.has("Alex", "vanish.see"));
        assert!(!store.has("Alex", "vanish.use"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn revoke_removes_node() {
        let mut store = PermissionStore::new();
        store.grant("Steve", "vanish.use");
        assert!(store.revoke("Steve", "vanish.use"));
        assert!(!store.revoke("Steve", "vanish.use"));
        assert!(!store.has("Steve", "vanish.use"));
    }

    #[test]
    fn ops_hold_everything() {
        let mut store = PermissionStore::load(temp_file(), &["Root".to_string()]);
        assert!(store.has("Root", "vanish.use.other"));
        assert!(store.nodes_for("Root").contains(WILDCARD));
        store.set_op("Root", false);
        assert!(!store.has("Root", "vanish.use.other"));
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let path = temp_file();
        fs::write(&path, "{not json").unwrap();
        let store = PermissionStore::load(&path, &[]);
        assert!(store.nodes_for("Steve").is_empty());
    }
}
