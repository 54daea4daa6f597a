//! Key store.
//!
//! The persisted form of a resolved key: an insertion-ordered map from step
//! id to node, written as pretty JSON. Loading also accepts the list form and
//! level-less nodes written by older tooling.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Goto, KeyError, KeyResult, Node, StepId};

/// An immutable, order-preserving collection of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyStore {
    nodes: IndexMap<StepId, Node>,
}

/// Node as found on disk; `level` may be missing.
#[derive(Debug, Deserialize)]
struct StoredNode {
    id: StepId,
    #[serde(rename = "texte", alias = "text", default)]
    text: String,
    goto: Goto,
    #[serde(default)]
    parent: Option<StepId>,
    #[serde(default)]
    level: Option<u32>,
}

impl From<StoredNode> for Node {
    fn from(raw: StoredNode) -> Self {
        let level = raw.level.unwrap_or_else(|| raw.id.level());
        Self { id: raw.id, text: raw.text, goto: raw.goto, parent: raw.parent, level }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredKey {
    Map(IndexMap<String, StoredNode>),
    List(Vec<StoredNode>),
}

/// Something wrong with a stored key that does not stop it from loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// `goto` names a step that is not in the key
    DanglingGoto { from: StepId, target: StepId },
    /// `parent` names a step that is not in the key
    MissingParent { id: StepId, parent: StepId },
    /// Depth does not follow from the parent's depth
    LevelMismatch { id: StepId, level: u32, parent_level: Option<u32> },
    /// Following parents from this step leads back to it
    ParentCycle { id: StepId },
    /// Not reachable from the entry root through children or gotos
    Unreachable { id: StepId },
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingGoto { from, target } => {
                write!(f, "step {from} leads to missing step {target}")
            }
            Self::MissingParent { id, parent } => {
                write!(f, "step {id} has missing parent {parent}")
            }
            Self::LevelMismatch { id, level, parent_level: Some(p) } => {
                write!(f, "step {id} is at level {level} under a level {p} parent")
            }
            Self::LevelMismatch { id, level, parent_level: None } => {
                write!(f, "root step {id} is at level {level}")
            }
            Self::ParentCycle { id } => write!(f, "step {id} is part of a parent cycle"),
            Self::Unreachable { id } => write!(f, "step {id} cannot be reached from the entry"),
        }
    }
}

impl KeyStore {
    /// Wrap an already resolved node map.
    pub fn new(nodes: IndexMap<StepId, Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &StepId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &StepId> {
        self.nodes.keys()
    }

    /// Nodes without a parent, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_root())
    }

    /// Direct children of `id`, in document order.
    pub fn children<'a>(&'a self, id: &'a StepId) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| n.parent.as_ref() == Some(id))
    }

    pub fn has_children(&self, id: &StepId) -> bool {
        self.children(id).next().is_some()
    }

    /// The root a walk starts from: the smallest root id, numerically.
    pub fn entry_root(&self) -> Option<&Node> {
        self.roots().min_by(|a, b| a.id.cmp(&b.id))
    }

    pub fn max_level(&self) -> u32 {
        self.nodes.values().map(|n| n.level).max().unwrap_or(0)
    }

    /// Serialize to the canonical pretty JSON map.
    pub fn to_json(&self) -> KeyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from either the map or the list form.
    pub fn from_json(content: &str) -> KeyResult<Self> {
        let nodes = match serde_json::from_str::<StoredKey>(content)? {
            StoredKey::Map(map) => {
                let mut nodes = IndexMap::with_capacity(map.len());
                for (key, raw) in map {
                    if !StepId::parse(&key).is_ok_and(|k| k == raw.id) {
                        return Err(KeyError::KeyMismatch { key, id: raw.id.to_string() });
                    }
                    if nodes.contains_key(&raw.id) {
                        tracing::warn!(id = %raw.id, key = %key, "Duplicate node in stored key, keeping first");
                        continue;
                    }
                    nodes.insert(raw.id.clone(), Node::from(raw));
                }
                nodes
            }
            StoredKey::List(list) => {
                let mut nodes = IndexMap::with_capacity(list.len());
                for raw in list {
                    if nodes.contains_key(&raw.id) {
                        tracing::warn!(id = %raw.id, "Duplicate node in stored key, keeping first");
                        continue;
                    }
                    nodes.insert(raw.id.clone(), Node::from(raw));
                }
                nodes
            }
        };
        Ok(Self { nodes })
    }

    /// Load a key from disk.
    pub fn load(path: &Path) -> KeyResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| KeyError::io(path, e))?;
        let store = Self::from_json(&content)?;
        tracing::debug!(path = ?path, nodes = store.len(), "Loaded key");
        Ok(store)
    }

    /// Write the key to disk. The destination is only replaced once the
    /// whole key has been written next to it.
    pub fn save(&self, path: &Path) -> KeyResult<()> {
        let json = self.to_json()?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| KeyError::io(dir, e))?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| KeyError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| KeyError::io(path, e))?;

        tracing::info!(path = ?path, nodes = self.len(), "Saved key");
        Ok(())
    }

    /// Report structural problems. An empty list means the key is sound.
    pub fn check(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for node in self.nodes.values() {
            if let Some(target) = node.goto.step().filter(|t| !self.contains(t)) {
                issues.push(Issue::DanglingGoto { from: node.id.clone(), target: target.clone() });
            }

            match &node.parent {
                None if node.level != 0 => issues.push(Issue::LevelMismatch {
                    id: node.id.clone(),
                    level: node.level,
                    parent_level: None,
                }),
                Some(parent) => match self.get(parent) {
                    None => issues.push(Issue::MissingParent {
                        id: node.id.clone(),
                        parent: parent.clone(),
                    }),
                    Some(p) if node.level != p.level + 1 => issues.push(Issue::LevelMismatch {
                        id: node.id.clone(),
                        level: node.level,
                        parent_level: Some(p.level),
                    }),
                    Some(_) => {}
                },
                None => {}
            }

            if self.in_parent_cycle(node) {
                issues.push(Issue::ParentCycle { id: node.id.clone() });
            }
        }

        if let Some(entry) = self.entry_root() {
            let reachable = self.reachable_from(&entry.id);
            for node in self.nodes.values().filter(|n| !reachable.contains(&n.id)) {
                issues.push(Issue::Unreachable { id: node.id.clone() });
            }
        }

        issues
    }

    /// True when following parents from `node` leads back to it. A chain that
    /// merely runs into some other cycle does not count.
    fn in_parent_cycle(&self, node: &Node) -> bool {
        let mut seen = HashSet::new();
        let mut current = node;
        while let Some(parent) = current.parent.as_ref().and_then(|p| self.get(p)) {
            if parent.id == node.id {
                return true;
            }
            if !seen.insert(&parent.id) {
                return false;
            }
            current = parent;
        }
        false
    }

    fn reachable_from<'a>(&'a self, start: &'a StepId) -> HashSet<&'a StepId> {
        let mut seen = HashSet::new();
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            let Some(node) = self.get(id) else { continue };
            if !seen.insert(&node.id) {
                continue;
            }
            pending.extend(self.children(&node.id).map(|c| &c.id));
            if let Some(target) = node.goto.step() {
                pending.push(target);
            }
        }
        seen
    }
}

impl FromIterator<Node> for KeyStore {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let mut nodes = IndexMap::new();
        for node in iter {
            nodes.entry(node.id.clone()).or_insert(node);
        }
        Self { nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{build, parse_document};

    fn id(s: &str) -> StepId {
        StepId::parse(s).unwrap()
    }

    fn node(step: &str, text: &str, goto: &str, parent: Option<&str>) -> Node {
        let step = id(step);
        Node {
            level: step.level(),
            id: step,
            text: text.to_string(),
            goto: Goto::try_from(goto.to_string()).unwrap(),
            parent: parent.map(id),
        }
    }

    fn sample() -> KeyStore {
        build(parse_document("1. Annual 2\n1'. Perennial -> 3\n2. Flowers blue\n3. Flowers red\n"))
            .store
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let store = sample();
        let json = store.to_json().unwrap();
        let back = KeyStore::from_json(&json).unwrap();
        assert_eq!(back, store);
        let ids: Vec<_> = back.ids().map(StepId::as_str).collect();
        assert_eq!(ids, vec!["1", "1'", "2", "3"]);
    }

    #[test]
    fn test_round_trip_empty() {
        let store = KeyStore::default();
        assert_eq!(store.to_json().unwrap(), "{}");
        assert_eq!(KeyStore::from_json("{}").unwrap(), store);
    }

    #[test]
    fn test_map_format_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["1'"]["texte"], "Perennial");
        assert_eq!(json["1'"]["goto"], "3");
        assert_eq!(json["1'"]["parent"], "1");
        assert_eq!(json["1"]["parent"], serde_json::Value::Null);
    }

    #[test]
    fn test_legacy_list_without_levels() {
        let json = r#"[
            {"id": "1", "texte": "Annual", "goto": "2", "parent": null},
            {"id": "1’", "texte": "Perennial", "goto": "END", "parent": "1"}
        ]"#;
        let store = KeyStore::from_json(json).unwrap();
        assert_eq!(store.len(), 2);
        let primed = store.get(&id("1'")).unwrap();
        assert_eq!(primed.level, 1);
        assert!(primed.goto.is_end());
    }

    #[test]
    fn test_legacy_map_keys_are_normalized() {
        let json = r#"{"2’": {"id": "2'", "texte": "x", "goto": "END", "parent": null}}"#;
        assert!(KeyStore::from_json(json).unwrap().contains(&id("2'")));
    }

    #[test]
    fn test_map_keys_normalizing_to_one_id_keep_first() {
        let json = r#"{
            "2'": {"id": "2'", "texte": "first", "goto": "END", "parent": null},
            "2’": {"id": "2’", "texte": "second", "goto": "END", "parent": null}
        }"#;
        let store = KeyStore::from_json(json).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id("2'")).unwrap().text, "first");
    }

    #[test]
    fn test_key_mismatch_is_rejected() {
        let json = r#"{"2": {"id": "3", "texte": "x", "goto": "END", "parent": null}}"#;
        assert!(matches!(KeyStore::from_json(json), Err(KeyError::KeyMismatch { .. })));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(KeyStore::from_json("{not json"), Err(KeyError::Malformed(_))));
        assert!(KeyStore::from_json(r#"{"1": {"id": "one", "goto": "END"}}"#).is_err());
    }

    #[test]
    fn test_children_and_entry_root() {
        let store: KeyStore = vec![
            node("4", "D", "END", None),
            node("2", "B", "END", None),
            node("2'", "B'", "END", Some("2")),
            node("2''", "B''", "END", Some("2'")),
            node("3'", "C'", "END", Some("2")),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.entry_root().unwrap().id, id("2"));
        let parent = id("2");
        let kids: Vec<_> = store.children(&parent).map(|n| n.id.as_str()).collect();
        assert_eq!(kids, vec!["2'", "3'"]);
        assert_eq!(store.max_level(), 2);
        assert!(!store.has_children(&id("4")));
    }

    #[test]
    fn test_check_clean_key() {
        assert!(sample().check().is_empty());
    }

    #[test]
    fn test_check_reports_problems() {
        let store: KeyStore = vec![
            node("1", "A", "9", None),
            node("1'", "B", "END", Some("7")),
            node("1''", "C", "END", Some("1")),
            node("5", "E", "END", None),
        ]
        .into_iter()
        .collect();

        let issues = store.check();
        assert!(issues.contains(&Issue::DanglingGoto { from: id("1"), target: id("9") }));
        assert!(issues.contains(&Issue::MissingParent { id: id("1'"), parent: id("7") }));
        assert!(issues.contains(&Issue::LevelMismatch {
            id: id("1''"),
            level: 2,
            parent_level: Some(0)
        }));
        assert!(issues.contains(&Issue::Unreachable { id: id("5") }));
    }

    #[test]
    fn test_check_detects_parent_cycle() {
        let store: KeyStore = vec![
            node("1", "A", "END", None),
            node("2'", "B", "END", Some("3'")),
            node("3'", "C", "END", Some("2'")),
            node("4''", "D", "END", Some("2'")),
        ]
        .into_iter()
        .collect();

        let issues = store.check();
        assert!(issues.contains(&Issue::ParentCycle { id: id("2'") }));
        assert!(issues.contains(&Issue::ParentCycle { id: id("3'") }));
        // Hangs off the cycle without being part of it.
        assert!(!issues.contains(&Issue::ParentCycle { id: id("4''") }));
    }

    #[test]
    fn test_parent_chain_terminates_within_max_level() {
        let store = build(parse_document("1. A\n1'. B\n1''. C\n1'''. D\n2. E\n2'. F\n")).store;
        let limit = store.max_level() as usize + 1;
        for node in store.nodes() {
            let mut steps = 0;
            let mut current = Some(node);
            while let Some(n) = current {
                steps += 1;
                current = n.parent.as_ref().and_then(|p| store.get(p));
            }
            assert!(steps <= limit, "{} took {steps} steps", node.id);
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("viola_key.json");
        let store = sample();
        store.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(KeyStore::load(&path).unwrap(), store);
    }

    #[test]
    fn test_load_missing_file() {
        let err = KeyStore::load(Path::new("/no/such/key.json")).unwrap_err();
        assert!(matches!(err, KeyError::Io { .. }));
    }
}
