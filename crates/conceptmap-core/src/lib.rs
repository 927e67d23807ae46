//! Shared data model for the concept map.
//!
//! Vocabulary used by both the store and the layout engine: concept nodes
//! with raw and derived weights, the insertion-ordered node map, session
//! snapshots and the save/load document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

mod session;

pub use session::{SavedSession, Session, DEFAULT_EXPLANATION};

/// Key of the single root node. The root is created locally, never by the
/// generation collaborator, and is the one node without a parent.
pub const ROOT_KEY: &str = "start";

// Raw-weight defaults applied when the collaborator recorded nothing.
// The root's raw breadth is smaller than the non-root default; its rendered
// size is driven by the node count instead (see the layout crate).
const DEFAULT_ROOT_RAW_BREADTH: f32 = 0.8;
const DEFAULT_RAW_BREADTH: f32 = 1.2;
const DEFAULT_RAW_DISTANCE: f32 = 1.0;

/// Bounds applied to derived weights during normalization.
///
/// The root's derived distance is pinned to `0.0` and is exempt; everything
/// else lands inside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: f32,
    pub max: f32,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self { min: 0.1, max: 1.5 }
    }
}

impl WeightBounds {
    fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Breadth derivation hook. Currently a passthrough; normalization is
/// reserved for scaling by graph size without touching callers.
fn scale_breadth(raw: f32) -> f32 {
    raw
}

/// A single concept in the map.
///
/// `raw_distance` and `raw_breadth` are collaborator-asserted values kept
/// verbatim; `distance` and `breadth` are derived, bounded values recomputed
/// by [`ConceptGraph::normalize_weights`] whenever the graph changes. Only
/// the root carries a `label` (the user-entered subject); every other node
/// is labeled by its own key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_breadth: Option<f32>,
    #[serde(default)]
    pub distance: f32,
    #[serde(default)]
    pub breadth: f32,
}

impl ConceptNode {
    pub fn root(label: Option<&str>) -> Self {
        Self {
            parent: None,
            label: label.map(str::to_string),
            raw_distance: None,
            raw_breadth: None,
            distance: 0.0,
            breadth: 0.0,
        }
    }

    pub fn child(parent: &str, raw_distance: f32, raw_breadth: f32) -> Self {
        Self {
            parent: Some(parent.to_string()),
            label: None,
            raw_distance: Some(raw_distance),
            raw_breadth: Some(raw_breadth),
            distance: 0.0,
            breadth: 0.0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Structural failures surfaced by [`Session::restore`] and
/// [`ConceptGraph::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("session document is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("node map has no `start` root entry")]
    MissingRoot,
    #[error("the root entry must not have a parent")]
    RootHasParent,
    #[error("parent chain of {key:?} never reaches the root")]
    Unrooted { key: String },
}

/// The node map. Insertion-ordered: children enumerate in the order their
/// concepts were added, which keeps the tree-seeding pass deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptGraph {
    pub nodes: IndexMap<String, ConceptNode>,
}

impl ConceptGraph {
    /// A graph holding only the root node.
    pub fn with_root(label: Option<&str>) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(ROOT_KEY.to_string(), ConceptNode::root(label));
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ConceptNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// The user-entered subject, if one has been set on the root.
    pub fn subject(&self) -> Option<&str> {
        self.nodes
            .get(ROOT_KEY)?
            .label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
    }

    /// All non-root keys, in insertion order.
    pub fn non_root_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|(key, _)| key.as_str() != ROOT_KEY)
            .map(|(key, _)| key.as_str())
    }

    /// Keys of `key`'s children, in insertion order.
    pub fn children(&self, key: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.as_deref() == Some(key))
            .map(|(child, _)| child.as_str())
            .collect()
    }

    /// Attach a new concept under an existing parent. Returns `false`
    /// without touching the map when the key is already present (first
    /// definition wins) or the parent is unknown.
    pub fn insert_child(
        &mut self,
        parent: &str,
        key: &str,
        raw_distance: f32,
        raw_breadth: f32,
    ) -> bool {
        if self.nodes.contains_key(key) || !self.nodes.contains_key(parent) {
            return false;
        }
        self.nodes
            .insert(key.to_string(), ConceptNode::child(parent, raw_distance, raw_breadth));
        true
    }

    /// Walk parent links from `focus` up to the root and return the path in
    /// root-to-focus order. Unknown keys yield an empty path; the walk is
    /// capped at the node count so a corrupt cycle cannot spin forever.
    pub fn focus_path(&self, focus: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(focus);
        for _ in 0..=self.nodes.len() {
            let Some(key) = current else { break };
            let Some(node) = self.nodes.get(key) else { break };
            path.push(key.to_string());
            current = node.parent.as_deref();
        }
        path.reverse();
        path
    }

    /// Recompute derived weights from the raw values, filling in defaults
    /// for anything the collaborator left unset. Idempotent: re-running on
    /// an already-normalized graph is a fixed point.
    pub fn normalize_weights(&mut self, bounds: &WeightBounds) {
        for node in self.nodes.values_mut() {
            let default_breadth = if node.is_root() {
                DEFAULT_ROOT_RAW_BREADTH
            } else {
                DEFAULT_RAW_BREADTH
            };
            let raw_breadth = *node.raw_breadth.get_or_insert(default_breadth);
            node.breadth = bounds.clamp(scale_breadth(raw_breadth));

            if node.is_root() {
                node.distance = 0.0;
            } else {
                let raw_distance = *node.raw_distance.get_or_insert(DEFAULT_RAW_DISTANCE);
                node.distance = bounds.clamp(raw_distance);
            }
        }
    }

    /// Check the structural invariants: exactly one root under [`ROOT_KEY`]
    /// with no parent, and every other node's parent chain terminating at
    /// the root (no orphans, no cycles).
    pub fn validate(&self) -> Result<(), ImportError> {
        let root = self.nodes.get(ROOT_KEY).ok_or(ImportError::MissingRoot)?;
        if root.parent.is_some() {
            return Err(ImportError::RootHasParent);
        }
        for key in self.nodes.keys() {
            if key == ROOT_KEY {
                continue;
            }
            let mut current = key.as_str();
            let mut reached_root = false;
            for _ in 0..self.nodes.len() {
                match self.nodes.get(current).and_then(|n| n.parent.as_deref()) {
                    Some(ROOT_KEY) => {
                        reached_root = true;
                        break;
                    }
                    Some(parent) if self.nodes.contains_key(parent) => current = parent,
                    _ => break,
                }
            }
            if !reached_root {
                return Err(ImportError::Unrooted { key: key.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> ConceptGraph {
        let mut graph = ConceptGraph::with_root(Some("quaternions"));
        graph.insert_child(ROOT_KEY, "rotation", 0.4, 0.7);
        graph.insert_child(ROOT_KEY, "complex numbers", 0.3, 0.9);
        graph.insert_child("rotation", "matrices", 0.6, 0.5);
        graph
    }

    #[test]
    fn normalize_fills_defaults_and_bounds() {
        let mut graph = sample_graph();
        graph
            .nodes
            .insert("bare".to_string(), ConceptNode::child(ROOT_KEY, 0.0, 0.0));
        graph.nodes.get_mut("bare").unwrap().raw_distance = None;
        graph.nodes.get_mut("bare").unwrap().raw_breadth = None;

        graph.normalize_weights(&WeightBounds::default());

        let root = graph.get(ROOT_KEY).unwrap();
        assert_eq!(root.distance, 0.0);
        assert_eq!(root.breadth, 0.8);

        let bare = graph.get("bare").unwrap();
        assert_eq!(bare.distance, 1.0);
        assert_eq!(bare.breadth, 1.2);

        let rotation = graph.get("rotation").unwrap();
        assert_eq!(rotation.distance, 0.4);
        assert_eq!(rotation.breadth, 0.7);
    }

    #[test]
    fn normalize_clamps_out_of_range_raw_values() {
        let mut graph = ConceptGraph::with_root(None);
        graph.insert_child(ROOT_KEY, "huge", 7.0, 9.0);
        graph.insert_child(ROOT_KEY, "tiny", 0.01, 0.0);

        graph.normalize_weights(&WeightBounds::default());

        assert_eq!(graph.get("huge").unwrap().distance, 1.5);
        assert_eq!(graph.get("huge").unwrap().breadth, 1.5);
        assert_eq!(graph.get("tiny").unwrap().distance, 0.1);
        assert_eq!(graph.get("tiny").unwrap().breadth, 0.1);
        // Raw values stay verbatim.
        assert_eq!(graph.get("huge").unwrap().raw_distance, Some(7.0));
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut graph = sample_graph();
        let bounds = WeightBounds::default();
        graph.normalize_weights(&bounds);
        let once = graph.clone();
        graph.normalize_weights(&bounds);
        assert_eq!(graph, once);
    }

    #[test]
    fn insert_child_rejects_duplicates_and_unknown_parents() {
        let mut graph = sample_graph();
        let before = graph.get("rotation").unwrap().clone();

        assert!(!graph.insert_child(ROOT_KEY, "rotation", 0.9, 0.1));
        assert!(!graph.insert_child("nonexistent", "fresh", 0.5, 0.5));
        assert!(graph.insert_child("matrices", "determinant", 0.5, 0.5));

        assert_eq!(graph.get("rotation").unwrap(), &before);
        assert!(!graph.contains("fresh"));
    }

    #[test]
    fn focus_path_runs_root_to_focus() {
        let graph = sample_graph();
        assert_eq!(
            graph.focus_path("matrices"),
            vec!["start".to_string(), "rotation".to_string(), "matrices".to_string()]
        );
        assert_eq!(graph.focus_path(ROOT_KEY), vec!["start".to_string()]);
        assert!(graph.focus_path("unknown").is_empty());
    }

    #[test]
    fn children_enumerate_in_insertion_order() {
        let graph = sample_graph();
        assert_eq!(graph.children(ROOT_KEY), vec!["rotation", "complex numbers"]);
        assert_eq!(graph.children("rotation"), vec!["matrices"]);
        assert!(graph.children("matrices").is_empty());
    }

    #[test]
    fn validate_accepts_well_formed_graph() {
        assert!(sample_graph().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_root() {
        let mut graph = sample_graph();
        graph.nodes.shift_remove(ROOT_KEY);
        assert!(matches!(graph.validate(), Err(ImportError::MissingRoot)));
    }

    #[test]
    fn validate_rejects_orphans_and_cycles() {
        let mut graph = sample_graph();
        graph.nodes.insert(
            "orphan".to_string(),
            ConceptNode::child("nowhere", 0.5, 0.5),
        );
        assert!(matches!(
            graph.validate(),
            Err(ImportError::Unrooted { key }) if key == "orphan"
        ));

        let mut cyclic = sample_graph();
        cyclic.nodes.insert("a".to_string(), ConceptNode::child("b", 0.5, 0.5));
        cyclic.nodes.insert("b".to_string(), ConceptNode::child("a", 0.5, 0.5));
        assert!(matches!(cyclic.validate(), Err(ImportError::Unrooted { .. })));
    }
}
