use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{ConceptGraph, ImportError, WeightBounds, ROOT_KEY};

/// Explanatory text shown before any subject has been submitted, and
/// substituted when an imported document carries no explanation.
pub const DEFAULT_EXPLANATION: &str = "\
Type a subject you want to understand and submit it. The map grows a web of \
prerequisite concepts around it; click any concept you already know and the \
explanation is rewritten around what is still unfamiliar.";

/// One session's complete state: the unit passed between the store and the
/// layout engine, and the unit persisted.
///
/// Sessions are copy-on-write: store transitions take a shared reference and
/// hand back a fresh snapshot, so a failed transition can never leave a
/// half-mutated map behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub nodes: ConceptGraph,
    /// Concepts the user marked as known, in click order. A key appears at
    /// most once.
    pub clicked: Vec<String>,
    /// Non-root concepts not yet clicked. Disjoint from `clicked`; kept in a
    /// deterministic order so exports and prompts are stable.
    pub unclicked: IndexSet<String>,
    pub explanation: String,
    /// The node the camera and the tree-seeding bias center on; usually the
    /// most recently clicked concept.
    pub focus: String,
}

impl Session {
    /// The canonical empty session: a single unlabeled root, empty
    /// partitions, welcome text, focus on the root.
    pub fn initial() -> Self {
        let mut nodes = ConceptGraph::with_root(None);
        nodes.normalize_weights(&WeightBounds::default());
        Self {
            nodes,
            clicked: Vec::new(),
            unclicked: IndexSet::new(),
            explanation: DEFAULT_EXPLANATION.to_string(),
            focus: ROOT_KEY.to_string(),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.nodes.subject()
    }

    /// True while a click has been registered (focus moved to a non-root
    /// node) but the matching expansion has not completed yet. Consumers dim
    /// the map in this state to signal loading.
    pub fn is_loading(&self) -> bool {
        self.focus != ROOT_KEY && !self.clicked.iter().any(|k| *k == self.focus)
    }

    /// The clicked/unclicked partition invariant: disjoint, duplicate-free,
    /// root-free, and jointly covering every non-root key.
    pub fn partition_is_consistent(&self) -> bool {
        if self.clicked.iter().any(|k| self.unclicked.contains(k)) {
            return false;
        }
        let mut seen = IndexSet::new();
        for key in &self.clicked {
            if key == ROOT_KEY || !seen.insert(key.as_str()) {
                return false;
            }
        }
        if self.unclicked.contains(ROOT_KEY) {
            return false;
        }
        let covered = self.clicked.len() + self.unclicked.len();
        if covered + 1 != self.nodes.len() {
            return false;
        }
        self.nodes
            .non_root_keys()
            .all(|key| seen.contains(key) || self.unclicked.contains(key))
    }

    /// Rebuild a session from a persisted document.
    ///
    /// The graph is validated structurally, the stored partition is
    /// reconciled against the node map (stale keys and duplicate clicks are
    /// dropped, every surviving non-root key lands in exactly one
    /// collection) and weights are re-derived rather than trusted verbatim.
    /// Focus returns to the root.
    pub fn restore(saved: SavedSession, bounds: &WeightBounds) -> Result<Self, ImportError> {
        let mut nodes = saved.node_data;
        nodes.validate()?;
        nodes.normalize_weights(bounds);

        let mut clicked: Vec<String> = Vec::new();
        for key in saved.clicked_nodes_list {
            if key != ROOT_KEY && nodes.contains(&key) && !clicked.contains(&key) {
                clicked.push(key);
            }
        }
        let unclicked: IndexSet<String> = nodes
            .non_root_keys()
            .filter(|key| !clicked.iter().any(|c| c == key))
            .map(str::to_string)
            .collect();

        Ok(Self {
            nodes,
            clicked,
            unclicked,
            explanation: saved.explanation,
            focus: ROOT_KEY.to_string(),
        })
    }

    pub fn to_saved(&self) -> SavedSession {
        SavedSession {
            node_data: self.nodes.clone(),
            clicked_nodes_list: self.clicked.clone(),
            unclicked_nodes: self.unclicked.clone(),
            explanation: self.explanation.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initial()
    }
}

/// The persisted form of a session. Field names are the wire contract; the
/// node map keeps both raw and derived weights so documents stay readable,
/// even though [`Session::restore`] re-derives on the way back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub node_data: ConceptGraph,
    pub clicked_nodes_list: Vec<String>,
    pub unclicked_nodes: IndexSet<String>,
    #[serde(default = "default_explanation")]
    pub explanation: String,
}

fn default_explanation() -> String {
    DEFAULT_EXPLANATION.to_string()
}

impl SavedSession {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(input: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(input)?)
    }
}
