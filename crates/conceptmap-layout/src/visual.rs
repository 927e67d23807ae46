//! Render-ready attributes derived per node and edge.
//!
//! Colors stay on the consumer's side of the fence: this module reports
//! *membership* (root / focused / clicked / unclicked) and the consumer maps
//! roles onto its theme.

use conceptmap_core::{Session, ROOT_KEY};

use crate::{LayoutConfig, MapPoint, Positions};

/// Which partition a node belongs to, for theming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    /// The most recently focused (clicked) concept.
    Focused,
    Clicked,
    Unclicked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub key: String,
    pub label: String,
    pub position: MapPoint,
    pub size: f32,
    pub role: NodeRole,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSprite {
    /// Key of the child endpoint; the edge runs parent -> child.
    pub child: String,
    pub from: MapPoint,
    pub to: MapPoint,
    /// The child has been clicked; consumers restyle these edges.
    pub child_clicked: bool,
    /// A click is mid-flight (clicked but not yet expanded): dim to signal
    /// loading.
    pub dimmed: bool,
}

pub fn node_sprites(session: &Session, positions: &Positions, cfg: &LayoutConfig) -> Vec<NodeSprite> {
    let loading = session.is_loading();
    // The root shrinks as the map grows so it stops dominating, but never
    // below the floor.
    let non_root = positions.len().saturating_sub(1) as f32;
    let root_size = (cfg.root_size_base - cfg.root_size_step * non_root).max(cfg.root_size_min);

    positions
        .iter()
        .map(|(key, &position)| {
            let role = if key == ROOT_KEY {
                NodeRole::Root
            } else if *key == session.focus {
                NodeRole::Focused
            } else if session.clicked.contains(key) {
                NodeRole::Clicked
            } else {
                NodeRole::Unclicked
            };

            let label = if key == ROOT_KEY {
                session.subject().unwrap_or(key).to_string()
            } else {
                key.clone()
            };

            let mut size = if key == ROOT_KEY {
                root_size
            } else {
                let breadth = session.nodes.get(key).map(|n| n.breadth).unwrap_or(1.0);
                cfg.node_size_base + cfg.node_size_scale * breadth
            };
            if role == NodeRole::Focused {
                size *= cfg.focus_flash_scale;
            }

            NodeSprite {
                key: key.clone(),
                label,
                position,
                size,
                role,
                opacity: if loading { cfg.loading_opacity } else { 1.0 },
            }
        })
        .collect()
}

pub fn edge_sprites(session: &Session, positions: &Positions) -> Vec<EdgeSprite> {
    let loading = session.is_loading();
    positions
        .iter()
        .filter_map(|(key, &to)| {
            let parent = session.nodes.get(key)?.parent.as_deref()?;
            let from = *positions.get(parent)?;
            Some(EdgeSprite {
                child: key.clone(),
                from,
                to,
                child_clicked: session.clicked.contains(key),
                dimmed: loading,
            })
        })
        .collect()
}
