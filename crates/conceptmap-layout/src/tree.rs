//! Deterministic radial tree seeding.
//!
//! The root is fixed at the origin; every other node sits on a circle
//! around its parent at `base_spacing * derived_distance`. Each parent
//! splits its angular sector among its children, with the child on the
//! focus path given extra angular weight so the branch being explored gets
//! room without excluding the rest. No randomness anywhere: identical node
//! maps seed to identical positions.

use std::collections::HashMap;

use conceptmap_core::{ConceptGraph, ROOT_KEY};

use crate::{LayoutConfig, MapPoint, MapVec, Positions};

pub fn seed_positions(nodes: &ConceptGraph, focus: &str, cfg: &LayoutConfig) -> Positions {
    let focus_path = nodes.focus_path(focus);

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (key, node) in nodes.nodes.iter() {
        if let Some(parent) = node.parent.as_deref() {
            children.entry(parent).or_default().push(key.as_str());
        }
    }

    let mut positions = Positions::new();
    if nodes.contains(ROOT_KEY) {
        place(
            nodes,
            &children,
            &focus_path,
            cfg,
            ROOT_KEY,
            0.0,
            std::f32::consts::TAU,
            &mut positions,
        );
    }
    positions
}

#[allow(clippy::too_many_arguments)]
fn place(
    nodes: &ConceptGraph,
    children: &HashMap<&str, Vec<&str>>,
    focus_path: &[String],
    cfg: &LayoutConfig,
    key: &str,
    angle: f32,
    spread: f32,
    positions: &mut Positions,
) {
    if positions.contains_key(key) {
        return;
    }

    let position = if key == ROOT_KEY {
        MapPoint::origin()
    } else {
        let Some(node) = nodes.get(key) else { return };
        let parent_pos = node
            .parent
            .as_deref()
            .and_then(|parent| positions.get(parent))
            .copied()
            .unwrap_or_else(MapPoint::origin);
        let radius = cfg.base_spacing * node.distance;
        parent_pos + MapVec::new(radius * angle.cos(), radius * angle.sin())
    };
    positions.insert(key.to_string(), position);

    let Some(kids) = children.get(key) else { return };

    // The next hop along the focus path, if it runs through this node.
    let next_focus = focus_path
        .iter()
        .position(|step| step == key)
        .and_then(|idx| focus_path.get(idx + 1))
        .map(String::as_str);

    let weights: Vec<f32> = kids
        .iter()
        .map(|kid| {
            if Some(*kid) == next_focus {
                cfg.focus_weight
            } else {
                1.0
            }
        })
        .collect();
    let total: f32 = weights.iter().sum();

    let mut cursor = angle - spread / 2.0;
    for (kid, weight) in kids.iter().zip(&weights) {
        let kid_spread = spread * weight / total;
        place(
            nodes,
            children,
            focus_path,
            cfg,
            kid,
            cursor + kid_spread / 2.0,
            kid_spread,
            positions,
        );
        cursor += kid_spread;
    }
}
