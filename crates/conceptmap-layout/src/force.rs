//! Bounded-iteration force relaxation.
//!
//! A heuristic pass, not a convergence-guaranteed solver: every unordered
//! pair repels with `k_repel / d`, every parent-child edge behaves as a
//! spring with rest length `derived_distance * base_spacing`, and each
//! node's per-iteration displacement is clamped so the system cannot
//! oscillate apart. The root is exempt from displacement; without a pinned
//! anchor the whole graph would drift and the focus-relative framing would
//! be meaningless.

use std::collections::HashMap;

use conceptmap_core::{ConceptGraph, ROOT_KEY};

use crate::{LayoutConfig, MapVec, Positions};

pub fn relax_positions(positions: &mut Positions, nodes: &ConceptGraph, cfg: &LayoutConfig) {
    let keys: Vec<String> = positions.keys().cloned().collect();
    if keys.len() <= 1 {
        return;
    }
    let index_of: HashMap<&str, usize> = keys
        .iter()
        .enumerate()
        .map(|(idx, key)| (key.as_str(), idx))
        .collect();

    for _ in 0..cfg.iterations {
        let mut displacements = vec![MapVec::zero(); keys.len()];

        // Repulsion between every unordered pair.
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let a = positions[keys[i].as_str()];
                let b = positions[keys[j].as_str()];
                let delta = a - b;
                let dist = delta.length().max(cfg.min_separation);
                let push = delta / dist * (cfg.k_repel / dist);
                displacements[i] += push;
                displacements[j] -= push;
            }
        }

        // Springs along parent-child edges, toward the rest length from
        // either direction.
        for (key, node) in nodes.nodes.iter() {
            let Some(parent) = node.parent.as_deref() else {
                continue;
            };
            let (Some(&child_idx), Some(&parent_idx)) =
                (index_of.get(key.as_str()), index_of.get(parent))
            else {
                continue;
            };
            let delta = positions[key.as_str()] - positions[parent];
            let dist = delta.length().max(cfg.min_separation);
            let rest = node.distance * cfg.base_spacing;
            let pull = delta / dist * (cfg.k_attract * (dist - rest));
            displacements[child_idx] -= pull;
            displacements[parent_idx] += pull;
        }

        // Integrate. The root stays pinned at the origin.
        for (idx, key) in keys.iter().enumerate() {
            if key == ROOT_KEY {
                continue;
            }
            let mut step = displacements[idx];
            let magnitude = step.length();
            if magnitude > cfg.max_displacement {
                step = step / magnitude * cfg.max_displacement;
            }
            if let Some(pos) = positions.get_mut(key) {
                *pos += step;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapPoint;
    use conceptmap_core::WeightBounds;

    fn chain_graph() -> ConceptGraph {
        let mut graph = ConceptGraph::with_root(None);
        graph.insert_child(ROOT_KEY, "child", 1.0, 0.5);
        graph.normalize_weights(&WeightBounds::default());
        graph
    }

    #[test]
    fn root_never_moves() {
        let graph = chain_graph();
        let mut positions = Positions::new();
        positions.insert(ROOT_KEY.to_string(), MapPoint::origin());
        positions.insert("child".to_string(), MapPoint::new(20.0, 0.0));

        relax_positions(&mut positions, &graph, &LayoutConfig::default());

        let root = positions[ROOT_KEY];
        assert_eq!((root.x, root.y), (0.0, 0.0));
    }

    #[test]
    fn spring_draws_a_stretched_edge_toward_rest_length() {
        let graph = chain_graph();
        let cfg = LayoutConfig::default();
        let mut positions = Positions::new();
        positions.insert(ROOT_KEY.to_string(), MapPoint::origin());
        positions.insert("child".to_string(), MapPoint::new(20.0, 0.0));

        relax_positions(&mut positions, &graph, &cfg);

        // Rest length is distance * base_spacing = 5.0; the equilibrium sits
        // a bit beyond it where spring and repulsion balance.
        let dist = positions["child"].to_vector().length();
        assert!(dist < 10.0, "edge did not contract: {dist}");
        assert!(dist > cfg.base_spacing - 1.0, "edge overshot: {dist}");
    }

    #[test]
    fn displacement_is_clamped_per_iteration() {
        let graph = chain_graph();
        let cfg = LayoutConfig {
            iterations: 1,
            k_repel: 1000.0,
            ..LayoutConfig::default()
        };
        let mut positions = Positions::new();
        positions.insert(ROOT_KEY.to_string(), MapPoint::origin());
        positions.insert("child".to_string(), MapPoint::new(0.05, 0.0));

        let before = positions["child"];
        relax_positions(&mut positions, &graph, &cfg);
        let moved = (positions["child"] - before).length();

        assert!(moved <= cfg.max_displacement + 1e-4, "moved {moved}");
        assert!(moved > cfg.max_displacement - 1e-4, "expected a full step");
    }

    #[test]
    fn degenerate_maps_are_untouched() {
        let graph = ConceptGraph::with_root(None);
        let mut positions = Positions::new();
        positions.insert(ROOT_KEY.to_string(), MapPoint::origin());
        let before = positions.clone();

        relax_positions(&mut positions, &graph, &LayoutConfig::default());
        assert_eq!(positions, before);
    }
}
