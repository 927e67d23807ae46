//! The layout engine.
//!
//! Pure functions turning a node map and a focus node into stable 2-D
//! positions, a camera window and render-ready attributes. Stateless and
//! safely re-entrant: nothing here touches the store, so previews and tests
//! may run layouts concurrently against the same snapshot.

use conceptmap_core::{ConceptGraph, Session};
use indexmap::IndexMap;

pub mod force;
pub mod frame;
pub mod tree;
pub mod visual;

pub use frame::ViewWindow;
pub use visual::{EdgeSprite, NodeRole, NodeSprite};

/// 2-D position in map space.
pub type MapPoint = euclid::default::Point2D<f32>;
/// 2-D displacement in map space.
pub type MapVec = euclid::default::Vector2D<f32>;

/// Positions keyed by concept, in node-map insertion order.
pub type Positions = IndexMap<String, MapPoint>;

/// Layout tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// World units per unit of derived distance along an edge.
    pub base_spacing: f32,
    /// Radius the whole graph is shrunk onto when it outgrows it.
    pub target_radius: f32,

    pub iterations: usize,
    pub k_attract: f32,
    pub k_repel: f32,
    /// Distance floor for the repulsion term.
    pub min_separation: f32,
    /// Per-node displacement clamp per iteration.
    pub max_displacement: f32,

    /// Angular weight of the focus-path child against `1.0` for siblings.
    pub focus_weight: f32,

    pub view_padding: f32,
    pub view_margin: f32,

    pub root_size_base: f32,
    pub root_size_min: f32,
    /// How much the root shrinks per non-root node.
    pub root_size_step: f32,
    pub node_size_base: f32,
    pub node_size_scale: f32,
    pub focus_flash_scale: f32,
    pub loading_opacity: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_spacing: 5.0,
            target_radius: 10.0,
            iterations: 100,
            k_attract: 0.02,
            k_repel: 0.2,
            min_separation: 0.1,
            max_displacement: 1.0,
            focus_weight: 3.0,
            view_padding: 1.2,
            view_margin: 5.0,
            root_size_base: 120.0,
            root_size_min: 80.0,
            root_size_step: 2.0,
            node_size_base: 50.0,
            node_size_scale: 30.0,
            focus_flash_scale: 1.25,
            loading_opacity: 0.4,
        }
    }
}

/// Positions plus camera window for one node map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout {
    pub positions: Positions,
    pub view: ViewWindow,
}

/// Everything a consumer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSprite>,
    pub view: ViewWindow,
}

/// The full pipeline: deterministic tree seeding, bounded force relaxation,
/// shrink-only rescale, focus-centered framing.
pub fn compute_layout(nodes: &ConceptGraph, focus: &str, cfg: &LayoutConfig) -> MapLayout {
    let mut positions = tree::seed_positions(nodes, focus, cfg);
    force::relax_positions(&mut positions, nodes, cfg);
    frame::rescale_to_fit(&mut positions, cfg.target_radius);
    let view = frame::view_window(&positions, focus, cfg);
    MapLayout { positions, view }
}

/// Layout plus render-ready node and edge attributes for a session.
pub fn scene(session: &Session, cfg: &LayoutConfig) -> MapScene {
    let layout = compute_layout(&session.nodes, &session.focus, cfg);
    MapScene {
        nodes: visual::node_sprites(session, &layout.positions, cfg),
        edges: visual::edge_sprites(session, &layout.positions),
        view: layout.view,
    }
}
