//! Conditional rescale and focus-centered framing.

use conceptmap_core::ROOT_KEY;

use crate::{LayoutConfig, MapPoint, Positions};

/// Camera window over map space. Square, centered on the focus node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
}

/// Shrink-only rescale: if the farthest non-root node lies beyond
/// `target_radius`, every position is scaled uniformly so that node lands
/// exactly on the target. Graphs that already fit are left untouched;
/// rescale never expands.
pub fn rescale_to_fit(positions: &mut Positions, target_radius: f32) {
    let max_radius = positions
        .iter()
        .filter(|(key, _)| key.as_str() != ROOT_KEY)
        .map(|(_, pos)| pos.to_vector().length())
        .fold(0.0f32, f32::max);

    if max_radius > target_radius {
        let scale = target_radius / max_radius;
        for pos in positions.values_mut() {
            *pos = MapPoint::new(pos.x * scale, pos.y * scale);
        }
    }
}

/// Window centered on the focus node's position (not the centroid), sized to
/// the larger of the horizontal/vertical extents from the focus to the
/// graph's bounding box, padded and margined. The node being explored stays
/// visible and roughly centered however asymmetrically the graph grows.
pub fn view_window(positions: &Positions, focus: &str, cfg: &LayoutConfig) -> ViewWindow {
    if positions.len() < 2 {
        return ViewWindow {
            x_range: (-10.0, 10.0),
            y_range: (-10.0, 10.0),
        };
    }

    let focus_pos = positions
        .get(focus)
        .copied()
        .unwrap_or_else(MapPoint::origin);

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for pos in positions.values() {
        min_x = min_x.min(pos.x);
        max_x = max_x.max(pos.x);
        min_y = min_y.min(pos.y);
        max_y = max_y.max(pos.y);
    }

    let spread_x = (focus_pos.x - min_x).max(max_x - focus_pos.x);
    let spread_y = (focus_pos.y - min_y).max(max_y - focus_pos.y);
    let half = spread_x.max(spread_y) * cfg.view_padding + cfg.view_margin;

    ViewWindow {
        x_range: (focus_pos.x - half, focus_pos.x + half),
        y_range: (focus_pos.y - half, focus_pos.y + half),
    }
}
