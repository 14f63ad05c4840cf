use crate::components::Position;
use crate::map::SchoolMap;

// ============================================================================
// Axis-Aligned Box Overlap
// ============================================================================

/// Strict AABB overlap: all four half-plane tests use strict inequality, so
/// boxes that merely touch along an edge do not collide.
#[must_use]
pub fn boxes_overlap(a: &Position, a_w: f32, a_h: f32, b: &Position, b_w: f32, b_h: f32) -> bool {
    a.x < b.x + b_w && a.x + a_w > b.x && a.y < b.y + b_h && a.y + a_h > b.y
}

// ============================================================================
// Per-Axis Sliding Movement
// ============================================================================

/// Attempt a displacement one axis at a time: the X candidate holds Y fixed
/// and the Y candidate holds the (possibly updated) X fixed; each axis is
/// committed only if the candidate position is walkable. Blocked diagonal
/// movement therefore degrades into a slide along the open axis. Returns
/// which axes moved.
pub fn slide(map: &SchoolMap, pos: &mut Position, dx: f32, dy: f32) -> (bool, bool) {
    let mut moved_x = false;
    let mut moved_y = false;

    if dx != 0.0 && map.is_walkable(pos.x + dx, pos.y) {
        pos.x += dx;
        moved_x = true;
    }
    if dy != 0.0 && map.is_walkable(pos.x, pos.y + dy) {
        pos.y += dy;
        moved_y = true;
    }

    (moved_x, moved_y)
}

// ============================================================================
// Tests
// ============================================================================
