use crate::algorithms::adjacency::PieceBox;
use crate::model::{PieceId, Vec2};
use crate::registry::PieceRegistry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapTarget {
    pub other: PieceId,
    /// Exact aligned center for the moving piece.
    pub position: Vec2,
}

/// Aligned position for `moving` against `other`, if close enough.
/// Horizontal alignment is tried before vertical.
pub fn snap_position(moving: &PieceBox, other: &PieceBox, tol: f32) -> Option<Vec2> {
    let dx = moving.center.x - other.center.x;
    let dy = moving.center.y - other.center.y;
    let expected_x = (moving.extents.x + other.extents.x) * 0.5;
    let expected_y = (moving.extents.y + other.extents.y) * 0.5;
    if (dx.abs() - expected_x).abs() < tol && dy.abs() < tol {
        return Some(Vec2::new(other.center.x + sign(dx) * expected_x, other.center.y));
    }
    if (dy.abs() - expected_y).abs() < tol && dx.abs() < tol {
        return Some(Vec2::new(other.center.x, other.center.y + sign(dy) * expected_y));
    }
    None
}

fn sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// First non-frozen piece (registration order) that `piece` can snap to.
pub fn find_snap(reg: &PieceRegistry, piece: PieceId, tol: f32) -> Option<SnapTarget> {
    let moving = PieceBox::of(reg.get(piece)?);
    reg.iter()
        .filter(|(id, p)| *id != piece && !p.frozen)
        .find_map(|(id, p)| {
            snap_position(&moving, &PieceBox::of(p), tol).map(|position| SnapTarget { other: id, position })
        })
}
