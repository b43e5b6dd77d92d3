use crate::model::Vec2;
use crate::registry::Piece;

/// World-space footprint of a piece: center plus axis-aligned extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceBox {
    pub center: Vec2,
    pub extents: Vec2,
}

impl PieceBox {
    pub fn new(center: Vec2, extents: Vec2) -> Self {
        PieceBox { center, extents }
    }

    pub fn of(piece: &Piece) -> Self {
        PieceBox { center: piece.transform.position, extents: piece.extents() }
    }
}

/// Which side of `b` the piece `a` is touching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Up,
    Down,
}

/// Edge-to-edge contact between `a` and `b` within `tol`, or `None`.
/// Horizontal contact is checked first.
pub fn adjacency_side(a: &PieceBox, b: &PieceBox, tol: f32) -> Option<Side> {
    let dx = a.center.x - b.center.x;
    let dy = a.center.y - b.center.y;
    let expected_x = (a.extents.x + b.extents.x) * 0.5;
    let expected_y = (a.extents.y + b.extents.y) * 0.5;
    if (dx.abs() - expected_x).abs() < tol && dy.abs() < tol {
        return Some(if dx > 0.0 { Side::Right } else { Side::Left });
    }
    if (dy.abs() - expected_y).abs() < tol && dx.abs() < tol {
        return Some(if dy > 0.0 { Side::Up } else { Side::Down });
    }
    None
}

/// No hysteresis: the answer flips exactly at the tolerance boundary.
pub fn touching(a: &PieceBox, b: &PieceBox, tol: f32) -> bool {
    adjacency_side(a, b, tol).is_some()
}

pub fn pieces_touching(a: &Piece, b: &Piece, tol: f32) -> bool {
    touching(&PieceBox::of(a), &PieceBox::of(b), tol)
}
