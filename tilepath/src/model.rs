use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Group identifier. Authored IDs and generated IDs share one space.
pub type GroupId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoverId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
    pub fn dot(self, o: Vec2) -> f32 {
        self.x * o.x + self.y * o.y
    }
    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Rigid 2D placement of a piece: rotate about the piece origin, then translate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    #[serde(default)]
    pub rotation_deg: f32,
}

impl Transform {
    pub fn at(x: f32, y: f32) -> Self {
        Transform { position: Vec2::new(x, y), rotation_deg: 0.0 }
    }

    pub fn apply(&self, local: Vec2) -> Vec2 {
        crate::geometry::math::rotate(local, self.rotation_deg) + self.position
    }

    pub fn inverse_apply(&self, world: Vec2) -> Vec2 {
        crate::geometry::math::rotate(world - self.position, -self.rotation_deg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalNode {
    pub position: Vec2,
}

fn default_true() -> bool {
    true
}

/// Authored edge between two local nodes of the same piece.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalEdge {
    pub a: u32,
    pub b: u32,
    #[serde(default = "default_true")]
    pub bidirectional: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl LocalEdge {
    pub fn new(a: u32, b: u32) -> Self {
        LocalEdge { a, b, bidirectional: true, active: true }
    }
}

/// Registration input for one piece.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PieceDef {
    pub nodes: Vec<LocalNode>,
    pub edges: Vec<LocalEdge>,
    #[serde(default)]
    pub transform: Transform,
    /// Extents of the piece in local space (before rotation).
    pub size: Vec2,
    /// Authored group ID restored whenever the piece ends up alone.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl PieceDef {
    /// Piece with the given extents and local graph, placed at `(x, y)`.
    pub fn new(size: Vec2, nodes: &[(f32, f32)], edges: &[(u32, u32)], x: f32, y: f32) -> Self {
        PieceDef {
            nodes: nodes.iter().map(|&(nx, ny)| LocalNode { position: Vec2::new(nx, ny) }).collect(),
            edges: edges.iter().map(|&(a, b)| LocalEdge::new(a, b)).collect(),
            transform: Transform::at(x, y),
            size,
            group_id: None,
        }
    }

    pub fn with_group_id(mut self, id: GroupId) -> Self {
        self.group_id = Some(id);
        self
    }
}
