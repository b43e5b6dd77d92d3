use crate::error::EngineError;
use crate::geometry::limits;
use crate::geometry::math::rotated_extents;
use crate::model::{GroupId, LocalEdge, LocalNode, PieceDef, PieceId, Transform, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceState {
    /// Not part of any group; the piece reports its original ID.
    Detached,
    Grouped(GroupId),
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub nodes: Vec<LocalNode>,
    pub edges: Vec<LocalEdge>,
    pub transform: Transform,
    pub size: Vec2,
    pub state: PieceState,
    pub original_id: GroupId,
    /// Set while the piece is held by a drag; frozen pieces take no part in
    /// the merged graph or adjacency.
    pub frozen: bool,
}

impl Piece {
    pub fn group_id(&self) -> GroupId {
        match self.state {
            PieceState::Grouped(id) => id,
            PieceState::Detached => self.original_id,
        }
    }

    pub fn world_nodes(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|n| self.transform.apply(n.position)).collect()
    }

    /// World-space axis-aligned extents.
    pub fn extents(&self) -> Vec2 {
        rotated_extents(self.size, self.transform.rotation_deg)
    }
}

/// Explicit registry of every piece in the scene. Slots are never reused so a
/// `PieceId` stays unambiguous for the lifetime of the registry.
#[derive(Clone, Debug, Default)]
pub struct PieceRegistry {
    pub(crate) pieces: Vec<Option<Piece>>, // id is index
}

impl PieceRegistry {
    pub fn new() -> Self {
        PieceRegistry::default()
    }

    pub fn validate(def: &PieceDef) -> Result<(), EngineError> {
        if def.nodes.len() > limits::MAX_NODES_PER_PIECE {
            return Err(EngineError::LimitExceeded { what: "nodes per piece", limit: limits::MAX_NODES_PER_PIECE });
        }
        if def.edges.len() > limits::MAX_EDGES_PER_PIECE {
            return Err(EngineError::LimitExceeded { what: "edges per piece", limit: limits::MAX_EDGES_PER_PIECE });
        }
        let t = &def.transform;
        if !limits::in_coord_bounds(t.position.x) || !limits::in_coord_bounds(t.position.y) {
            return Err(EngineError::NonFinite { param: "transform.position" });
        }
        if !t.rotation_deg.is_finite() {
            return Err(EngineError::NonFinite { param: "transform.rotation_deg" });
        }
        if !limits::in_size_bounds(def.size.x) || !limits::in_size_bounds(def.size.y) {
            return Err(EngineError::InvalidSize { x: def.size.x, y: def.size.y });
        }
        for n in &def.nodes {
            if !limits::in_coord_bounds(n.position.x) || !limits::in_coord_bounds(n.position.y) {
                return Err(EngineError::NonFinite { param: "nodes" });
            }
        }
        Ok(())
    }

    /// Insert a validated piece; the caller decides its original group ID.
    pub(crate) fn insert(&mut self, def: PieceDef, original_id: GroupId) -> Result<PieceId, EngineError> {
        if self.len() >= limits::MAX_PIECES {
            return Err(EngineError::LimitExceeded { what: "pieces", limit: limits::MAX_PIECES });
        }
        let id = PieceId(self.pieces.len() as u32);
        self.pieces.push(Some(Piece {
            nodes: def.nodes,
            edges: def.edges,
            transform: def.transform,
            size: def.size,
            state: PieceState::Detached,
            original_id,
            frozen: false,
        }));
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: PieceId) -> Option<Piece> {
        self.pieces.get_mut(id.0 as usize).and_then(|slot| slot.take())
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0 as usize).and_then(|p| p.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.0 as usize).and_then(|p| p.as_mut())
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live pieces in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (PieceId(i as u32), p)))
    }

    pub fn is_original_id(&self, id: GroupId) -> bool {
        self.iter().any(|(_, p)| p.original_id == id)
    }
}
