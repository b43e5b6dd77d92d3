use crate::activation::EdgeRef;
use crate::geometry::math::direction;
use crate::model::{NodeId, PieceId, SegmentId, Vec2};

#[derive(Clone, Debug)]
pub struct GlobalNode {
    pub position: Vec2,
    /// Segments reachable from this node.
    pub segments: Vec<SegmentId>,
    /// Pieces that contributed a local node at this position.
    pub owners: Vec<PieceId>,
}

#[derive(Clone, Debug)]
pub struct Segment {
    pub a: NodeId,
    pub b: NodeId,
    pub bidirectional: bool,
    pub active: bool,
    pub owners: Vec<PieceId>,
    /// Authored edge this segment came from; `None` for inter-piece links.
    pub source: Option<EdgeRef>,
}

impl Segment {
    pub fn other(&self, n: NodeId) -> NodeId {
        if self.a == n { self.b } else { self.a }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// One generation of the merged graph. Ids are only meaningful together with
/// the generation they were read from; every rebuild replaces the whole value.
#[derive(Clone, Debug, Default)]
pub struct GlobalGraph {
    pub(crate) nodes: Vec<GlobalNode>,    // id is index
    pub(crate) segments: Vec<Segment>,    // id is index
    pub(crate) generation: u64,
}

impl GlobalGraph {
    pub fn new() -> Self {
        GlobalGraph::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&GlobalNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0 as usize)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GlobalNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter().enumerate().map(|(i, s)| (SegmentId(i as u32), s))
    }

    pub fn node_position(&self, id: NodeId) -> Option<Vec2> {
        self.node(id).map(|n| n.position)
    }

    pub fn endpoints(&self, id: SegmentId) -> Option<(Vec2, Vec2)> {
        let s = self.segment(id)?;
        Some((self.node_position(s.a)?, self.node_position(s.b)?))
    }

    /// Unit direction from the start node to the end node.
    pub fn segment_direction(&self, id: SegmentId) -> Option<Vec2> {
        let (a, b) = self.endpoints(id)?;
        Some(direction(a, b))
    }

    pub fn segment_length(&self, id: SegmentId) -> Option<f32> {
        let (a, b) = self.endpoints(id)?;
        Some((b - a).length())
    }

    pub fn point_at(&self, id: SegmentId, t: f32) -> Option<Vec2> {
        let (a, b) = self.endpoints(id)?;
        Some(crate::geometry::math::lerp(a, b, t))
    }

    /// First node within `eps` of `p`, in allocation order.
    pub fn find_node(&self, p: Vec2, eps: f32) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| crate::geometry::math::distance(n.position, p) < eps)
            .map(|i| NodeId(i as u32))
    }

    /// Flattened `[x0, y0, x1, y1, ...]` positions, for interop.
    pub fn node_arrays(&self) -> Vec<f32> {
        let mut pos = Vec::with_capacity(self.nodes.len() * 2);
        for n in &self.nodes {
            pos.push(n.position.x);
            pos.push(n.position.y);
        }
        pos
    }

    /// Flattened `[a0, b0, a1, b1, ...]` endpoints and one active flag per segment.
    pub fn segment_arrays(&self) -> (Vec<u32>, Vec<u8>) {
        let mut endpoints = Vec::with_capacity(self.segments.len() * 2);
        let mut active = Vec::with_capacity(self.segments.len());
        for s in &self.segments {
            endpoints.push(s.a.0);
            endpoints.push(s.b.0);
            active.push(s.active as u8);
        }
        (endpoints, active)
    }
}
