use crate::activation::{EdgeActivation, EdgeRef};
use crate::geometry::math::distance;
use crate::graph::{GlobalGraph, GlobalNode, Segment};
use crate::model::{NodeId, PieceId, SegmentId, Vec2};
use crate::registry::{Piece, PieceRegistry};
use log::debug;

struct Builder {
    nodes: Vec<GlobalNode>,
    segments: Vec<Segment>,
    eps: f32,
}

impl Builder {
    fn find_node(&self, p: Vec2) -> Option<usize> {
        self.nodes.iter().position(|n| distance(n.position, p) < self.eps)
    }

    // First match wins: a position close to two existing nodes joins the
    // earlier one.
    fn find_or_add_node(&mut self, p: Vec2, owner: PieceId) -> usize {
        if let Some(i) = self.find_node(p) {
            if !self.nodes[i].owners.contains(&owner) {
                self.nodes[i].owners.push(owner);
            }
            return i;
        }
        self.nodes.push(GlobalNode { position: p, segments: Vec::new(), owners: vec![owner] });
        self.nodes.len() - 1
    }

    fn connected(&self, x: usize, y: usize) -> bool {
        let (nx, ny) = (NodeId(x as u32), NodeId(y as u32));
        self.nodes[x]
            .segments
            .iter()
            .chain(self.nodes[y].segments.iter())
            .any(|s| self.segments[s.0 as usize].connects(nx, ny))
    }

    fn push_segment(&mut self, seg: Segment) {
        let sid = SegmentId(self.segments.len() as u32);
        let (a, b) = (seg.a.0 as usize, seg.b.0 as usize);
        self.nodes[a].segments.push(sid);
        if seg.bidirectional {
            self.nodes[b].segments.push(sid);
        }
        self.segments.push(seg);
    }

    fn merge_piece(&mut self, id: PieceId, piece: &Piece, activation: &EdgeActivation) {
        let local_to_global: Vec<usize> = piece
            .world_nodes()
            .into_iter()
            .map(|p| self.find_or_add_node(p, id))
            .collect();
        for (ei, e) in piece.edges.iter().enumerate() {
            let (Some(&ga), Some(&gb)) = (local_to_global.get(e.a as usize), local_to_global.get(e.b as usize)) else {
                continue;
            };
            // Both ends collapsed into one node: nothing to traverse.
            if ga == gb {
                continue;
            }
            let source = EdgeRef::new(id, ei as u32);
            self.push_segment(Segment {
                a: NodeId(ga as u32),
                b: NodeId(gb as u32),
                bidirectional: e.bidirectional,
                active: activation.is_active(source, e.active),
                owners: vec![id],
                source: Some(source),
            });
        }
    }

    fn link_pieces(&mut self, pa: PieceId, a: &[Vec2], pb: PieceId, b: &[Vec2]) {
        for &wa in a {
            for &wb in b {
                if distance(wa, wb) >= self.eps {
                    continue;
                }
                let (Some(ia), Some(ib)) = (self.find_node(wa), self.find_node(wb)) else {
                    continue;
                };
                if ia == ib || self.connected(ia, ib) {
                    continue;
                }
                self.push_segment(Segment {
                    a: NodeId(ia as u32),
                    b: NodeId(ib as u32),
                    bidirectional: true,
                    active: true,
                    owners: vec![pa, pb],
                    source: None,
                });
            }
        }
    }
}

/// Rebuild the global graph from scratch. Frozen pieces are left out.
pub fn merge_pieces(reg: &PieceRegistry, activation: &EdgeActivation, eps: f32, previous_generation: u64) -> GlobalGraph {
    let mut b = Builder { nodes: Vec::new(), segments: Vec::new(), eps };
    let pieces: Vec<(PieceId, &Piece)> = reg.iter().filter(|(_, p)| !p.frozen).collect();
    for (id, piece) in &pieces {
        b.merge_piece(*id, piece, activation);
    }
    let world: Vec<Vec<Vec2>> = pieces.iter().map(|(_, p)| p.world_nodes()).collect();
    for i in 0..pieces.len() {
        for j in (i + 1)..pieces.len() {
            b.link_pieces(pieces[i].0, &world[i], pieces[j].0, &world[j]);
        }
    }
    let generation = previous_generation.wrapping_add(1);
    debug!(
        "merged {} pieces into {} nodes / {} segments (generation {})",
        pieces.len(),
        b.nodes.len(),
        b.segments.len(),
        generation
    );
    GlobalGraph { nodes: b.nodes, segments: b.segments, generation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalEdge, PieceDef};

    fn registry(defs: Vec<PieceDef>) -> PieceRegistry {
        let mut reg = PieceRegistry::new();
        for (i, d) in defs.into_iter().enumerate() {
            reg.insert(d, i as i64 + 1).unwrap();
        }
        reg
    }

    fn bar(x: f32, y: f32) -> PieceDef {
        PieceDef::new(Vec2::new(1.0, 1.0), &[(-0.5, 0.0), (0.5, 0.0)], &[(0, 1)], x, y)
    }

    #[test]
    fn coincident_nodes_are_deduplicated() {
        let reg = registry(vec![bar(0.0, 0.0), bar(1.0, 0.0)]);
        let g = merge_pieces(&reg, &EdgeActivation::new(), 0.01, 0);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.segment_count(), 2);
        let shared = g.find_node(Vec2::new(0.5, 0.0), 0.01).unwrap();
        assert_eq!(g.node(shared).unwrap().owners, vec![PieceId(0), PieceId(1)]);
        assert_eq!(g.node(shared).unwrap().segments.len(), 2);
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn out_of_range_edge_is_skipped() {
        let mut def = bar(0.0, 0.0);
        def.edges.push(LocalEdge::new(0, 7));
        let reg = registry(vec![def]);
        let g = merge_pieces(&reg, &EdgeActivation::new(), 0.01, 0);
        assert_eq!(g.segment_count(), 1);
    }

    #[test]
    fn one_way_edge_is_indexed_at_its_start_only() {
        let mut def = bar(0.0, 0.0);
        def.edges[0].bidirectional = false;
        let reg = registry(vec![def]);
        let g = merge_pieces(&reg, &EdgeActivation::new(), 0.01, 0);
        let s = g.segment(SegmentId(0)).unwrap();
        assert_eq!(g.node(s.a).unwrap().segments.len(), 1);
        assert!(g.node(s.b).unwrap().segments.is_empty());
    }

    #[test]
    fn frozen_pieces_are_left_out() {
        let mut reg = registry(vec![bar(0.0, 0.0), bar(1.0, 0.0)]);
        reg.get_mut(PieceId(1)).unwrap().frozen = true;
        let g = merge_pieces(&reg, &EdgeActivation::new(), 0.01, 4);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.generation(), 5);
    }

    #[test]
    fn chained_near_nodes_get_a_synthesized_link() {
        // B's node joins A's boundary node; C's node is too far from A's but
        // within epsilon of B's, so it gets its own node plus a link.
        let a = bar(0.0, 0.0);
        let b = PieceDef::new(Vec2::new(1.0, 1.0), &[(-0.491, 0.0)], &[], 1.0, 0.0);
        let c = PieceDef::new(Vec2::new(1.0, 1.0), &[(-0.482, 0.0)], &[], 1.0, 0.0);
        let reg = registry(vec![a, b, c]);
        let g = merge_pieces(&reg, &EdgeActivation::new(), 0.01, 0);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.segment_count(), 2);
        let link = g.segment(SegmentId(1)).unwrap();
        assert!(link.source.is_none());
        assert!(link.bidirectional && link.active);
        assert_eq!(link.owners, vec![PieceId(1), PieceId(2)]);
        assert_ne!(link.a, link.b);
    }
}
