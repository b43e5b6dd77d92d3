use crate::geometry::math::seg_distance_sq;
use crate::graph::{GlobalGraph, Segment};
use crate::model::{GroupId, NodeId, SegmentId, Vec2};
use crate::registry::PieceRegistry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentHit {
    pub segment: SegmentId,
    /// Parameter of the closest point, clamped to [0,1].
    pub t: f32,
    pub point: Vec2,
    pub dist: f32,
}

/// Closest active segment accepted by `filter`, within `max_dist` of `p`.
/// Ties go to the lower segment id.
pub fn nearest_segment<F>(g: &GlobalGraph, p: Vec2, max_dist: f32, filter: F) -> Option<SegmentHit>
where
    F: Fn(SegmentId, &Segment) -> bool,
{
    let max2 = max_dist * max_dist;
    let mut best: Option<(SegmentId, f32, f32)> = None;
    for (id, s) in g.segments() {
        if !s.active || !filter(id, s) {
            continue;
        }
        let Some((a, b)) = g.endpoints(id) else { continue };
        let (d2, t) = seg_distance_sq(p.x, p.y, a.x, a.y, b.x, b.y);
        if d2 <= max2 && best.map_or(true, |(_, bd, _)| d2 < bd) {
            best = Some((id, d2, t));
        }
    }
    let (segment, d2, t) = best?;
    let point = g.point_at(segment, t)?;
    Some(SegmentHit { segment, t, point, dist: d2.sqrt() })
}

/// True when some piece that contributed `node` currently belongs to `group`.
pub fn node_in_group(g: &GlobalGraph, reg: &PieceRegistry, node: NodeId, group: GroupId) -> bool {
    g.node(node).map_or(false, |n| {
        n.owners.iter().any(|p| reg.get(*p).map_or(false, |piece| piece.group_id() == group))
    })
}

/// A segment is usable by a group when both of its endpoints are.
pub fn segment_in_group(g: &GlobalGraph, reg: &PieceRegistry, seg: &Segment, group: GroupId) -> bool {
    node_in_group(g, reg, seg.a, group) && node_in_group(g, reg, seg.b, group)
}
