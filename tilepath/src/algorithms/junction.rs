use crate::algorithms::picking::segment_in_group;
use crate::config::Tolerances;
use crate::geometry::math::{direction, distance, project_on_segment};
use crate::graph::GlobalGraph;
use crate::model::{GroupId, SegmentId, Vec2};
use crate::registry::PieceRegistry;
use log::debug;

/// Where a junction switch lands the mover.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchTarget {
    pub segment: SegmentId,
    pub t: f32,
    /// Projection of the mover's position onto `segment`.
    pub point: Vec2,
    pub alignment: f32,
}

/// Pick the branch at the node nearer to `t` that best matches `input`.
///
/// Candidates are the node's other active segments usable by `group`. A
/// candidate needs `dot(node -> far end, input)` above the alignment
/// threshold, and the mover must be within the gate radius of the node: the
/// wide junction radius for turns, the narrow switch radius for branches
/// that continue roughly straight.
pub fn resolve_switch(
    g: &GlobalGraph,
    reg: &PieceRegistry,
    current: SegmentId,
    t: f32,
    position: Vec2,
    input: Vec2,
    group: GroupId,
    tol: &Tolerances,
) -> Option<SwitchTarget> {
    let seg = g.segment(current)?;
    let node_id = if t < 0.5 { seg.a } else { seg.b };
    let node = g.node(node_id)?;
    let cur_dir = g.segment_direction(current)?;
    let to_node = distance(position, node.position);

    let mut best: Option<(SegmentId, f32)> = None;
    for &sid in &node.segments {
        if sid == current {
            continue;
        }
        let Some(cand) = g.segment(sid) else { continue };
        if !cand.active || !segment_in_group(g, reg, cand, group) {
            continue;
        }
        let Some(far) = g.node_position(cand.other(node_id)) else { continue };
        let dir = direction(node.position, far);
        let alignment = dir.dot(input);
        if alignment <= tol.align_threshold {
            continue;
        }
        let turns = cur_dir.dot(dir).abs() < tol.turn_dot;
        let gate = if turns { tol.junction_radius } else { tol.switch_radius };
        if to_node > gate {
            continue;
        }
        let better = match best {
            None => true,
            Some((bid, ba)) => alignment > ba || (alignment == ba && sid < bid),
        };
        if better {
            best = Some((sid, alignment));
        }
    }

    let (segment, alignment) = best?;
    let (a, b) = g.endpoints(segment)?;
    let (point, t) = project_on_segment(position, a, b);
    debug!("junction switch {:?} -> {:?} (alignment {:.2}, t {:.2})", current, segment, alignment, t);
    Some(SwitchTarget { segment, t, point, alignment })
}
