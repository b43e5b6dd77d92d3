use crate::algorithms::groups::GroupManager;
use crate::algorithms::junction::{resolve_switch, SwitchTarget};
use crate::algorithms::picking::{nearest_segment, segment_in_group};
use crate::config::EngineConfig;
use crate::geometry::math::{distance, move_towards, normalize};
use crate::geometry::tolerance::{clamp01, EPS_LEN, EPS_NODE};
use crate::graph::GlobalGraph;
use crate::model::{GroupId, PieceId, SegmentId, Vec2};
use crate::registry::PieceRegistry;
use log::{debug, warn};
use serde::Serialize;

/// Position on a segment of one graph generation. Never dereferenced once
/// the graph has moved on to a newer generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub segment: SegmentId,
    pub t: f32,
    pub generation: u64,
}

/// Everything a mover reads while stepping.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub graph: &'a GlobalGraph,
    pub registry: &'a PieceRegistry,
    pub groups: &'a GroupManager,
    pub config: &'a EngineConfig,
}

/// Snapshot for callers outside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoverState {
    pub position: Vec2,
    pub segment: Option<SegmentId>,
    pub t: Option<f32>,
    pub group_id: Option<GroupId>,
    pub transitioning: bool,
    pub following: Option<PieceId>,
}

#[derive(Clone, Debug)]
pub struct Mover {
    pub anchor: Option<Anchor>,
    pub position: Vec2,
    /// Group of the piece under the mover, cached between ticks.
    pub group_id: Option<GroupId>,
    pub piece: Option<PieceId>,
    pub transition: Option<Vec2>,
    /// Dragged piece carrying the mover, with the mover's offset in that
    /// piece's local space.
    pub follow: Option<(PieceId, Vec2)>,
    pub speed: f32,
}

impl Mover {
    pub fn new(position: Vec2, speed: f32) -> Self {
        Mover { anchor: None, position, group_id: None, piece: None, transition: None, follow: None, speed }
    }

    pub fn state(&self) -> MoverState {
        MoverState {
            position: self.position,
            segment: self.anchor.map(|a| a.segment),
            t: self.anchor.map(|a| a.t),
            group_id: self.group_id,
            transitioning: self.transition.is_some(),
            following: self.follow.map(|(p, _)| p),
        }
    }

    /// Anchor that is still valid for `generation`.
    pub fn live_anchor(&self, generation: u64) -> Option<Anchor> {
        self.anchor.filter(|a| a.generation == generation)
    }

    /// Re-read the group ID when the piece under the mover changed or its
    /// group was re-keyed.
    pub fn refresh_group(&mut self, ctx: &StepContext) {
        if let Some(a) = self.live_anchor(ctx.graph.generation()) {
            let owner = ctx.graph.segment(a.segment).and_then(|s| s.owners.first().copied());
            if owner.is_some() && owner != self.piece {
                self.piece = owner;
            }
        }
        let current = self.piece.and_then(|p| ctx.registry.get(p)).map(|p| p.group_id());
        if current.is_none() && self.group_id.map_or(false, |g| ctx.groups.group(g).is_none()) {
            debug!("mover group {:?} no longer exists", self.group_id);
            self.group_id = None;
        } else if current.is_some() && current != self.group_id {
            debug!("mover group {:?} -> {:?}", self.group_id, current);
            self.group_id = current;
        }
    }

    /// Attach to the nearest usable segment within the capture radius. On
    /// failure the mover stays where it is, unanchored, until the next
    /// structural change.
    pub fn reanchor(&mut self, ctx: &StepContext) -> bool {
        self.transition = None;
        self.refresh_group(ctx);
        let radius = ctx.config.tolerances.capture_radius;
        let hit = match self.group_id {
            Some(g) => nearest_segment(ctx.graph, self.position, radius, |_, s| {
                segment_in_group(ctx.graph, ctx.registry, s, g)
            }),
            None => nearest_segment(ctx.graph, self.position, radius, |_, _| true),
        };
        let Some(hit) = hit else {
            if self.anchor.is_some() {
                warn!("mover at ({:.2}, {:.2}) lost its path; no segment within {}", self.position.x, self.position.y, radius);
            }
            self.anchor = None;
            return false;
        };
        self.anchor = Some(Anchor { segment: hit.segment, t: hit.t, generation: ctx.graph.generation() });
        self.position = hit.point;
        self.piece = None;
        self.refresh_group(ctx);
        true
    }

    pub fn begin_follow(&mut self, piece: PieceId, local: Vec2) {
        self.follow = Some((piece, local));
        self.transition = None;
    }

    pub fn end_follow(&mut self) -> Option<PieceId> {
        self.follow.take().map(|(p, _)| p)
    }

    fn apply_switch(&mut self, target: SwitchTarget, generation: u64) {
        self.anchor = Some(Anchor { segment: target.segment, t: target.t, generation });
        if distance(self.position, target.point) > EPS_NODE {
            self.transition = Some(target.point);
        } else {
            self.position = target.point;
            self.transition = None;
        }
    }

    fn try_switch(&mut self, ctx: &StepContext, anchor: Anchor, dir: Vec2) -> bool {
        let Some(group) = self.group_id else { return false };
        match resolve_switch(ctx.graph, ctx.registry, anchor.segment, anchor.t, self.position, dir, group, &ctx.config.tolerances) {
            Some(target) => {
                self.apply_switch(target, anchor.generation);
                self.refresh_group(ctx);
                true
            }
            None => false,
        }
    }

    /// One tick of movement. Returns the resulting world position.
    pub fn advance(&mut self, ctx: &StepContext, input: Vec2, dt: f32) -> Vec2 {
        self.refresh_group(ctx);
        if self.group_id.map_or(false, |g| ctx.groups.is_locked(g)) {
            return self.position;
        }
        if let Some((piece, local)) = self.follow {
            if let Some(p) = ctx.registry.get(piece) {
                self.position = p.transform.apply(local);
            }
            return self.position;
        }
        let generation = ctx.graph.generation();
        if self.live_anchor(generation).is_none() && !self.reanchor(ctx) {
            return self.position;
        }
        let Some(mut anchor) = self.live_anchor(generation) else { return self.position };

        if let Some(target) = self.transition {
            self.position = move_towards(self.position, target, ctx.config.transition_speed * dt);
            if distance(self.position, target) <= EPS_LEN {
                self.position = target;
                self.transition = None;
            }
            return self.position;
        }

        if !input.is_finite() || input.length() < ctx.config.tolerances.input_deadzone {
            return self.position;
        }
        let dir = normalize(input);
        let (Some(seg_dir), Some(len)) = (ctx.graph.segment_direction(anchor.segment), ctx.graph.segment_length(anchor.segment)) else {
            return self.position;
        };
        if len <= EPS_LEN {
            self.try_switch(ctx, anchor, dir);
            return self.position;
        }
        let threshold = ctx.config.tolerances.align_threshold;
        let alignment = seg_dir.dot(dir);
        let step = self.speed * dt / len;
        if alignment > threshold {
            anchor.t += step;
        } else if alignment < -threshold {
            anchor.t -= step;
        } else {
            self.try_switch(ctx, anchor, dir);
            return self.position;
        }

        if !(0.0..=1.0).contains(&anchor.t) {
            anchor.t = clamp01(anchor.t);
            if let Some(p) = ctx.graph.point_at(anchor.segment, anchor.t) {
                self.position = p;
            }
            self.anchor = Some(anchor);
            self.try_switch(ctx, anchor, dir);
            return self.position;
        }
        if let Some(p) = ctx.graph.point_at(anchor.segment, anchor.t) {
            self.position = p;
        }
        self.anchor = Some(anchor);
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::EdgeActivation;
    use crate::algorithms::merge::merge_pieces;
    use crate::model::PieceDef;

    struct Fixture {
        reg: PieceRegistry,
        groups: GroupManager,
        graph: GlobalGraph,
        config: EngineConfig,
    }

    impl Fixture {
        fn new(def: PieceDef) -> Self {
            let mut reg = PieceRegistry::new();
            let mut groups = GroupManager::new();
            let id = reg.insert(def, 1).unwrap();
            groups.add_piece(&mut reg, 1, id);
            let graph = merge_pieces(&reg, &EdgeActivation::new(), 0.01, 0);
            Fixture { reg, groups, graph, config: EngineConfig::default() }
        }

        fn ctx(&self) -> StepContext<'_> {
            StepContext { graph: &self.graph, registry: &self.reg, groups: &self.groups, config: &self.config }
        }
    }

    fn line() -> PieceDef {
        PieceDef::new(Vec2::new(4.0, 4.0), &[(0.0, 0.0), (2.0, 0.0)], &[(0, 1)], 0.0, 0.0)
    }

    #[test]
    fn anchors_and_walks_along_the_segment() {
        let f = Fixture::new(line());
        let mut m = Mover::new(Vec2::new(0.5, 0.1), 2.0);
        assert!(m.reanchor(&f.ctx()));
        assert_eq!(m.group_id, Some(1));
        let p = m.advance(&f.ctx(), Vec2::new(1.0, 0.0), 0.25);
        assert!((p.x - 1.0).abs() < 1e-5 && p.y.abs() < 1e-6);
        let p = m.advance(&f.ctx(), Vec2::new(-1.0, 0.0), 0.25);
        assert!((p.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn dead_end_clamps_instead_of_overshooting() {
        let f = Fixture::new(line());
        let mut m = Mover::new(Vec2::new(1.9, 0.0), 2.0);
        m.reanchor(&f.ctx());
        for _ in 0..10 {
            m.advance(&f.ctx(), Vec2::new(1.0, 0.0), 0.1);
        }
        assert_eq!(m.position, Vec2::new(2.0, 0.0));
        assert_eq!(m.anchor.unwrap().t, 1.0);
    }

    #[test]
    fn small_input_is_ignored() {
        let f = Fixture::new(line());
        let mut m = Mover::new(Vec2::new(1.0, 0.0), 2.0);
        m.reanchor(&f.ctx());
        assert_eq!(m.advance(&f.ctx(), Vec2::new(0.05, 0.0), 1.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn far_mover_stays_unanchored() {
        let f = Fixture::new(line());
        let mut m = Mover::new(Vec2::new(1.0, 2.0), 2.0);
        assert!(!m.reanchor(&f.ctx()));
        assert_eq!(m.advance(&f.ctx(), Vec2::new(1.0, 0.0), 1.0), Vec2::new(1.0, 2.0));
        assert!(m.anchor.is_none());
    }

    #[test]
    fn locked_group_does_not_move() {
        let mut f = Fixture::new(line());
        let mut m = Mover::new(Vec2::new(1.0, 0.0), 2.0);
        m.reanchor(&f.ctx());
        f.groups.set_locked(1, true);
        assert_eq!(m.advance(&f.ctx(), Vec2::new(1.0, 0.0), 0.25), Vec2::new(1.0, 0.0));
        f.groups.set_locked(1, false);
        assert!(m.advance(&f.ctx(), Vec2::new(1.0, 0.0), 0.25).x > 1.0);
    }

    #[test]
    fn stale_anchor_is_replaced_not_read() {
        let mut f = Fixture::new(line());
        let mut m = Mover::new(Vec2::new(1.0, 0.0), 2.0);
        m.reanchor(&f.ctx());
        m.anchor = Some(Anchor { segment: SegmentId(42), t: 0.3, generation: 0 });
        f.graph = merge_pieces(&f.reg, &EdgeActivation::new(), 0.01, f.graph.generation());
        m.advance(&f.ctx(), Vec2::new(1.0, 0.0), 0.0);
        let a = m.anchor.unwrap();
        assert_eq!(a.segment, SegmentId(0));
        assert_eq!(a.generation, f.graph.generation());
    }
}
