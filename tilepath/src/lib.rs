pub mod activation;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod mover;
pub mod registry;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod adjacency;
    pub mod groups;
    pub mod junction;
    pub mod merge;
    pub mod picking;
    pub mod snap;
}

pub use activation::{EdgeActivation, EdgeRef, ToggleSwitch};
pub use algorithms::groups::{Group, GroupManager};
pub use algorithms::picking::SegmentHit;
pub use config::{EngineConfig, Tolerances};
pub use error::{ConfigError, EngineError};
pub use graph::{GlobalGraph, GlobalNode, Segment};
pub use model::{GroupId, LocalEdge, LocalNode, MoverId, NodeId, PieceDef, PieceId, SegmentId, Transform, Vec2};
pub use mover::{Mover, MoverState};
pub use registry::{Piece, PieceRegistry, PieceState};

use algorithms::merge::merge_pieces;
use algorithms::picking::{nearest_segment, segment_in_group};
use algorithms::snap::find_snap;
use geometry::math::rotate;
use log::{debug, info};
use mover::StepContext;
use serde::Serialize;

/// Result of dropping a dragged piece.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReleaseOutcome {
    /// Neighbor the piece was aligned against, if any.
    pub snapped_to: Option<PieceId>,
    pub group_id: GroupId,
}

/// The engine: pieces, their groups, the merged graph and the movers on it.
///
/// Every structural change (registration, drag release, rotation, edge
/// activation) reorganizes groups, rebuilds the graph from scratch and
/// re-anchors movers before returning, so reads never observe a half-built
/// generation.
pub struct World {
    pub(crate) registry: PieceRegistry,
    pub(crate) groups: GroupManager,
    pub(crate) graph: GlobalGraph,
    pub(crate) activation: EdgeActivation,
    pub(crate) switches: Vec<ToggleSwitch>,
    pub(crate) movers: Vec<Option<Mover>>, // id is index
    pub(crate) config: EngineConfig,
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}

impl World {
    pub fn new() -> Self {
        World {
            registry: PieceRegistry::new(),
            groups: GroupManager::new(),
            graph: GlobalGraph::new(),
            activation: EdgeActivation::new(),
            switches: Vec::new(),
            movers: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut w = World::new();
        w.config = config;
        Ok(w)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        for m in self.movers.iter_mut().flatten() {
            m.speed = config.move_speed;
        }
        self.rebuild_global_graph();
        Ok(())
    }

    pub fn graph(&self) -> &GlobalGraph {
        &self.graph
    }

    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    pub fn groups(&self) -> &GroupManager {
        &self.groups
    }

    pub fn activation(&self) -> &EdgeActivation {
        &self.activation
    }

    // Pieces

    pub fn register_piece(&mut self, def: PieceDef) -> Result<PieceId, EngineError> {
        PieceRegistry::validate(&def)?;
        let original = self.groups.claim_original(&self.registry, def.group_id)?;
        let id = self.registry.insert(def, original)?;
        self.groups.add_piece(&mut self.registry, original, id);
        self.rebuild_global_graph();
        Ok(id)
    }

    pub fn unregister_piece(&mut self, id: PieceId) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        self.groups.remove_piece(&mut self.registry, id);
        self.registry.remove(id);
        self.activation.forget_piece(id);
        for m in self.movers.iter_mut().flatten() {
            if m.follow.map_or(false, |(p, _)| p == id) {
                m.end_follow();
            }
            if m.piece == Some(id) {
                m.piece = None;
                m.group_id = None;
            }
        }
        self.rebuild_global_graph();
        true
    }

    pub fn set_piece_transform(&mut self, id: PieceId, transform: Transform) -> bool {
        if !transform.position.is_finite() || !transform.rotation_deg.is_finite() {
            return false;
        }
        let Some(p) = self.registry.get_mut(id) else { return false };
        p.transform = transform;
        self.rebuild_global_graph();
        true
    }

    pub fn group_id(&self, piece: PieceId) -> Option<GroupId> {
        self.groups.group_id(&self.registry, piece)
    }

    pub fn pieces_in_group(&self, group: GroupId) -> Vec<PieceId> {
        self.groups.group(group).map(|g| g.pieces.clone()).unwrap_or_default()
    }

    pub fn set_group_movement_locked(&mut self, group: GroupId, locked: bool) -> bool {
        self.groups.set_locked(group, locked)
    }

    pub fn is_group_movement_locked(&self, group: GroupId) -> bool {
        self.groups.is_locked(group)
    }

    // Structural rebuild

    fn mover_hosts(&self) -> Vec<(PieceId, GroupId)> {
        self.movers
            .iter()
            .flatten()
            .filter_map(|m| {
                let piece = m.piece?;
                Some((piece, self.registry.get(piece)?.group_id()))
            })
            .collect()
    }

    fn reanchor_movers(&mut self) {
        let ctx = StepContext { graph: &self.graph, registry: &self.registry, groups: &self.groups, config: &self.config };
        for m in self.movers.iter_mut().flatten() {
            if m.follow.is_none() {
                m.reanchor(&ctx);
            }
        }
    }

    /// Recompute groups and the merged graph from scratch, then put every
    /// mover back on the new generation.
    pub fn rebuild_global_graph(&mut self) {
        let hosts = self.mover_hosts();
        let summary = self.groups.reorganize_all(&mut self.registry, self.config.tolerances.adjacency, &hosts);
        self.graph = merge_pieces(&self.registry, &self.activation, self.config.tolerances.node_epsilon, self.graph.generation());
        self.reanchor_movers();
        debug!(
            "rebuild: generation {} with {} groups, {} movers",
            self.graph.generation(),
            summary.groups,
            self.movers.iter().flatten().count()
        );
    }

    /// Closest active segment within the capture radius, optionally limited
    /// to segments usable by `group`.
    pub fn query_nearest_segment(&self, point: Vec2, group: Option<GroupId>) -> Option<SegmentHit> {
        if !point.is_finite() {
            return None;
        }
        let radius = self.config.tolerances.capture_radius;
        match group {
            Some(g) => nearest_segment(&self.graph, point, radius, |_, s| segment_in_group(&self.graph, &self.registry, s, g)),
            None => nearest_segment(&self.graph, point, radius, |_, _| true),
        }
    }

    // Movers

    pub fn add_mover(&mut self, position: Vec2) -> MoverId {
        let mut m = Mover::new(position, self.config.move_speed);
        let ctx = StepContext { graph: &self.graph, registry: &self.registry, groups: &self.groups, config: &self.config };
        m.reanchor(&ctx);
        let id = MoverId(self.movers.len() as u32);
        self.movers.push(Some(m));
        id
    }

    pub fn remove_mover(&mut self, id: MoverId) -> bool {
        match self.movers.get_mut(id.0 as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn mover(&self, id: MoverId) -> Option<&Mover> {
        self.movers.get(id.0 as usize).and_then(|m| m.as_ref())
    }

    pub fn mover_state(&self, id: MoverId) -> Option<MoverState> {
        self.mover(id).map(Mover::state)
    }

    pub fn mover_ids(&self) -> Vec<MoverId> {
        self.movers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_some())
            .map(|(i, _)| MoverId(i as u32))
            .collect()
    }

    /// Step one mover. Non-finite or negative `dt` leaves it in place.
    pub fn advance(&mut self, id: MoverId, input: Vec2, dt: f32) -> Option<Vec2> {
        let ctx = StepContext { graph: &self.graph, registry: &self.registry, groups: &self.groups, config: &self.config };
        let m = self.movers.get_mut(id.0 as usize)?.as_mut()?;
        if !dt.is_finite() || dt < 0.0 {
            return Some(m.position);
        }
        Some(m.advance(&ctx, input, dt))
    }

    // Drag and drop

    /// Pick a piece up. It leaves its group and the merged graph; movers
    /// standing on it ride along.
    pub fn begin_drag(&mut self, id: PieceId) -> bool {
        let generation = self.graph.generation();
        let Some(p) = self.registry.get(id) else { return false };
        if p.frozen {
            return false;
        }
        let transform = p.transform;
        for m in self.movers.iter_mut().flatten() {
            let on_piece = m.piece == Some(id)
                || m.live_anchor(generation)
                    .and_then(|a| self.graph.segment(a.segment))
                    .map_or(false, |s| s.owners.contains(&id));
            if on_piece && m.follow.is_none() {
                m.piece = Some(id);
                m.begin_follow(id, transform.inverse_apply(m.position));
            }
        }
        self.groups.remove_piece(&mut self.registry, id);
        if let Some(p) = self.registry.get_mut(id) {
            p.frozen = true;
        }
        self.rebuild_global_graph();
        true
    }

    /// Move a held piece. Nothing is rebuilt until release.
    pub fn drag_to(&mut self, id: PieceId, position: Vec2) -> bool {
        if !position.is_finite() {
            return false;
        }
        match self.registry.get_mut(id) {
            Some(p) if p.frozen => {
                p.transform.position = position;
                true
            }
            _ => false,
        }
    }

    /// Drop a held piece, snapping it against the first neighbor within the
    /// snap tolerance.
    pub fn release(&mut self, id: PieceId) -> Option<ReleaseOutcome> {
        match self.registry.get_mut(id) {
            Some(p) if p.frozen => p.frozen = false,
            _ => return None,
        }
        let snap = find_snap(&self.registry, id, self.config.tolerances.snap);
        if let Some(target) = snap {
            if let Some(p) = self.registry.get_mut(id) {
                p.transform.position = target.position;
            }
            let riders: Vec<PieceId> = self.movers.iter().flatten().filter_map(|m| m.piece).collect();
            let merged = self.groups.attach(&mut self.registry, id, target.other, &riders);
            info!("piece {:?} snapped to {:?}, group {:?}", id, target.other, merged);
        }
        if let Some(p) = self.registry.get(id) {
            let transform = p.transform;
            for m in self.movers.iter_mut().flatten() {
                if let Some((piece, local)) = m.follow {
                    if piece == id {
                        m.position = transform.apply(local);
                        m.end_follow();
                    }
                }
            }
        }
        self.rebuild_global_graph();
        Some(ReleaseOutcome { snapped_to: snap.map(|s| s.other), group_id: self.group_id(id)? })
    }

    // Rotation

    /// Rotate every piece of `group` about the centroid of their positions.
    /// Movers on the group turn with it.
    pub fn rotate_group(&mut self, group: GroupId, degrees: f32) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        let pieces = self.pieces_in_group(group);
        if pieces.is_empty() {
            return false;
        }
        let mut sum = Vec2::ZERO;
        for &id in &pieces {
            if let Some(p) = self.registry.get(id) {
                sum = sum + p.transform.position;
            }
        }
        let center = sum * (1.0 / pieces.len() as f32);
        for &id in &pieces {
            if let Some(p) = self.registry.get_mut(id) {
                p.transform.position = center + rotate(p.transform.position - center, degrees);
                p.transform.rotation_deg = (p.transform.rotation_deg + degrees).rem_euclid(360.0);
            }
        }
        for m in self.movers.iter_mut().flatten() {
            if m.group_id == Some(group) && m.follow.is_none() {
                m.position = center + rotate(m.position - center, degrees);
            }
        }
        info!("rotated group {} by {} degrees", group, degrees);
        self.rebuild_global_graph();
        true
    }

    // Edge activation

    fn edge_exists(&self, edge: EdgeRef) -> bool {
        self.registry.get(edge.piece).map_or(false, |p| (edge.edge as usize) < p.edges.len())
    }

    /// Override an authored edge's active flag. Returns false for an unknown
    /// edge; a real change rebuilds the graph.
    pub fn set_edge_active(&mut self, edge: EdgeRef, active: bool) -> bool {
        if !self.edge_exists(edge) {
            return false;
        }
        if self.activation.set_active(edge, active) {
            self.rebuild_global_graph();
        }
        true
    }

    pub fn add_toggle_switch(&mut self, switch: ToggleSwitch) -> Option<usize> {
        if !switch.primary.iter().chain(switch.alternate.iter()).all(|r| self.edge_exists(*r)) {
            return None;
        }
        switch.apply(&mut self.activation);
        self.switches.push(switch);
        self.rebuild_global_graph();
        Some(self.switches.len() - 1)
    }

    /// Flip a switch; returns its new state.
    pub fn flip_switch(&mut self, index: usize) -> Option<bool> {
        let sw = self.switches.get_mut(index)?;
        let toggled = sw.flip();
        sw.apply(&mut self.activation);
        self.rebuild_global_graph();
        Some(toggled)
    }

    pub fn switch(&self, index: usize) -> Option<&ToggleSwitch> {
        self.switches.get(index)
    }
}
