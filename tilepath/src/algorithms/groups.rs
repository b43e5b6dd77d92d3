use crate::algorithms::adjacency::{touching, PieceBox};
use crate::error::EngineError;
use crate::model::{GroupId, PieceId};
use crate::registry::{PieceRegistry, PieceState};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// A set of pieces verified to be physically connected.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub pieces: Vec<PieceId>,
    pub locked: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReorgSummary {
    pub groups: usize,
    pub singletons: usize,
    pub repaired: usize,
}

/// Partition of pieces into groups, keyed by group ID.
///
/// Fresh IDs come from a counter kept above every authored original ID, so a
/// generated ID never shadows a piece's original.
#[derive(Clone, Debug)]
pub struct GroupManager {
    pub(crate) groups: BTreeMap<GroupId, Group>,
    next_id: GroupId,
}

impl Default for GroupManager {
    fn default() -> Self {
        GroupManager { groups: BTreeMap::new(), next_id: 1 }
    }
}

impl GroupManager {
    pub fn new() -> Self {
        GroupManager::default()
    }

    fn fresh_id(&mut self) -> GroupId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Pick the original ID for a piece about to be registered.
    pub fn claim_original(&mut self, reg: &PieceRegistry, requested: Option<GroupId>) -> Result<GroupId, EngineError> {
        match requested {
            Some(id) => {
                if reg.is_original_id(id) || self.groups.contains_key(&id) {
                    return Err(EngineError::DuplicateGroupId(id));
                }
                self.next_id = self.next_id.max(id.saturating_add(1));
                Ok(id)
            }
            None => Ok(self.fresh_id()),
        }
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Current group of a grouped piece, the original ID of a detached one.
    pub fn group_id(&self, reg: &PieceRegistry, piece: PieceId) -> Option<GroupId> {
        let p = reg.get(piece)?;
        match p.state {
            PieceState::Grouped(id) if self.groups.contains_key(&id) => Some(id),
            _ => Some(p.original_id),
        }
    }

    pub fn group_of(&self, reg: &PieceRegistry, piece: PieceId) -> Option<&Group> {
        match reg.get(piece)?.state {
            PieceState::Grouped(id) => self.groups.get(&id),
            PieceState::Detached => None,
        }
    }

    pub fn is_locked(&self, id: GroupId) -> bool {
        self.groups.get(&id).map_or(false, |g| g.locked)
    }

    pub fn set_locked(&mut self, id: GroupId, locked: bool) -> bool {
        match self.groups.get_mut(&id) {
            Some(g) => {
                g.locked = locked;
                true
            }
            None => false,
        }
    }

    /// Put `piece` into group `id`, creating the group if needed. A piece
    /// already in another group leaves it first.
    pub fn add_piece(&mut self, reg: &mut PieceRegistry, id: GroupId, piece: PieceId) -> bool {
        match reg.get(piece).map(|p| p.state) {
            None => return false,
            Some(PieceState::Grouped(cur)) if cur == id => return true,
            Some(PieceState::Grouped(_)) => {
                self.remove_piece(reg, piece);
            }
            Some(PieceState::Detached) => {}
        }
        let group = self.groups.entry(id).or_insert_with(|| Group { id, pieces: Vec::new(), locked: false });
        group.pieces.push(piece);
        if let Some(p) = reg.get_mut(piece) {
            p.state = PieceState::Grouped(id);
        }
        true
    }

    /// Detach `piece`. Its group is destroyed when this empties it; a group
    /// left holding the piece's original ID is re-keyed so the detached piece
    /// keeps sole use of it.
    pub fn remove_piece(&mut self, reg: &mut PieceRegistry, piece: PieceId) -> Option<GroupId> {
        let p = reg.get_mut(piece)?;
        let PieceState::Grouped(id) = p.state else { return None };
        p.state = PieceState::Detached;
        let original = p.original_id;
        let group = self.groups.get_mut(&id)?;
        group.pieces.retain(|&x| x != piece);
        if group.pieces.is_empty() {
            self.groups.remove(&id);
            debug!("group {} emptied and destroyed", id);
        } else if id == original {
            let fresh = self.fresh_id();
            self.rekey(reg, id, fresh);
        }
        Some(id)
    }

    fn rekey(&mut self, reg: &mut PieceRegistry, from: GroupId, to: GroupId) {
        let Some(mut g) = self.groups.remove(&from) else { return };
        g.id = to;
        for &pid in &g.pieces {
            if let Some(p) = reg.get_mut(pid) {
                p.state = PieceState::Grouped(to);
            }
        }
        self.groups.insert(to, g);
    }

    /// Move every piece of `other` into `target` and destroy `other`. The
    /// merged group keeps `target`'s ID when that ID was generated, and gets
    /// a fresh one when it is some piece's original ID.
    pub fn absorb_group(&mut self, reg: &mut PieceRegistry, target: GroupId, other: GroupId) -> Option<GroupId> {
        if target == other || !self.groups.contains_key(&target) {
            return None;
        }
        let absorbed = self.groups.remove(&other)?;
        let Some(g) = self.groups.get_mut(&target) else { return None };
        g.pieces.extend(absorbed.pieces.iter().copied());
        g.locked |= absorbed.locked;
        for &pid in &absorbed.pieces {
            if let Some(p) = reg.get_mut(pid) {
                p.state = PieceState::Grouped(target);
            }
        }
        let id = if reg.is_original_id(target) {
            let fresh = self.fresh_id();
            self.rekey(reg, target, fresh);
            fresh
        } else {
            target
        };
        info!("group {} absorbed group {} as {}", target, other, id);
        Some(id)
    }

    /// Give a detached, non-frozen piece its own group under its original ID.
    pub fn ensure_grouped(&mut self, reg: &mut PieceRegistry, piece: PieceId) -> Option<GroupId> {
        let p = reg.get(piece)?;
        match p.state {
            PieceState::Grouped(id) => Some(id),
            PieceState::Detached => {
                let id = p.original_id;
                self.add_piece(reg, id, piece);
                Some(id)
            }
        }
    }

    /// Join the groups of two pieces after a successful snap. A group that
    /// hosts a mover absorbs the other; otherwise a group with a generated ID
    /// does, so established identities survive.
    pub fn attach(&mut self, reg: &mut PieceRegistry, piece: PieceId, other: PieceId, mover_pieces: &[PieceId]) -> Option<GroupId> {
        let ga = self.ensure_grouped(reg, piece)?;
        let gb = self.ensure_grouped(reg, other)?;
        if ga == gb {
            return Some(ga);
        }
        let hosts = |gm: &GroupManager, id: GroupId| {
            gm.groups.get(&id).map_or(false, |g| g.pieces.iter().any(|p| mover_pieces.contains(p)))
        };
        let (target, absorbed) = if hosts(self, ga) {
            (ga, gb)
        } else if hosts(self, gb) || (reg.is_original_id(ga) && !reg.is_original_id(gb)) {
            (gb, ga)
        } else {
            (ga, gb)
        };
        self.absorb_group(reg, target, absorbed)
    }

    /// Put every non-frozen piece that has no group into a singleton under
    /// its original ID. Returns how many pieces needed it.
    pub(crate) fn repair_ungrouped(&mut self, reg: &mut PieceRegistry) -> usize {
        let detached: Vec<PieceId> = reg
            .iter()
            .filter(|(_, p)| !p.frozen && p.state == PieceState::Detached)
            .map(|(id, _)| id)
            .collect();
        let mut repaired = 0;
        for pid in detached {
            warn!("piece {:?} left without a group after reorganize; creating a singleton", pid);
            if self.ensure_grouped(reg, pid).is_some() {
                repaired += 1;
            }
        }
        repaired
    }

    /// Recompute the whole partition from piece positions.
    ///
    /// Singletons take their piece's original ID. Multi-piece components
    /// prefer the group ID of a mover standing on one of their pieces, then
    /// the most common previous generated ID among their members, then a
    /// fresh ID. An ID is never used twice, nor taken from a piece outside the
    /// component. Locks follow the ID.
    pub fn reorganize_all(&mut self, reg: &mut PieceRegistry, tol: f32, movers: &[(PieceId, GroupId)]) -> ReorgSummary {
        let live: Vec<PieceId> = reg.iter().filter(|(_, p)| !p.frozen).map(|(id, _)| id).collect();
        let boxes: Vec<PieceBox> = live.iter().filter_map(|id| reg.get(*id).map(PieceBox::of)).collect();
        let previous: HashMap<PieceId, GroupId> = reg
            .iter()
            .filter_map(|(id, p)| match p.state {
                PieceState::Grouped(g) => Some((id, g)),
                PieceState::Detached => None,
            })
            .collect();
        let locked: HashSet<GroupId> = self.groups.values().filter(|g| g.locked).map(|g| g.id).collect();
        let original_owner: HashMap<GroupId, PieceId> = reg.iter().map(|(id, p)| (p.original_id, id)).collect();

        // Connected components, BFS over the adjacency predicate.
        let mut component_of = vec![usize::MAX; live.len()];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for start in 0..live.len() {
            if component_of[start] != usize::MAX {
                continue;
            }
            let c = components.len();
            let mut members = vec![start];
            component_of[start] = c;
            let mut queue = VecDeque::from([start]);
            while let Some(i) = queue.pop_front() {
                for j in 0..live.len() {
                    if component_of[j] == usize::MAX && touching(&boxes[i], &boxes[j], tol) {
                        component_of[j] = c;
                        members.push(j);
                        queue.push_back(j);
                    }
                }
            }
            members.sort_unstable();
            components.push(members);
        }

        self.groups.clear();
        for p in reg.pieces.iter_mut().flatten() {
            p.state = PieceState::Detached;
        }

        let mut used: HashSet<GroupId> = HashSet::new();
        let mut assigned: Vec<Option<GroupId>> = vec![None; components.len()];
        for (c, members) in components.iter().enumerate() {
            if members.len() == 1 {
                if let Some(p) = reg.get(live[members[0]]) {
                    used.insert(p.original_id);
                    assigned[c] = Some(p.original_id);
                }
            }
        }
        for (c, members) in components.iter().enumerate() {
            if assigned[c].is_some() {
                continue;
            }
            let pieces: HashSet<PieceId> = members.iter().map(|&i| live[i]).collect();
            let allowed = |id: GroupId, used: &HashSet<GroupId>| {
                !used.contains(&id) && original_owner.get(&id).map_or(true, |p| pieces.contains(p))
            };
            let from_mover = movers
                .iter()
                .filter(|(p, _)| pieces.contains(p))
                .map(|&(_, g)| g)
                .find(|&g| allowed(g, &used));
            let from_previous = || {
                let mut counts: BTreeMap<GroupId, usize> = BTreeMap::new();
                for p in &pieces {
                    if let Some(&g) = previous.get(p) {
                        *counts.entry(g).or_insert(0) += 1;
                    }
                }
                let mut best: Option<(GroupId, usize)> = None;
                for (g, n) in counts {
                    let generated = !original_owner.contains_key(&g);
                    if generated && allowed(g, &used) && best.map_or(true, |(_, bn)| n > bn) {
                        best = Some((g, n));
                    }
                }
                best.map(|(g, _)| g)
            };
            let id = match from_mover.or_else(from_previous) {
                Some(id) => id,
                None => self.fresh_id(),
            };
            used.insert(id);
            assigned[c] = Some(id);
        }

        let mut summary = ReorgSummary::default();
        for (c, members) in components.iter().enumerate() {
            let Some(id) = assigned[c] else { continue };
            for &i in members {
                self.add_piece(reg, id, live[i]);
            }
            if let Some(g) = self.groups.get_mut(&id) {
                g.locked = locked.contains(&id);
            }
            summary.groups += 1;
            if members.len() == 1 {
                summary.singletons += 1;
            }
        }

        let repaired = self.repair_ungrouped(reg);
        summary.repaired = repaired;
        summary.groups += repaired;
        summary.singletons += repaired;
        debug!(
            "reorganized {} pieces into {} groups ({} singletons)",
            live.len(),
            summary.groups,
            summary.singletons
        );
        summary
    }
}
