use crate::model::PieceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An authored local edge, addressed by owning piece and local edge index.
/// Unlike global segment ids this survives rebuilds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    pub piece: PieceId,
    pub edge: u32,
}

impl EdgeRef {
    pub fn new(piece: PieceId, edge: u32) -> Self {
        EdgeRef { piece, edge }
    }
}

/// Runtime overrides of the authored `active` flag.
#[derive(Clone, Debug, Default)]
pub struct EdgeActivation {
    overrides: HashMap<EdgeRef, bool>,
}

impl EdgeActivation {
    pub fn new() -> Self {
        EdgeActivation::default()
    }

    pub fn is_active(&self, edge: EdgeRef, authored: bool) -> bool {
        self.overrides.get(&edge).copied().unwrap_or(authored)
    }

    /// Returns true when the stored state changed.
    pub fn set_active(&mut self, edge: EdgeRef, active: bool) -> bool {
        self.overrides.insert(edge, active) != Some(active)
    }

    pub fn clear(&mut self, edge: EdgeRef) -> bool {
        self.overrides.remove(&edge).is_some()
    }

    pub fn forget_piece(&mut self, piece: PieceId) {
        self.overrides.retain(|r, _| r.piece != piece);
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Two mutually exclusive edge sets. The primary set is active until the
/// switch is flipped; flipping again restores it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToggleSwitch {
    pub primary: Vec<EdgeRef>,
    pub alternate: Vec<EdgeRef>,
    #[serde(default)]
    pub toggled: bool,
}

impl ToggleSwitch {
    pub fn new(primary: Vec<EdgeRef>, alternate: Vec<EdgeRef>) -> Self {
        ToggleSwitch { primary, alternate, toggled: false }
    }

    pub fn flip(&mut self) -> bool {
        self.toggled = !self.toggled;
        self.toggled
    }

    pub fn apply(&self, activation: &mut EdgeActivation) {
        for r in &self.primary {
            activation.set_active(*r, !self.toggled);
        }
        for r in &self.alternate {
            activation.set_active(*r, self.toggled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_authored_flag() {
        let mut act = EdgeActivation::new();
        let e = EdgeRef::new(PieceId(0), 2);
        assert!(act.is_active(e, true));
        assert!(act.set_active(e, false));
        assert!(!act.set_active(e, false));
        assert!(!act.is_active(e, true));
        act.clear(e);
        assert!(!act.is_active(e, false));
    }

    #[test]
    fn switch_alternates_edge_sets() {
        let a = EdgeRef::new(PieceId(1), 0);
        let b = EdgeRef::new(PieceId(1), 1);
        let mut sw = ToggleSwitch::new(vec![a], vec![b]);
        let mut act = EdgeActivation::new();
        sw.apply(&mut act);
        assert!(act.is_active(a, false) && !act.is_active(b, true));
        sw.flip();
        sw.apply(&mut act);
        assert!(!act.is_active(a, true) && act.is_active(b, false));
        sw.flip();
        sw.apply(&mut act);
        assert!(act.is_active(a, false));
    }
}
