use crate::error::ConfigError;
use crate::geometry::tolerance::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Distance and alignment thresholds. Every field defaults to the matching
/// constant in `geometry::tolerance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub node_epsilon: f32,
    pub adjacency: f32,
    pub snap: f32,
    pub align_threshold: f32,
    pub switch_radius: f32,
    pub junction_radius: f32,
    pub turn_dot: f32,
    pub capture_radius: f32,
    pub input_deadzone: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            node_epsilon: EPS_NODE,
            adjacency: ADJACENCY_TOLERANCE,
            snap: SNAP_TOLERANCE,
            align_threshold: ALIGN_THRESHOLD,
            switch_radius: SWITCH_RADIUS,
            junction_radius: JUNCTION_RADIUS,
            turn_dot: TURN_DOT,
            capture_radius: CAPTURE_RADIUS,
            input_deadzone: INPUT_DEADZONE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tolerances: Tolerances,
    pub move_speed: f32,
    pub transition_speed: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tolerances: Tolerances::default(),
            move_speed: MOVE_SPEED_DEFAULT,
            transition_speed: TRANSITION_SPEED_DEFAULT,
        }
    }
}

fn positive(param: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 { Ok(()) } else { Err(ConfigError::OutOfRange { param, got: v }) }
}

fn unit(param: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && (0.0..=1.0).contains(&v) { Ok(()) } else { Err(ConfigError::OutOfRange { param, got: v }) }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_value(v: Value) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_value(v)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tolerances;
        positive("node_epsilon", t.node_epsilon)?;
        positive("adjacency", t.adjacency)?;
        positive("snap", t.snap)?;
        unit("align_threshold", t.align_threshold)?;
        positive("switch_radius", t.switch_radius)?;
        positive("junction_radius", t.junction_radius)?;
        unit("turn_dot", t.turn_dot)?;
        positive("capture_radius", t.capture_radius)?;
        unit("input_deadzone", t.input_deadzone)?;
        if t.switch_radius > t.junction_radius {
            return Err(ConfigError::OutOfRange { param: "switch_radius", got: t.switch_radius });
        }
        positive("move_speed", self.move_speed)?;
        positive("transition_speed", self.transition_speed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json_value(json!({ "move_speed": 3.5, "tolerances": { "capture_radius": 0.5 } })).unwrap();
        assert_eq!(cfg.move_speed, 3.5);
        assert_eq!(cfg.tolerances.capture_radius, 0.5);
        assert_eq!(cfg.tolerances.node_epsilon, EPS_NODE);
        assert_eq!(cfg.transition_speed, TRANSITION_SPEED_DEFAULT);
    }

    #[test]
    fn rejects_negative_and_inverted_radii() {
        assert!(EngineConfig::from_json_str(r#"{"move_speed": -1.0}"#).is_err());
        let inverted = json!({ "tolerances": { "switch_radius": 2.0, "junction_radius": 1.0 } });
        match EngineConfig::from_json_value(inverted) {
            Err(ConfigError::OutOfRange { param, .. }) => assert_eq!(param, "switch_radius"),
            other => panic!("expected out of range, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(EngineConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }
}
