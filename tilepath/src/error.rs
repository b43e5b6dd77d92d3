use crate::model::GroupId;
use thiserror::Error;

/// Rejections raised while validating authored input.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("parameter '{param}' must be finite and within coordinate bounds")]
    NonFinite { param: &'static str },
    #[error("{what} exceeds the limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },
    #[error("piece size must be positive, got {x} x {y}")]
    InvalidSize { x: f32, y: f32 },
    #[error("group id {0} is already in use")]
    DuplicateGroupId(GroupId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config value '{param}' out of range: {got}")]
    OutOfRange { param: &'static str, got: f32 },
}
