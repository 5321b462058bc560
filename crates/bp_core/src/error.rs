use thiserror::Error;

use crate::types::LateralSide;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Lane change to the {side} is not available")]
    UnreachableLane { side: LateralSide },

    #[error("Routing desync: {reason}")]
    RoutingDesync { reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown behavior: {0}")]
    UnknownBehavior(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    pub fn desync(reason: impl Into<String>) -> Self {
        PlannerError::RoutingDesync { reason: reason.into() }
    }

    /// Whether the arbiter can drop the failed maneuver and keep the current plan.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlannerError::UnreachableLane { .. } | PlannerError::RoutingDesync { .. } => true,
            PlannerError::InvalidConfig(_)
            | PlannerError::UnknownBehavior(_)
            | PlannerError::Io(_)
            | PlannerError::Yaml(_)
            | PlannerError::Json(_) => false,
        }
    }
}

impl From<validator::ValidationErrors> for PlannerError {
    fn from(err: validator::ValidationErrors) -> Self {
        PlannerError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
