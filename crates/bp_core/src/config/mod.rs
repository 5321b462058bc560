//! # Planner Configuration
//!
//! Every tuning constant of the arbiter, detectors and maneuver planner
//! in one serde tree, loadable from YAML or JSON.
//!
//! ```rust
//! use bp_core::config::PlannerConfig;
//! use bp_core::profile::BehaviorKind;
//!
//! let config = PlannerConfig::default();
//! let cautious = PlannerConfig::for_behavior(BehaviorKind::Cautious);
//! assert!(cautious.profile().max_speed < config.profile().max_speed);
//! ```

mod detection_config;
mod motion_config;
mod overtake_config;
mod tailgate_config;

pub use detection_config::DetectionConfig;
pub use motion_config::MotionConfig;
pub use overtake_config::{OvertakeConfig, OvertakeMode};
pub use tailgate_config::{SameDirectionRule, TailgateConfig};

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::profile::{BehaviorKind, BehaviorProfile};

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct PlannerConfig {
    /// Preset used when no explicit profile is given
    #[serde(default)]
    pub behavior: BehaviorKind,
    /// Replaces the preset entirely
    #[serde(default)]
    #[validate]
    pub profile: Option<BehaviorProfile>,
    #[serde(default)]
    #[validate]
    pub motion: MotionConfig,
    #[serde(default)]
    #[validate]
    pub detection: DetectionConfig,
    #[serde(default)]
    #[validate]
    pub overtake: OvertakeConfig,
    #[serde(default)]
    #[validate]
    pub tailgate: TailgateConfig,
}

impl PlannerConfig {
    pub fn for_behavior(behavior: BehaviorKind) -> Self {
        Self { behavior, ..Self::default() }
    }

    /// Resolved profile: the explicit one, or the preset.
    pub fn profile(&self) -> BehaviorProfile {
        self.profile.clone().unwrap_or_else(|| self.behavior.profile())
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// `.json` files parse as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// ========== Tests ==========
