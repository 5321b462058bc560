//! Overtake decision margins and path synthesis geometry

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{AngleCone, LateralSide, RoadOption};

/// Which lane the overtake runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OvertakeMode {
    /// Borrow the opposing lane; its waypoints are walked with `previous()`
    #[default]
    TwoWay,
    /// Use a parallel lane travelling the same way
    SameDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OvertakeConfig {
    /// Step between synthesized waypoints (m, default: 4.5)
    #[validate(range(min = 0.1))]
    pub sampling_distance: f64,
    /// Distance walked before cutting back in (m, default: 10.0)
    #[validate(range(min = 0.0))]
    pub return_offset: f64,
    /// Oncoming traffic search range (m, default: 100.0)
    #[validate(range(min = 0.0))]
    pub oncoming_lookahead: f64,
    /// Cone searched for oncoming traffic in the borrowed lane
    pub oncoming_cone: AngleCone,
    /// Extra seconds an oncoming car is projected beyond the maneuver time (default: 3.0)
    #[validate(range(min = 0.0))]
    pub time_margin: f64,
    /// Required slack over the needed clearance (m, default: 5.0)
    #[validate(range(min = 0.0))]
    pub clearance_margin: f64,
    /// Added to the braking distance to get the stop distance for a busy lane (m, default: 3.0)
    #[validate(range(min = 0.0))]
    pub security_distance: f64,
    /// Trimmed off the clearance when sizing the path (m, default: 1.5)
    #[validate(range(min = 0.0))]
    pub path_shortening: f64,
    /// Upper bound of straight steps in one synthesized path (default: 256)
    pub max_steps: usize,
    pub mode: OvertakeMode,
    pub departure_side: LateralSide,
    /// Side of the borrowed lane to return to; derived from the mode when unset
    #[serde(default)]
    pub return_side: Option<LateralSide>,
}

impl Default for OvertakeConfig {
    fn default() -> Self {
        Self {
            sampling_distance: 4.5,
            return_offset: 10.0,
            oncoming_lookahead: 100.0,
            oncoming_cone: AngleCone::ahead(90.0),
            time_margin: 3.0,
            clearance_margin: 5.0,
            security_distance: 3.0,
            path_shortening: 1.5,
            max_steps: 256,
            mode: OvertakeMode::TwoWay,
            departure_side: LateralSide::Left,
            return_side: None,
        }
    }
}

impl OvertakeConfig {
    /// Opposing lanes face the other way, so returning means crossing
    /// the borrowed lane's own `departure_side` marking.
    pub fn return_side(&self) -> LateralSide {
        self.return_side.unwrap_or(match self.mode {
            OvertakeMode::TwoWay => self.departure_side,
            OvertakeMode::SameDirection => self.departure_side.opposite(),
        })
    }

    /// Road option of the cut-back entry, always seen from the ego's heading.
    pub fn return_option(&self) -> RoadOption {
        self.departure_side.opposite().lane_change_option()
    }
}
