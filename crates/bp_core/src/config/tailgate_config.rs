//! Tailgating avoidance (yielding the lane to a faster car behind)

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Waypoint;

/// How two lanes are judged to carry traffic the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SameDirectionRule {
    /// Lane ids share a sign (road networks with signed lane ids)
    #[default]
    LaneIdSign,
    /// Lane headings differ by at most `max_angle_deg`
    Heading { max_angle_deg: f64 },
}

impl SameDirectionRule {
    pub fn same_direction(&self, a: &Waypoint, b: &Waypoint) -> bool {
        match *self {
            SameDirectionRule::LaneIdSign => a.lane_id * b.lane_id > 0,
            SameDirectionRule::Heading { max_angle_deg } => {
                let diff = (a.transform.yaw - b.transform.yaw).rem_euclid(360.0);
                diff.min(360.0 - diff) <= max_angle_deg
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TailgateConfig {
    /// Ticks before tailgating avoidance may fire again (default: 200)
    pub cooldown_ticks: u32,
    /// Only yield when the ego is faster than this (km/h, default: 10.0)
    #[validate(range(min = 0.0))]
    pub min_ego_speed: f64,
    /// How far to stay in the yielded lane before cutting back (m, default: 30.0)
    #[validate(range(min = 0.0))]
    pub yield_distance: f64,
    pub same_direction: SameDirectionRule,
}

impl Default for TailgateConfig {
    fn default() -> Self {
        Self {
            cooldown_ticks: 200,
            min_ego_speed: 10.0,
            yield_distance: 30.0,
            same_direction: SameDirectionRule::LaneIdSign,
        }
    }
}
