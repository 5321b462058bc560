//! Speed shaping and actuation limits shared by all behaviors

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MotionConfig {
    /// Floor of the speed-matching band of the following law (km/h, default: 5.0)
    #[validate(range(min = 0.0))]
    pub min_speed: f64,
    /// Brake value of the emergency stop command (default: 0.5)
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_brake: f64,
    /// Speed margin below the limit while turning at a junction (km/h, default: 5.0)
    #[validate(range(min = 0.0))]
    pub intersection_speed_margin: f64,
    /// Speed cap when rolling over debris (km/h, default: 30.0)
    #[validate(range(min = 0.0))]
    pub debris_speed_cap: f64,
    /// Lookahead steps = speed_limit / divisor (default: 10.0)
    #[validate(range(min = 1.0))]
    pub lookahead_speed_divisor: f64,
    /// Route steps ahead used to match hazards past a lane boundary (default: 3)
    pub hazard_lookahead_steps: usize,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            min_speed: 5.0,
            max_brake: 0.5,
            intersection_speed_margin: 5.0,
            debris_speed_cap: 30.0,
            lookahead_speed_divisor: 10.0,
            hazard_lookahead_steps: 3,
        }
    }
}

impl MotionConfig {
    pub fn look_ahead_steps(&self, speed_limit: f64) -> usize {
        (speed_limit / self.lookahead_speed_divisor).max(0.0) as usize
    }
}
