//! Behavior Profiles
//!
//! Named parameter sets consumed by every detector and controller.
//! One instance per agent; the arbiter is the only writer of
//! `tailgate_counter`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::PlannerError;

fn default_true() -> bool {
    true
}

/// Thresholds and the tailgating cooldown of one agent.
///
/// Speeds are km/h, distances meters, times seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BehaviorProfile {
    /// Hard cap on any commanded speed
    #[validate(range(min = 0.0))]
    pub max_speed: f64,
    /// Subtracted from the lead speed when under the safety time
    #[validate(range(min = 0.0))]
    pub speed_decrease: f64,
    /// Margin kept below the posted speed limit
    pub speed_lim_dist: f64,
    /// Time-to-collision threshold of the following law
    #[validate(range(min = 0.1))]
    pub safety_time: f64,
    /// Lower bound of the hazard lookahead distance
    #[validate(range(min = 0.0))]
    pub min_proximity_threshold: f64,
    /// Bumper-to-bumper gap that triggers an emergency stop
    #[validate(range(min = 0.0))]
    pub braking_distance: f64,
    /// Ticks left before tailgating avoidance may fire again
    #[serde(default)]
    pub tailgate_counter: u32,
    #[serde(default = "default_true")]
    pub tailgating_enabled: bool,
}

impl BehaviorProfile {
    pub fn cautious() -> Self {
        Self {
            max_speed: 40.0,
            speed_decrease: 12.0,
            speed_lim_dist: 6.0,
            safety_time: 3.0,
            min_proximity_threshold: 12.0,
            braking_distance: 6.0,
            tailgate_counter: 0,
            tailgating_enabled: true,
        }
    }

    pub fn normal() -> Self {
        Self {
            max_speed: 50.0,
            speed_decrease: 10.0,
            speed_lim_dist: 3.0,
            safety_time: 3.0,
            min_proximity_threshold: 10.0,
            braking_distance: 5.0,
            tailgate_counter: 0,
            tailgating_enabled: true,
        }
    }

    /// Never yields the lane to a tailgater.
    pub fn aggressive() -> Self {
        Self {
            max_speed: 70.0,
            speed_decrease: 8.0,
            speed_lim_dist: 1.0,
            safety_time: 3.0,
            min_proximity_threshold: 8.0,
            braking_distance: 4.0,
            tailgate_counter: 0,
            tailgating_enabled: false,
        }
    }

    /// Free-road target: `min(max_speed, speed_limit - speed_lim_dist)`.
    pub fn cruise_speed(&self, speed_limit: f64) -> f64 {
        self.max_speed.min(speed_limit - self.speed_lim_dist)
    }

    /// Decays the cooldown by one tick, saturating at zero.
    pub fn tick_cooldown(&mut self) {
        self.tailgate_counter = self.tailgate_counter.saturating_sub(1);
    }

    pub fn arm_tailgate(&mut self, ticks: u32) {
        self.tailgate_counter = ticks;
    }

    pub fn can_tailgate(&self) -> bool {
        self.tailgating_enabled && self.tailgate_counter == 0
    }
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self::normal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorKind {
    Cautious,
    #[default]
    Normal,
    Aggressive,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 3] =
        [BehaviorKind::Cautious, BehaviorKind::Normal, BehaviorKind::Aggressive];

    pub fn profile(self) -> BehaviorProfile {
        match self {
            BehaviorKind::Cautious => BehaviorProfile::cautious(),
            BehaviorKind::Normal => BehaviorProfile::normal(),
            BehaviorKind::Aggressive => BehaviorProfile::aggressive(),
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BehaviorKind::Cautious => write!(f, "cautious"),
            BehaviorKind::Normal => write!(f, "normal"),
            BehaviorKind::Aggressive => write!(f, "aggressive"),
        }
    }
}

impl FromStr for BehaviorKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cautious" => Ok(BehaviorKind::Cautious),
            "normal" => Ok(BehaviorKind::Normal),
            "aggressive" => Ok(BehaviorKind::Aggressive),
            other => Err(PlannerError::UnknownBehavior(other.to_string())),
        }
    }
}

// ========== Tests ==========
