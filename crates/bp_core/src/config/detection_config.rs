//! Hazard query geometry per actor class

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::AngleCone;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DetectionConfig {
    // === Pre-filter radii around the ego waypoint (m) ===
    #[validate(range(min = 0.0))]
    pub vehicle_radius: f64,
    #[validate(range(min = 0.0))]
    pub pedestrian_radius: f64,
    #[validate(range(min = 0.0))]
    pub obstacle_radius: f64,
    /// Max front-to-rear distance for obstacles in the ego lane (m, default: 50.0)
    #[validate(range(min = 0.0))]
    pub obstacle_max_distance: f64,

    // === Proximity = max(min_proximity_threshold, speed_limit / divisor) ===
    #[validate(range(min = 1.0))]
    pub straight_proximity_divisor: f64,
    #[validate(range(min = 1.0))]
    pub lane_change_proximity_divisor: f64,

    // === Angular cones (deg) ===
    pub vehicle_cone: AngleCone,
    pub pedestrian_cone: AngleCone,
    pub pedestrian_lane_change_cone: AngleCone,
    pub lane_change_cone: AngleCone,
    /// Cone for vehicles closing in from behind
    pub rear_cone: AngleCone,
    pub obstacle_cone: AngleCone,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            vehicle_radius: 45.0,
            pedestrian_radius: 10.0,
            obstacle_radius: 30.0,
            obstacle_max_distance: 50.0,

            straight_proximity_divisor: 3.0,
            lane_change_proximity_divisor: 2.0,

            vehicle_cone: AngleCone::ahead(30.0),
            pedestrian_cone: AngleCone::ahead(60.0),
            pedestrian_lane_change_cone: AngleCone::ahead(90.0),
            lane_change_cone: AngleCone::ahead(180.0),
            rear_cone: AngleCone::new(160.0, 180.0),
            obstacle_cone: AngleCone::ahead(30.0),
        }
    }
}
