use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::types::{RoadOption, Waypoint};
use crate::world::{EgoObservation, PathFollower};

/// Ego information refreshed at the start of every tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EgoState {
    /// km/h
    pub speed: f64,
    /// km/h
    pub speed_limit: f64,
    pub road_id: Option<u32>,
    pub lane_id: Option<i32>,
    /// Road option of the route entry being tracked
    pub direction: RoadOption,
    /// Road option `look_ahead_steps` entries ahead
    pub incoming_direction: RoadOption,
    pub incoming_waypoint: Option<Waypoint>,
    pub look_ahead_steps: usize,
}

impl EgoState {
    pub fn refresh<F: PathFollower + ?Sized>(
        &mut self,
        observation: &EgoObservation,
        waypoint: Option<&Waypoint>,
        follower: &F,
        motion: &MotionConfig,
    ) {
        self.speed = observation.speed;
        self.speed_limit = observation.speed_limit;
        self.road_id = waypoint.map(|wp| wp.road_id);
        self.lane_id = waypoint.map(|wp| wp.lane_id);
        self.direction = follower.target_road_option().unwrap_or(RoadOption::LaneFollow);
        self.look_ahead_steps = motion.look_ahead_steps(self.speed_limit);

        match follower.incoming_waypoint_and_direction(self.look_ahead_steps) {
            Some((wp, option)) => {
                self.incoming_waypoint = Some(wp);
                self.incoming_direction = option;
            }
            None => {
                self.incoming_waypoint = None;
                self.incoming_direction = RoadOption::LaneFollow;
            }
        }
    }

    pub fn is_changing_lane(&self) -> bool {
        self.direction.lane_change_side().is_some()
    }

    /// Next junction on the route is entered with a turn.
    pub fn turning_at_junction(&self) -> bool {
        self.incoming_waypoint.as_ref().is_some_and(|wp| wp.is_junction)
            && self.incoming_direction.is_turn()
    }
}
