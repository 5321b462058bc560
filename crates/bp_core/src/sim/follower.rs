//! Reference path follower
//!
//! Pure-pursuit steering toward the first route entry beyond a
//! speed-dependent lookahead, plus a proportional speed loop. Reached
//! entries are dropped from the front of the route.

use serde::{Deserialize, Serialize};

use crate::types::{ManeuverPlan, PlanEntry, RoadOption, VehicleControl, Waypoint};
use crate::world::{EgoObservation, PathFollower};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerGains {
    /// Entries closer than this are considered reached (m, default: 2.0)
    pub reach_radius: f64,
    /// Minimum pursuit distance (m, default: 5.0)
    pub min_lookahead: f64,
    /// Pursuit distance per m/s of speed (s, default: 0.4)
    pub lookahead_time: f64,
    /// m (default: 2.9)
    pub wheelbase: f64,
    /// Wheel angle at steer 1.0 (deg, default: 35.0)
    pub max_steer_angle: f64,
    /// Throttle per km/h of speed error (default: 0.08)
    pub throttle_gain: f64,
    /// Brake per km/h of overspeed (default: 0.05)
    pub brake_gain: f64,
    pub max_throttle: f64,
    pub max_brake: f64,
}

impl Default for FollowerGains {
    fn default() -> Self {
        Self {
            reach_radius: 2.0,
            min_lookahead: 5.0,
            lookahead_time: 0.4,
            wheelbase: 2.9,
            max_steer_angle: 35.0,
            throttle_gain: 0.08,
            brake_gain: 0.05,
            max_throttle: 0.75,
            max_brake: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteFollower {
    route: Vec<PlanEntry>,
    cursor: usize,
    target_speed: f64,
    gains: FollowerGains,
}

impl RouteFollower {
    pub fn new(route: ManeuverPlan) -> Self {
        Self { route: route.into_entries(), ..Self::default() }
    }

    pub fn with_gains(mut self, gains: FollowerGains) -> Self {
        self.gains = gains;
        self
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.route.len()
    }

    /// Drops entries already reached or left behind.
    fn advance(&mut self, ego: &EgoObservation) {
        let forward = ego.transform.forward_vector();
        while let Some(entry) = self.route.get(self.cursor) {
            let to_entry = entry.waypoint.location() - ego.transform.location;
            let reached = to_entry.norm() < self.gains.reach_radius;
            let behind = to_entry.dot(&forward) < 0.0;
            if reached || behind {
                self.cursor += 1;
            } else {
                break;
            }
        }
    }

    /// First remaining entry at least the lookahead distance away, else the last one.
    fn pursuit_target(&self, ego: &EgoObservation) -> Option<&Waypoint> {
        let lookahead =
            self.gains.min_lookahead.max(ego.speed / 3.6 * self.gains.lookahead_time);
        let remaining = self.plan();
        remaining
            .iter()
            .find(|entry| {
                (entry.waypoint.location() - ego.transform.location).norm() >= lookahead
            })
            .or_else(|| remaining.last())
            .map(|entry| &entry.waypoint)
    }

    fn steer_towards(&self, ego: &EgoObservation, target: &Waypoint) -> f64 {
        let to_target = target.location() - ego.transform.location;
        let distance = to_target.norm();
        if distance < 1e-3 {
            return 0.0;
        }
        let forward = ego.transform.forward_vector();
        let cross = forward.x * to_target.y - forward.y * to_target.x;
        let alpha = cross.atan2(forward.dot(&to_target));
        let curvature = 2.0 * alpha.sin() / distance;
        let wheel_angle = (self.gains.wheelbase * curvature).atan();
        (wheel_angle / self.gains.max_steer_angle.to_radians()).clamp(-1.0, 1.0)
    }
}

impl PathFollower for RouteFollower {
    fn set_speed(&mut self, speed: f64) {
        self.target_speed = speed.max(0.0);
    }

    fn target_speed(&self) -> f64 {
        self.target_speed
    }

    fn set_plan(&mut self, plan: ManeuverPlan) {
        self.route = plan.into_entries();
        self.cursor = 0;
    }

    fn plan(&self) -> &[PlanEntry] {
        self.route.get(self.cursor..).unwrap_or(&[])
    }

    fn target_waypoint(&self) -> Option<&Waypoint> {
        self.route.get(self.cursor).map(|entry| &entry.waypoint)
    }

    fn target_road_option(&self) -> Option<RoadOption> {
        self.route.get(self.cursor).map(|entry| entry.option)
    }

    fn run_step(&mut self, ego: &EgoObservation) -> VehicleControl {
        self.advance(ego);
        let Some(target) = self.pursuit_target(ego).cloned() else {
            // End of route: hold the car
            return VehicleControl { brake: self.gains.max_brake, ..VehicleControl::default() };
        };

        let error = self.target_speed - ego.speed;
        let (throttle, brake) = if error >= 0.0 {
            ((error * self.gains.throttle_gain).min(self.gains.max_throttle), 0.0)
        } else {
            (0.0, (-error * self.gains.brake_gain).min(self.gains.max_brake))
        };

        VehicleControl { throttle, steer: self.steer_towards(ego, &target), brake, hand_brake: false }
    }
}
