//! Capability traits for everything outside the decision core
//!
//! The arbiter never reaches into globals: perception, the lane graph and
//! the path follower are handed to it, so tests can swap in synthetic worlds.

use serde::{Deserialize, Serialize};

use crate::types::{
    Actor, ActorId, Extent, LateralSide, Location, ManeuverPlan, PlanEntry, RoadOption,
    Transform, VehicleControl, Waypoint,
};

/// Lane-graph queries.
pub trait LaneGraph {
    /// Nearest driving-lane waypoint, `None` when off the road.
    fn waypoint_at(&self, location: &Location) -> Option<Waypoint>;

    /// Nearest waypoint on any lane type (sidewalks, shoulders included).
    fn waypoint_at_any(&self, location: &Location) -> Option<Waypoint>;

    /// Waypoints `distance` ahead along the lane's travel direction.
    fn next(&self, waypoint: &Waypoint, distance: f64) -> Vec<Waypoint>;

    /// Waypoints `distance` behind, against the travel direction.
    fn previous(&self, waypoint: &Waypoint, distance: f64) -> Vec<Waypoint>;

    /// Neighbour on the left, relative to the lane's own travel direction.
    fn left_lane(&self, waypoint: &Waypoint) -> Option<Waypoint>;

    /// Neighbour on the right, relative to the lane's own travel direction.
    fn right_lane(&self, waypoint: &Waypoint) -> Option<Waypoint>;

    fn adjacent_lane(&self, waypoint: &Waypoint, side: LateralSide) -> Option<Waypoint> {
        match side {
            LateralSide::Left => self.left_lane(waypoint),
            LateralSide::Right => self.right_lane(waypoint),
        }
    }
}

/// Ego vehicle as observed this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgoObservation {
    pub id: ActorId,
    pub transform: Transform,
    #[serde(default)]
    pub extent: Extent,
    /// km/h
    pub speed: f64,
    /// km/h at the ego position
    pub speed_limit: f64,
}

/// Per-tick perception snapshot.
pub trait Perception {
    fn ego(&self) -> &EgoObservation;

    /// Nearby actors; may include the ego itself.
    fn actors(&self) -> &[Actor];

    /// Whether a traffic control (red light, stop) currently binds the ego.
    fn traffic_control_affects_ego(&self) -> bool;
}

/// Plain-data perception frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub ego: EgoObservation,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub traffic_control_hazard: bool,
}

impl Perception for WorldSnapshot {
    fn ego(&self) -> &EgoObservation {
        &self.ego
    }

    fn actors(&self) -> &[Actor] {
        &self.actors
    }

    fn traffic_control_affects_ego(&self) -> bool {
        self.traffic_control_hazard
    }
}

/// Downstream route follower that turns a speed and a route into actuation.
pub trait PathFollower {
    /// km/h
    fn set_speed(&mut self, speed: f64);

    fn target_speed(&self) -> f64;

    /// Replaces the active route atomically.
    fn set_plan(&mut self, plan: ManeuverPlan);

    /// Remaining entries of the active route.
    fn plan(&self) -> &[PlanEntry];

    /// Waypoint currently being tracked.
    fn target_waypoint(&self) -> Option<&Waypoint>;

    /// Road option of the entry currently being tracked.
    fn target_road_option(&self) -> Option<RoadOption>;

    /// Route entry `steps` ahead of the tracked one, or the last entry when shorter.
    fn incoming_waypoint_and_direction(&self, steps: usize) -> Option<(Waypoint, RoadOption)> {
        let plan = self.plan();
        let entry = plan.get(steps).or_else(|| plan.last())?;
        Some((entry.waypoint.clone(), entry.option))
    }

    /// One actuator command for the configured speed and route.
    fn run_step(&mut self, ego: &EgoObservation) -> VehicleControl;
}
