//! Closed-loop scenario runner
//!
//! Drives one `BehaviorAgent` against a `Scenario`: every tick builds a
//! `WorldSnapshot`, asks the agent for a control, then integrates a
//! kinematic bicycle model for the ego and constant-velocity motion for the
//! other actors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::config::PlannerConfig;
use crate::engine::BehaviorAgent;
use crate::error::{PlannerError, Result};
use crate::types::{Actor, ActorClass, ActorId, BehaviorState, VehicleControl};
use crate::world::{EgoObservation, WorldSnapshot};

use super::follower::RouteFollower;
use super::road::straight_route;
use super::scenario::Scenario;

/// Ego dynamics of the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleDynamics {
    /// m/s² at full throttle
    pub max_acceleration: f64,
    /// m/s² at brake 1.0
    pub max_deceleration: f64,
    /// m
    pub wheelbase: f64,
    /// deg at steer 1.0
    pub max_steer_angle: f64,
    /// Spacing of the initial route (m)
    pub route_step: f64,
}

impl Default for VehicleDynamics {
    fn default() -> Self {
        Self {
            max_acceleration: 3.5,
            max_deceleration: 9.0,
            wheelbase: 2.9,
            max_steer_angle: 35.0,
            route_step: 2.0,
        }
    }
}

/// Ego state and decision of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    /// km/h
    pub speed: f64,
    pub state: BehaviorState,
    pub target_speed: f64,
    pub control: VehicleControl,
    pub new_plan: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: String,
    pub ticks: u64,
    pub distance: f64,
    pub final_x: f64,
    pub final_speed: f64,
    pub max_speed: f64,
    pub plans_issued: u32,
    /// Actors whose box overlapped the ego at some tick
    pub collisions: Vec<ActorId>,
    /// Ticks spent per behavior state
    pub states: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub records: Vec<TickRecord>,
}

pub struct ScenarioRunner {
    scenario: Scenario,
    agent: BehaviorAgent<RouteFollower>,
    dynamics: VehicleDynamics,
    ego: EgoObservation,
    actors: Vec<Actor>,
    tick: u64,
    records: Vec<TickRecord>,
    collisions: Vec<ActorId>,
}

impl ScenarioRunner {
    pub fn new(scenario: Scenario, config: PlannerConfig) -> Result<Self> {
        Self::with_dynamics(scenario, config, VehicleDynamics::default())
    }

    pub fn with_dynamics(
        scenario: Scenario,
        config: PlannerConfig,
        dynamics: VehicleDynamics,
    ) -> Result<Self> {
        scenario.validate()?;
        config.validate()?;

        let road = &scenario.road;
        let start = road.waypoint(scenario.ego.lane_id, scenario.ego.x).ok_or_else(|| {
            PlannerError::InvalidConfig(format!(
                "ego start x={} lane={} is not on the road",
                scenario.ego.x, scenario.ego.lane_id
            ))
        })?;
        let route = straight_route(road, &start, dynamics.route_step, road.length);

        let ego = EgoObservation {
            id: 0,
            transform: start.transform,
            extent: scenario.ego.extent,
            speed: scenario.ego.speed,
            speed_limit: scenario.speed_limit,
        };
        let actors = scenario.actors.clone();

        Ok(Self {
            agent: BehaviorAgent::new(config, RouteFollower::new(route)),
            scenario,
            dynamics,
            ego,
            actors,
            tick: 0,
            records: Vec::new(),
            collisions: Vec::new(),
        })
    }

    pub fn agent(&self) -> &BehaviorAgent<RouteFollower> {
        &self.agent
    }

    pub fn ego(&self) -> &EgoObservation {
        &self.ego
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    fn is_finished(&self) -> bool {
        self.tick >= self.scenario.ticks
            || self.ego.transform.location.x >= self.scenario.road.length - self.ego.extent.x
    }

    fn snapshot(&self) -> WorldSnapshot {
        let front_x = self.ego.transform.shifted(self.ego.extent.x).location.x;
        let traffic_control_hazard =
            self.scenario.traffic_lights.iter().any(|light| light.binds(self.tick, front_x));
        WorldSnapshot { ego: self.ego.clone(), actors: self.actors.clone(), traffic_control_hazard }
    }

    /// One closed-loop tick. `None` once the scenario is over.
    pub fn step(&mut self) -> Option<TickRecord> {
        if self.is_finished() {
            return None;
        }

        let world = self.snapshot();
        let outcome = self.agent.tick(&world, &self.scenario.road);
        let dt = self.scenario.dt;

        self.integrate_ego(&outcome.control, dt);
        for actor in self.actors.iter_mut().filter(|a| a.class() != ActorClass::StaticObstacle) {
            let velocity = actor.transform.forward_vector() * (actor.speed / 3.6);
            actor.transform.location += velocity * dt;
        }
        self.check_collisions();

        let location = self.ego.transform.location;
        let record = TickRecord {
            tick: self.tick,
            time: self.tick as f64 * dt,
            x: location.x,
            y: location.y,
            yaw: self.ego.transform.yaw,
            speed: self.ego.speed,
            state: outcome.intent.state,
            target_speed: outcome.intent.target_speed,
            control: outcome.control,
            new_plan: outcome.intent.maneuver_plan.is_some(),
        };
        self.tick += 1;
        self.records.push(record.clone());
        Some(record)
    }

    /// Runs to completion and returns the full report.
    pub fn run(mut self) -> RunReport {
        let start_x = self.ego.transform.location.x;
        while self.step().is_some() {}

        let summary = self.summarize(start_x);
        info!(
            "{}: {} ticks, {:.1} m, {} plans, {} collisions",
            summary.scenario,
            summary.ticks,
            summary.distance,
            summary.plans_issued,
            summary.collisions.len()
        );
        RunReport { summary, records: self.records }
    }

    fn summarize(&self, start_x: f64) -> RunSummary {
        let mut states = BTreeMap::new();
        for record in &self.records {
            *states.entry(record.state.as_str().to_string()).or_insert(0) += 1;
        }
        RunSummary {
            scenario: self.scenario.name.clone(),
            ticks: self.tick,
            distance: self.ego.transform.location.x - start_x,
            final_x: self.ego.transform.location.x,
            final_speed: self.ego.speed,
            max_speed: self.records.iter().map(|r| r.speed).fold(0.0, f64::max),
            plans_issued: self.records.iter().filter(|r| r.new_plan).count() as u32,
            collisions: self.collisions.clone(),
            states,
        }
    }

    // ========================================================================
    // Kinematics
    // ========================================================================

    fn integrate_ego(&mut self, control: &VehicleControl, dt: f64) {
        let dyn_ = &self.dynamics;
        let speed = self.ego.speed / 3.6;
        let accel = control.throttle * dyn_.max_acceleration - control.brake * dyn_.max_deceleration;
        let new_speed = (speed + accel * dt).max(0.0);

        let steer_angle = (control.steer * dyn_.max_steer_angle).to_radians();
        let yaw_rate = new_speed / dyn_.wheelbase * steer_angle.tan();
        self.ego.transform.yaw += yaw_rate.to_degrees() * dt;

        let velocity = self.ego.transform.forward_vector() * new_speed;
        self.ego.transform.location += velocity * dt;
        self.ego.speed = new_speed * 3.6;
    }

    fn check_collisions(&mut self) {
        let ego = &self.ego;
        for actor in &self.actors {
            let delta = actor.location() - ego.transform.location;
            let overlap = delta.x.abs() < ego.extent.x + actor.extent.x
                && delta.y.abs() < ego.extent.y + actor.extent.y;
            if overlap && !self.collisions.contains(&actor.id) {
                debug!("tick {}: ego overlaps actor {}", self.tick, actor.id);
                self.collisions.push(actor.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EgoSpec, StraightRoad, TrafficLight};
    use crate::types::{Extent, ObstacleTag, Transform};

    fn scenario(actors: Vec<Actor>) -> Scenario {
        Scenario {
            name: "test".to_string(),
            road: StraightRoad::two_way(800.0),
            speed_limit: 50.0,
            ego: EgoSpec { x: 20.0, lane_id: -1, speed: 30.0, extent: Extent::default() },
            actors,
            traffic_lights: Vec::new(),
            ticks: 400,
            dt: 0.05,
        }
    }

    #[test]
    fn test_empty_road_accelerates_towards_cruise() {
        let report = ScenarioRunner::new(scenario(vec![]), PlannerConfig::default()).unwrap().run();
        assert_eq!(report.summary.ticks, 400);
        assert!(report.summary.distance > 100.0);
        assert!(report.summary.max_speed <= 47.5);
        assert!(report.summary.collisions.is_empty());
        assert_eq!(report.summary.states.get("CRUISE"), Some(&400));
    }

    #[test]
    fn test_red_light_holds_the_ego() {
        let mut s = scenario(vec![]);
        s.traffic_lights.push(TrafficLight {
            stop_x: 60.0,
            red_from: 0,
            red_until: 10_000,
            trigger_distance: 25.0,
        });
        let report = ScenarioRunner::new(s, PlannerConfig::default()).unwrap().run();
        assert!(report.summary.final_x < 60.0);
        assert!(report.summary.final_speed < 1.0);
        assert!(report.summary.states.contains_key("EMERGENCY_STOP"));
    }

    #[test]
    fn test_follows_slow_lead_without_collision() {
        let lead = Actor::vehicle(1, Transform::new(60.0, -1.75, 0.0), 15.0);
        let report = ScenarioRunner::new(scenario(vec![lead]), PlannerConfig::default()).unwrap().run();
        assert!(report.summary.collisions.is_empty());
        assert!(report.summary.states.contains_key("FOLLOW_VEHICLE"));
    }

    #[test]
    fn test_stalled_car_is_overtaken() {
        let block =
            Actor::obstacle(1, Transform::new(80.0, -1.75, 0.0), Extent::new(2.0, 1.0), ObstacleTag::Solid);
        let mut s = scenario(vec![block]);
        s.ticks = 800;
        let report = ScenarioRunner::new(s, PlannerConfig::default()).unwrap().run();
        assert!(report.summary.plans_issued >= 1);
        assert!(report.summary.final_x > 100.0);
        assert!(report.summary.collisions.is_empty());
    }

    #[test]
    fn test_off_road_start_rejected() {
        let mut s = scenario(vec![]);
        s.ego.lane_id = -3;
        assert!(matches!(
            ScenarioRunner::new(s, PlannerConfig::default()),
            Err(PlannerError::InvalidConfig(_))
        ));
    }
}
