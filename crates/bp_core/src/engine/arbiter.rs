//! Behavior Arbiter
//!
//! One `tick` resolves exactly one behavior, checked in priority order:
//!
//! | # | hazard                         | outcome                                   |
//! |---|--------------------------------|-------------------------------------------|
//! | 1 | traffic control binds the ego  | `EMERGENCY_STOP`                          |
//! | 2 | pedestrian inside braking gap  | `EMERGENCY_STOP`                          |
//! | 3 | vehicle ahead                  | `EMERGENCY_STOP` or `FOLLOW_VEHICLE`      |
//! | 4 | turning at the next junction   | `HANDLE_INTERSECTION`                     |
//! | 5 | static obstacle ahead          | `AVOID_STATIC_OBSTACLE` (debris: cruise)  |
//! | 6 | nothing                        | `CRUISE`                                  |
//!
//! Tailgating avoidance runs as a side effect of step 3 when no vehicle is
//! ahead. Its yield plan is issued only when the chosen behavior neither
//! stops nor brings a plan of its own. Across ticks only the tailgate
//! cooldown and the follower's active route persist.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PlannerConfig;
use crate::profile::BehaviorProfile;
use crate::types::{
    Actor, ActorClass, BehaviorState, ControlIntent, LaneOffset, ManeuverPlan, VehicleControl,
    Waypoint,
};
use crate::world::{EgoObservation, LaneGraph, PathFollower, Perception};

use super::car_following::following_speed;
use super::ego_state::EgoState;
use super::hazard::{EgoFrame, HazardDetector, HazardQuery, HazardResult};
use super::lateral::{LateralPlanner, OvertakeDecision, OvertakeTarget, TailgateManeuver};

/// Route entries scanned for a lane change still in progress.
const MANEUVER_SCAN_ENTRIES: usize = 16;

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub tick: u64,
    pub intent: ControlIntent,
    pub control: VehicleControl,
}

/// Single-agent behavior planner. Owns the profile, the ego state and the
/// path follower; nothing is shared between agents.
pub struct BehaviorAgent<F: PathFollower> {
    config: PlannerConfig,
    profile: BehaviorProfile,
    ego_state: EgoState,
    follower: F,
    last_control: VehicleControl,
    ticks: u64,
}

impl<F: PathFollower> BehaviorAgent<F> {
    pub fn new(config: PlannerConfig, follower: F) -> Self {
        let profile = config.profile();
        Self {
            config,
            profile,
            ego_state: EgoState::default(),
            follower,
            last_control: VehicleControl::default(),
            ticks: 0,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn profile(&self) -> &BehaviorProfile {
        &self.profile
    }

    pub fn ego_state(&self) -> &EgoState {
        &self.ego_state
    }

    pub fn follower(&self) -> &F {
        &self.follower
    }

    pub fn follower_mut(&mut self) -> &mut F {
        &mut self.follower
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Replaces the active route, e.g. with a fresh global plan.
    pub fn set_route(&mut self, plan: ManeuverPlan) {
        self.follower.set_plan(plan);
    }

    /// Whether a traffic control currently binds the ego.
    pub fn traffic_control_hazard<P: Perception + ?Sized>(&self, perception: &P) -> bool {
        perception.traffic_control_affects_ego()
    }

    /// Advances one control cycle. Always yields exactly one intent.
    pub fn tick<P, M>(&mut self, perception: &P, map: &M) -> TickOutcome
    where
        P: Perception + ?Sized,
        M: LaneGraph + ?Sized,
    {
        self.ticks += 1;
        let observation = perception.ego().clone();
        let waypoint = map.waypoint_at(&observation.transform.location);

        self.ego_state.refresh(&observation, waypoint.as_ref(), &self.follower, &self.config.motion);
        self.follower.set_speed(self.ego_state.speed_limit);
        self.profile.tick_cooldown();

        let intent = match waypoint {
            Some(wp) => self.decide(perception, map, &observation, wp),
            None => {
                let at = observation.transform.location;
                warn!("tick {}: ego at ({:.1}, {:.1}) is off the lane graph", self.ticks, at.x, at.y);
                ControlIntent::stop()
            }
        };

        if let Some(plan) = &intent.maneuver_plan {
            self.follower.set_plan(plan.clone());
        }
        let control = if intent.emergency_stop {
            VehicleControl::emergency_stop(self.last_control.steer, self.config.motion.max_brake)
        } else {
            self.follower.set_speed(intent.target_speed);
            self.follower.run_step(&observation)
        };
        self.last_control = control;

        debug!(
            "tick {}: {} at {:.1} km/h",
            self.ticks,
            intent.state.as_str(),
            intent.target_speed
        );
        TickOutcome { tick: self.ticks, intent, control }
    }

    // ========================================================================
    // Arbitration
    // ========================================================================

    fn decide<P, M>(
        &mut self,
        perception: &P,
        map: &M,
        observation: &EgoObservation,
        waypoint: Waypoint,
    ) -> ControlIntent
    where
        P: Perception + ?Sized,
        M: LaneGraph + ?Sized,
    {
        if self.traffic_control_hazard(perception) {
            warn!("tick {}: traffic control ahead, stopping", self.ticks);
            return ControlIntent::stop();
        }

        let lookahead = self
            .follower
            .incoming_waypoint_and_direction(self.config.motion.hazard_lookahead_steps)
            .map(|(wp, _)| wp);
        let frame = EgoFrame {
            id: observation.id,
            transform: observation.transform,
            extent: observation.extent,
            waypoint,
            lookahead,
        };
        let actors = perception.actors();
        let detector = HazardDetector::new(map, &frame);

        // 2. Pedestrians
        let walker = detector.detect(actors, &self.pedestrian_query());
        if walker.present && walker.bumper_gap(&frame.extent) < self.profile.braking_distance {
            warn!("tick {}: pedestrian {:.1} m ahead, stopping", self.ticks, walker.distance);
            return ControlIntent::stop();
        }

        // 3. Vehicles, with tailgating avoidance when the lane ahead is free
        let vehicle = detector.detect(actors, &self.vehicle_query());
        if let Some(lead) = vehicle.actor {
            return self.follow(lead, &vehicle, &frame);
        }
        let yielded = self.try_tailgating(map, &frame, actors);

        // 4. Junction turns
        if self.ego_state.turning_at_junction() {
            let target = self
                .profile
                .max_speed
                .min(self.ego_state.speed_limit - self.config.motion.intersection_speed_margin);
            let intent = ControlIntent::drive(BehaviorState::HandleIntersection, target);
            return self.attach_yield(intent, yielded);
        }

        // 5. Static obstacles
        let obstacles = detector.detect_all(actors, &self.obstacle_query());
        if !obstacles.is_empty() {
            let intent = self.avoid_obstacle(map, &frame, actors, &obstacles);
            return self.attach_yield(intent, yielded);
        }

        // 6. Free road
        let intent = ControlIntent::drive(BehaviorState::Cruise, self.cruise_speed());
        self.attach_yield(intent, yielded)
    }

    fn cruise_speed(&self) -> f64 {
        self.profile.cruise_speed(self.ego_state.speed_limit)
    }

    /// Lookahead distance for hazard cones, widened while changing lanes.
    fn proximity(&self, divisor: f64) -> f64 {
        self.profile.min_proximity_threshold.max(self.ego_state.speed_limit / divisor)
    }

    fn pedestrian_query(&self) -> HazardQuery {
        let detection = &self.config.detection;
        match self.ego_state.direction.lane_change_side() {
            Some(side) => HazardQuery::new(
                ActorClass::Pedestrian,
                detection.pedestrian_radius,
                self.proximity(detection.lane_change_proximity_divisor),
                detection.pedestrian_lane_change_cone,
            )
            .in_lane(side.offset()),
            None => HazardQuery::new(
                ActorClass::Pedestrian,
                detection.pedestrian_radius,
                self.proximity(detection.straight_proximity_divisor),
                detection.pedestrian_cone,
            ),
        }
    }

    fn vehicle_query(&self) -> HazardQuery {
        let detection = &self.config.detection;
        match self.ego_state.direction.lane_change_side() {
            Some(side) => HazardQuery::new(
                ActorClass::Vehicle,
                detection.vehicle_radius,
                self.proximity(detection.lane_change_proximity_divisor),
                detection.lane_change_cone,
            )
            .in_lane(side.offset()),
            None => HazardQuery::new(
                ActorClass::Vehicle,
                detection.vehicle_radius,
                self.proximity(detection.straight_proximity_divisor),
                detection.vehicle_cone,
            ),
        }
    }

    fn obstacle_query(&self) -> HazardQuery {
        let detection = &self.config.detection;
        HazardQuery::new(
            ActorClass::StaticObstacle,
            detection.obstacle_radius,
            detection.obstacle_max_distance,
            detection.obstacle_cone,
        )
        .in_lane(LaneOffset::Current)
    }

    // ========================================================================
    // Behaviors
    // ========================================================================

    fn follow(&self, lead: &Actor, hazard: &HazardResult<'_>, frame: &EgoFrame) -> ControlIntent {
        let gap = hazard.bumper_gap(&frame.extent);
        if gap < self.profile.braking_distance {
            warn!("tick {}: vehicle {} only {:.1} m ahead, stopping", self.ticks, lead.id, gap);
            return ControlIntent::stop();
        }
        let command = following_speed(
            self.ego_state.speed,
            lead.speed,
            gap,
            self.ego_state.speed_limit,
            self.config.motion.min_speed,
            &self.profile,
        );
        ControlIntent::drive(BehaviorState::FollowVehicle, command.target_speed)
    }

    fn try_tailgating<M: LaneGraph + ?Sized>(
        &self,
        map: &M,
        frame: &EgoFrame,
        actors: &[Actor],
    ) -> Option<TailgateManeuver> {
        let planner = LateralPlanner::new(map, &self.config, &self.profile, frame, &self.ego_state);
        if !planner.tailgating_allowed(false) {
            return None;
        }
        planner.tailgating(actors, self.follower.plan())
    }

    /// Issues the yield plan unless the intent already carries a plan or
    /// stops the car. The cooldown is armed only for an issued yield.
    fn attach_yield(
        &mut self,
        intent: ControlIntent,
        yielded: Option<TailgateManeuver>,
    ) -> ControlIntent {
        let Some(maneuver) = yielded else {
            return intent;
        };
        if intent.maneuver_plan.is_some() || intent.emergency_stop {
            debug!("tick {}: yield to the {} dropped", self.ticks, maneuver.side);
            return intent;
        }
        self.profile.arm_tailgate(self.config.tailgate.cooldown_ticks);
        debug!(
            "tick {}: yielding to the {}, cooldown {} ticks",
            self.ticks, maneuver.side, self.profile.tailgate_counter
        );
        intent.with_plan(Some(maneuver.plan))
    }

    fn avoid_obstacle<M: LaneGraph + ?Sized>(
        &self,
        map: &M,
        frame: &EgoFrame,
        actors: &[Actor],
        obstacles: &[(&Actor, f64)],
    ) -> ControlIntent {
        let (nearest, distance) = obstacles[0];
        let cruise = self.cruise_speed();

        if nearest.obstacle_tag().is_some_and(|tag| tag.is_ignorable()) {
            let capped = cruise.min(self.config.motion.debris_speed_cap);
            debug!("tick {}: rolling over debris {} at {:.1} km/h", self.ticks, nearest.id, capped);
            return ControlIntent::drive(BehaviorState::Cruise, capped);
        }

        let length = match obstacles {
            [single] => single.0.extent.max_half() * 2.0,
            [first, .., last] => last.1 - first.1,
            [] => 0.0,
        };
        let gap = HazardResult::found(nearest, distance).bumper_gap(&frame.extent);
        let target = OvertakeTarget { actor: nearest, length, distance: gap, speed: nearest.speed };

        let detour_pending = self.maneuver_in_progress();
        let planner = LateralPlanner::new(map, &self.config, &self.profile, frame, &self.ego_state);
        match planner.overtake(actors, &target, self.follower.plan(), detour_pending) {
            OvertakeDecision::Commit { plan, speed } => {
                ControlIntent::drive(BehaviorState::AvoidStaticObstacle, speed).with_plan(Some(plan))
            }
            OvertakeDecision::Proceed { speed } => {
                ControlIntent::drive(BehaviorState::AvoidStaticObstacle, speed)
            }
            OvertakeDecision::Continue { command } | OvertakeDecision::Follow { command } => {
                ControlIntent::drive(BehaviorState::AvoidStaticObstacle, command.target_speed)
            }
            OvertakeDecision::EmergencyStop => {
                warn!("tick {}: obstacle {} blocks the lane, stopping", self.ticks, nearest.id);
                ControlIntent::stop()
            }
        }
    }

    /// A lane change is still pending on the active route.
    fn maneuver_in_progress(&self) -> bool {
        self.follower
            .plan()
            .iter()
            .take(MANEUVER_SCAN_ENTRIES)
            .any(|entry| entry.option.lane_change_side().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::BehaviorKind;
    use crate::sim::{straight_route, RouteFollower, StraightRoad};
    use crate::types::{Extent, LaneType, ObstacleTag, RoadOption, Transform};
    use crate::world::WorldSnapshot;
    use proptest::prelude::*;

    fn agent_on(road: &StraightRoad, x: f64) -> BehaviorAgent<RouteFollower> {
        let start = road.waypoint(-1, x).unwrap();
        let route = straight_route(road, &start, 2.0, 400.0);
        BehaviorAgent::new(PlannerConfig::default(), RouteFollower::new(route))
    }

    fn snapshot(x: f64, speed: f64, actors: Vec<Actor>) -> WorldSnapshot {
        WorldSnapshot {
            ego: EgoObservation {
                id: 0,
                transform: Transform::new(x, -1.75, 0.0),
                extent: Extent::default(),
                speed,
                speed_limit: 50.0,
            },
            actors,
            traffic_control_hazard: false,
        }
    }

    #[test]
    fn test_free_road_cruises() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        let outcome = agent.tick(&snapshot(100.0, 30.0, vec![]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::Cruise);
        assert!((outcome.intent.target_speed - 47.0).abs() < 1e-9);
        assert!(!outcome.intent.emergency_stop);
        assert_eq!(outcome.tick, 1);
    }

    #[test]
    fn test_cruise_target_with_custom_profile() {
        let road = StraightRoad::two_way(1000.0);
        let start = road.waypoint(-1, 100.0).unwrap();
        let profile =
            BehaviorProfile { max_speed: 60.0, speed_lim_dist: 5.0, ..BehaviorProfile::normal() };
        let config = PlannerConfig { profile: Some(profile), ..PlannerConfig::default() };
        let mut agent =
            BehaviorAgent::new(config, RouteFollower::new(straight_route(&road, &start, 2.0, 400.0)));

        let outcome = agent.tick(&snapshot(100.0, 30.0, vec![]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::Cruise);
        assert!((outcome.intent.target_speed - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_traffic_control_overrides_everything() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);

        // Steer left once so the stop has something to keep
        let mut world = snapshot(100.0, 30.0, vec![]);
        world.ego.transform.location.y = -2.5;
        let first = agent.tick(&world, &road);
        let steer = first.control.steer;
        assert!(steer.abs() > 0.0);

        let mut blocked = snapshot(100.0, 30.0, vec![
            Actor::pedestrian(2, Transform::new(106.0, -1.75, 90.0), 4.0),
            Actor::vehicle(3, Transform::new(109.0, -1.75, 0.0), 10.0),
        ]);
        blocked.traffic_control_hazard = true;
        assert!(agent.traffic_control_hazard(&blocked));

        let outcome = agent.tick(&blocked, &road);
        assert_eq!(outcome.intent.state, BehaviorState::EmergencyStop);
        assert!(outcome.intent.emergency_stop);
        assert_eq!(outcome.control.throttle, 0.0);
        assert_eq!(outcome.control.brake, agent.config().motion.max_brake);
        assert!(!outcome.control.hand_brake);
        assert_eq!(outcome.control.steer, steer);
    }

    #[test]
    fn test_pedestrian_inside_braking_distance_stops() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        let walker = Actor::pedestrian(2, Transform::new(106.0, -1.75, 90.0), 4.0);
        let outcome = agent.tick(&snapshot(100.0, 30.0, vec![walker]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::EmergencyStop);
    }

    #[test]
    fn test_vehicle_ahead_is_followed() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        // Bumper gap 20 m, inside the 30 m lookahead of a 90 km/h road
        let lead = Actor::vehicle(3, Transform::new(124.8, -1.75, 0.0), 18.0);
        let mut world = snapshot(100.0, 54.0, vec![lead]);
        world.ego.speed_limit = 90.0;
        let outcome = agent.tick(&world, &road);
        assert_eq!(outcome.intent.state, BehaviorState::FollowVehicle);
        assert!((outcome.intent.target_speed - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_vehicle_inside_braking_distance_stops() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        let lead = Actor::vehicle(3, Transform::new(108.0, -1.75, 0.0), 10.0);
        let outcome = agent.tick(&snapshot(100.0, 30.0, vec![lead]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::EmergencyStop);
        assert_eq!(outcome.control.brake, 0.5);
    }

    #[test]
    fn test_turn_at_junction_slows_down() {
        let road = StraightRoad::two_way(1000.0).with_junction(110.0, 140.0);
        let start = road.waypoint(-1, 100.0).unwrap();
        let mut route = straight_route(&road, &start, 2.0, 400.0).into_entries();
        for entry in route.iter_mut().filter(|e| e.waypoint.is_junction) {
            entry.option = RoadOption::Left;
        }
        let mut agent = BehaviorAgent::new(
            PlannerConfig::default(),
            RouteFollower::new(ManeuverPlan::from_entries(route)),
        );
        let outcome = agent.tick(&snapshot(100.0, 30.0, vec![]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::HandleIntersection);
        assert!((outcome.intent.target_speed - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_off_road_ego_stops() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        let outcome = agent.tick(&snapshot(2000.0, 30.0, vec![]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::EmergencyStop);
    }

    #[test]
    fn test_debris_caps_speed() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        let debris =
            Actor::obstacle(40, Transform::new(120.0, -1.75, 0.0), Extent::new(0.3, 0.3), ObstacleTag::Debris);
        let outcome = agent.tick(&snapshot(100.0, 30.0, vec![debris]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::Cruise);
        assert!((outcome.intent.target_speed - 30.0).abs() < 1e-9);
    }

    fn cone_at(x: f64) -> Actor {
        Actor::obstacle(41, Transform::new(x, -1.75, 0.0), Extent::new(1.0, 1.0), ObstacleTag::Solid)
    }

    fn oncoming_at(x: f64, speed: f64) -> Actor {
        Actor::vehicle(60, Transform::new(x, 1.75, 180.0), speed)
    }

    #[test]
    fn test_close_obstacle_triggers_overtake() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        // Bumper gap 4.6 m, under the 5 m braking distance
        let outcome = agent.tick(&snapshot(100.0, 20.0, vec![cone_at(108.0)]), &road);

        assert_eq!(outcome.intent.state, BehaviorState::AvoidStaticObstacle);
        let plan = outcome.intent.maneuver_plan.expect("overtake plan");
        assert!(plan.options().contains(&RoadOption::ChangeLaneLeft));
        assert_eq!(agent.follower().plan().last(), plan.last());

        // The detour is in progress; no second plan is synthesized
        let again = agent.tick(&snapshot(101.0, 20.0, vec![cone_at(108.0)]), &road);
        assert_eq!(again.intent.state, BehaviorState::AvoidStaticObstacle);
        assert!(again.intent.maneuver_plan.is_none());
        assert!((again.intent.target_speed - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_outside_braking_distance_is_approached() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        // Bumper gap 6.6 m
        let outcome = agent.tick(&snapshot(100.0, 20.0, vec![cone_at(110.0)]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::AvoidStaticObstacle);
        assert!(outcome.intent.maneuver_plan.is_none());
        assert!(!outcome.intent.emergency_stop);
    }

    #[test]
    fn test_committed_overtake_stops_for_new_oncoming_car() {
        let road = StraightRoad::two_way(1000.0);
        let mut agent = agent_on(&road, 100.0);
        let first = agent.tick(&snapshot(100.0, 20.0, vec![cone_at(108.0)]), &road);
        assert!(first.intent.maneuver_plan.is_some());

        let world = snapshot(101.0, 20.0, vec![cone_at(108.0), oncoming_at(140.0, 50.0)]);
        let outcome = agent.tick(&world, &road);
        assert_eq!(outcome.intent.state, BehaviorState::EmergencyStop);
        assert!(outcome.intent.emergency_stop);
        assert_eq!(outcome.control.throttle, 0.0);
        assert_eq!(outcome.control.brake, agent.config().motion.max_brake);

        // Same answer as an agent that never committed
        let mut fresh = agent_on(&road, 101.0);
        assert_eq!(fresh.tick(&world, &road).intent.state, BehaviorState::EmergencyStop);
    }

    #[test]
    fn test_overtake_commit_drops_yield_without_cooldown() {
        let road = StraightRoad::two_way(1000.0).with_outer_lane(LaneType::Driving);
        let mut agent = agent_on(&road, 100.0);
        let tailgater = Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 70.0);

        let outcome = agent.tick(&snapshot(100.0, 40.0, vec![tailgater, cone_at(108.0)]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::AvoidStaticObstacle);
        let plan = outcome.intent.maneuver_plan.expect("overtake plan");
        assert_eq!(plan.entries()[1].option, RoadOption::ChangeLaneLeft);
        assert_eq!(agent.profile().tailgate_counter, 0);
        assert!(agent.profile().can_tailgate());
    }

    #[test]
    fn test_tailgater_triggers_yield_and_cooldown() {
        let road = StraightRoad::one_way(1000.0, 2);
        let mut agent = agent_on(&road, 100.0);
        let tailgater = Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 70.0);

        let outcome = agent.tick(&snapshot(100.0, 40.0, vec![tailgater.clone()]), &road);
        assert_eq!(outcome.intent.state, BehaviorState::Cruise);
        let plan = outcome.intent.maneuver_plan.expect("yield plan");
        assert_eq!(plan.entries()[1].option, RoadOption::ChangeLaneRight);
        assert_eq!(agent.profile().tailgate_counter, 200);

        // Cooldown blocks a second yield
        let mut world = snapshot(100.0, 40.0, vec![tailgater]);
        agent.set_route(straight_route(&road, &road.waypoint(-1, 100.0).unwrap(), 2.0, 400.0));
        let second = agent.tick(&world, &road);
        assert!(second.intent.maneuver_plan.is_none());
        assert_eq!(agent.profile().tailgate_counter, 199);

        world.actors.clear();
        for _ in 0..199 {
            agent.tick(&world, &road);
        }
        assert_eq!(agent.profile().tailgate_counter, 0);
    }

    #[test]
    fn test_aggressive_never_yields() {
        let road = StraightRoad::one_way(1000.0, 2);
        let start = road.waypoint(-1, 100.0).unwrap();
        let mut agent = BehaviorAgent::new(
            PlannerConfig::for_behavior(BehaviorKind::Aggressive),
            RouteFollower::new(straight_route(&road, &start, 2.0, 400.0)),
        );
        let tailgater = Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 90.0);
        let outcome = agent.tick(&snapshot(100.0, 40.0, vec![tailgater]), &road);
        assert!(outcome.intent.maneuver_plan.is_none());
    }

    proptest! {
        /// A close lead never reaches the following law
        #[test]
        fn prop_close_lead_always_stops(
            ego_speed in 0.0f64..120.0,
            slower_by in 0.0f64..60.0,
            gap in 0.0f64..5.0,
        ) {
            let road = StraightRoad::two_way(1000.0);
            let mut agent = agent_on(&road, 100.0);
            let lead_speed = (ego_speed - slower_by).max(0.0);
            let lead = Actor::vehicle(3, Transform::new(104.8 + gap, -1.75, 0.0), lead_speed);
            let outcome = agent.tick(&snapshot(100.0, ego_speed, vec![lead]), &road);
            prop_assert_eq!(outcome.intent.state, BehaviorState::EmergencyStop);
        }
    }
}
