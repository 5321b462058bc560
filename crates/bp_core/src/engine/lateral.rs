//! Lateral-Maneuver Planner
//!
//! Two decisions that move the ego out of its lane:
//! - **Tailgating avoidance**: a faster car is closing in from behind, so
//!   yield into a free same-direction lane for a while.
//! - **Overtake**: a static obstacle blocks the lane, so borrow the adjacent
//!   (usually opposing) lane once oncoming traffic leaves enough room.
//!
//! Both produce a `ManeuverPlan` through `PathSynthesizer`. Lane or route
//! failures abandon the maneuver; the caller keeps its current plan.

use tracing::{debug, error, info, warn};

use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::profile::BehaviorProfile;
use crate::types::{
    Actor, ActorClass, LaneType, LateralSide, ManeuverPlan, PlanEntry, RoadOption, Waypoint,
};
use crate::world::LaneGraph;

use super::car_following::{following_speed, FollowingCommand};
use super::ego_state::EgoState;
use super::hazard::{EgoFrame, HazardDetector, HazardQuery};
use super::path_synthesis::{PathRequest, PathSynthesizer};

const KMH_TO_MS: f64 = 1.0 / 3.6;

/// A lane-change plan issued to make way for a faster car behind.
#[derive(Debug, Clone, PartialEq)]
pub struct TailgateManeuver {
    pub side: LateralSide,
    pub plan: ManeuverPlan,
}

/// Obstacle (or slow lead) to get around.
#[derive(Debug, Clone, Copy)]
pub struct OvertakeTarget<'a> {
    pub actor: &'a Actor,
    /// Length along the lane (m); a cluster spans nearest to farthest
    pub length: f64,
    /// Bumper-to-bumper gap (m)
    pub distance: f64,
    /// km/h
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OvertakeDecision {
    /// Take the synthesized detour at `speed` (km/h)
    Commit { plan: ManeuverPlan, speed: f64 },
    /// A detour is already on the route and the borrowed lane is still clear
    Proceed { speed: f64 },
    /// Stay on the current route, approaching the target
    Continue { command: FollowingCommand },
    /// Oncoming traffic blocks the detour; follow the target
    Follow { command: FollowingCommand },
    /// Too close to the target and no room to pass
    EmergencyStop,
}

pub struct LateralPlanner<'w, M: LaneGraph + ?Sized> {
    map: &'w M,
    config: &'w PlannerConfig,
    profile: &'w BehaviorProfile,
    ego: &'w EgoFrame,
    state: &'w EgoState,
}

impl<'w, M: LaneGraph + ?Sized> LateralPlanner<'w, M> {
    pub fn new(
        map: &'w M,
        config: &'w PlannerConfig,
        profile: &'w BehaviorProfile,
        ego: &'w EgoFrame,
        state: &'w EgoState,
    ) -> Self {
        Self { map, config, profile, ego, state }
    }

    fn detector(&self) -> HazardDetector<'w, M> {
        HazardDetector::new(self.map, self.ego)
    }

    /// Guard for tailgating avoidance: nothing ahead, plain lane following
    /// outside junctions, moving, and the cooldown expired.
    pub fn tailgating_allowed(&self, hazard_ahead: bool) -> bool {
        !hazard_ahead
            && self.state.direction == RoadOption::LaneFollow
            && !self.ego.waypoint.is_junction
            && self.state.speed > self.config.tailgate.min_ego_speed
            && self.profile.can_tailgate()
    }

    /// Yields the lane when a faster vehicle is catching up from behind.
    ///
    /// Prefers the right lane, then the left; each must be legal to enter,
    /// carry traffic the same way, and be free of vehicles.
    pub fn tailgating(&self, actors: &[Actor], route: &[PlanEntry]) -> Option<TailgateManeuver> {
        let detection = &self.config.detection;
        let range = self.profile.min_proximity_threshold.max(self.state.speed_limit / 2.0);

        let behind_query = HazardQuery::new(
            ActorClass::Vehicle,
            detection.vehicle_radius,
            range,
            detection.rear_cone,
        );
        let behind = self.detector().detect(actors, &behind_query);
        let follower = behind.actor?;
        if self.state.speed >= follower.speed {
            return None;
        }
        debug!(
            "tailgater {} closing at {:.1} km/h (ego {:.1} km/h)",
            follower.id, follower.speed, self.state.speed
        );

        for side in [LateralSide::Right, LateralSide::Left] {
            if !self.lane_reachable(side) {
                continue;
            }
            let side_query = HazardQuery::new(
                ActorClass::Vehicle,
                detection.vehicle_radius,
                range,
                detection.lane_change_cone,
            )
            .in_lane(side.offset());
            if self.detector().detect(actors, &side_query).present {
                continue;
            }

            let request = PathRequest::lane_yield(self.config.tailgate.yield_distance, side);
            match PathSynthesizer::new(self.map, &self.config.overtake).synthesize(
                &self.ego.waypoint,
                &request,
                route,
            ) {
                Ok(synthesis) => {
                    info!("Tailgating, moving to the {}", side);
                    return Some(TailgateManeuver { side, plan: synthesis.plan });
                }
                Err(err) => report_abandoned("tailgating lane change", &err),
            }
        }
        None
    }

    /// Lane marking, lane type and travel direction allow moving to `side`.
    fn lane_reachable(&self, side: LateralSide) -> bool {
        let here = &self.ego.waypoint;
        if !here.lane_change_towards(side).allows(side) {
            return false;
        }
        self.map.adjacent_lane(here, side).is_some_and(|target: Waypoint| {
            target.lane_type == LaneType::Driving
                && self.config.tailgate.same_direction.same_direction(here, &target)
        })
    }

    /// Decides whether and how to pass `target`.
    ///
    /// Needed clearance `s = distance + length` and maneuver time
    /// `t = s / (cruise - target_speed)`. An oncoming car in the borrowed lane
    /// is projected forward over `t + time_margin`; the detour is taken only
    /// when the projected gap beats `s` by `clearance_margin` and the gap to
    /// the target is under the braking distance. Without room, a gap under
    /// `braking_distance + security_distance` stops the ego.
    ///
    /// With `detour_pending` the route already carries a lane change, so no
    /// new detour is synthesized; the stop and follow fallbacks still apply.
    pub fn overtake(
        &self,
        actors: &[Actor],
        target: &OvertakeTarget<'_>,
        route: &[PlanEntry],
        detour_pending: bool,
    ) -> OvertakeDecision {
        let overtake = &self.config.overtake;
        let clearance = target.distance + target.length;
        let cruise_kmh = self.profile.cruise_speed(self.state.speed_limit);
        let cruise = cruise_kmh * KMH_TO_MS;
        let closing = cruise - target.speed * KMH_TO_MS;
        let duration = if closing > 0.0 { clearance / closing } else { f64::INFINITY };
        let within_braking = target.distance < self.profile.braking_distance;
        let within_security =
            target.distance < self.profile.braking_distance + overtake.security_distance;

        let oncoming_query = HazardQuery::new(
            ActorClass::Vehicle,
            overtake.oncoming_lookahead,
            overtake.oncoming_lookahead,
            overtake.oncoming_cone,
        )
        .in_lane(overtake.departure_side.offset());
        let oncoming = self.detector().detect(actors, &oncoming_query);

        let room = match oncoming.actor {
            None => true,
            Some(car) => {
                let projected =
                    oncoming.distance - car.speed * KMH_TO_MS * (duration + overtake.time_margin);
                debug!(
                    "oncoming {} at {:.1} m, projected gap {:.1} m, need {:.1} m",
                    car.id,
                    oncoming.distance,
                    projected,
                    clearance + overtake.clearance_margin
                );
                projected > clearance + overtake.clearance_margin
            }
        };

        if room && detour_pending && within_security {
            return OvertakeDecision::Proceed { speed: cruise_kmh };
        }

        if room && within_braking && !detour_pending {
            let length = (clearance - overtake.path_shortening).max(0.0);
            let request = PathRequest::overtake(length, overtake);
            match PathSynthesizer::new(self.map, overtake).synthesize(
                &self.ego.waypoint,
                &request,
                route,
            ) {
                Ok(synthesis) => {
                    info!(
                        "overtaking {} over {:.1} m ({} steps)",
                        target.actor.id, synthesis.covered_distance, synthesis.steps
                    );
                    return OvertakeDecision::Commit { plan: synthesis.plan, speed: cruise_kmh };
                }
                Err(err) => report_abandoned("overtake", &err),
            }
        }

        if !room && within_security {
            return OvertakeDecision::EmergencyStop;
        }

        let command = following_speed(
            self.state.speed,
            target.speed,
            target.distance,
            self.state.speed_limit,
            self.config.motion.min_speed,
            self.profile,
        );
        if room {
            OvertakeDecision::Continue { command }
        } else {
            OvertakeDecision::Follow { command }
        }
    }
}

/// Unreachable lanes are routine; a desync means the lane graph or route is broken.
fn report_abandoned(maneuver: &str, err: &PlannerError) {
    match err {
        PlannerError::RoutingDesync { .. } => error!("{} abandoned: {}", maneuver, err),
        _ => warn!("{} abandoned: {}", maneuver, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{straight_route, StraightRoad};
    use crate::types::{Extent, ObstacleTag, Transform};

    struct Fixture {
        road: StraightRoad,
        config: PlannerConfig,
        profile: BehaviorProfile,
        frame: EgoFrame,
        state: EgoState,
        route: ManeuverPlan,
    }

    impl Fixture {
        fn new(road: StraightRoad, speed: f64) -> Self {
            let transform = Transform::new(100.0, -1.75, 0.0);
            let waypoint = road.waypoint_at(&transform.location).unwrap();
            let route = straight_route(&road, &waypoint, 2.0, 300.0);
            let state = EgoState {
                speed,
                speed_limit: 50.0,
                road_id: Some(waypoint.road_id),
                lane_id: Some(waypoint.lane_id),
                ..EgoState::default()
            };
            let frame =
                EgoFrame { id: 0, transform, extent: Extent::default(), waypoint, lookahead: None };
            Self {
                road,
                config: PlannerConfig::default(),
                profile: BehaviorProfile::normal(),
                frame,
                state,
                route,
            }
        }

        fn planner(&self) -> LateralPlanner<'_, StraightRoad> {
            LateralPlanner::new(&self.road, &self.config, &self.profile, &self.frame, &self.state)
        }
    }

    fn obstacle_at(x: f64) -> Actor {
        Actor::obstacle(50, Transform::new(x, -1.75, 0.0), Extent::new(1.0, 1.0), ObstacleTag::Solid)
    }

    #[test]
    fn test_tailgating_guard() {
        let mut fx = Fixture::new(StraightRoad::one_way(1000.0, 2), 40.0);
        assert!(fx.planner().tailgating_allowed(false));
        assert!(!fx.planner().tailgating_allowed(true));

        fx.profile.arm_tailgate(200);
        assert!(!fx.planner().tailgating_allowed(false));

        fx.profile.tailgate_counter = 0;
        fx.state.speed = 8.0;
        assert!(!fx.planner().tailgating_allowed(false));

        fx.state.speed = 40.0;
        fx.state.direction = RoadOption::ChangeLaneLeft;
        assert!(!fx.planner().tailgating_allowed(false));
    }

    #[test]
    fn test_tailgater_triggers_right_lane_change() {
        let fx = Fixture::new(StraightRoad::one_way(1000.0, 2), 40.0);
        let actors = vec![Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 70.0)];

        let maneuver = fx.planner().tailgating(&actors, fx.route.entries()).unwrap();
        assert_eq!(maneuver.side, LateralSide::Right);
        assert_eq!(maneuver.plan.entries()[1].option, RoadOption::ChangeLaneRight);
        assert_eq!(maneuver.plan.last(), fx.route.last());
    }

    #[test]
    fn test_slower_car_behind_is_ignored() {
        let fx = Fixture::new(StraightRoad::one_way(1000.0, 2), 40.0);
        let actors = vec![Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 30.0)];
        assert!(fx.planner().tailgating(&actors, fx.route.entries()).is_none());
    }

    #[test]
    fn test_occupied_target_lane_blocks_tailgating() {
        let fx = Fixture::new(StraightRoad::one_way(1000.0, 2), 40.0);
        let actors = vec![
            Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 70.0),
            Actor::vehicle(10, Transform::new(104.0, -5.25, 0.0), 40.0),
        ];
        assert!(fx.planner().tailgating(&actors, fx.route.entries()).is_none());
    }

    #[test]
    fn test_opposing_lane_never_used_for_yielding() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 40.0);
        let actors = vec![Actor::vehicle(9, Transform::new(88.0, -1.75, 0.0), 70.0)];
        assert!(fx.planner().tailgating(&actors, fx.route.entries()).is_none());
    }

    #[test]
    fn test_overtake_commits_when_clear_and_close() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(107.4);
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 4.0, speed: 0.0 };

        match fx.planner().overtake(&[obstacle.clone()], &target, fx.route.entries(), false) {
            OvertakeDecision::Commit { plan, speed } => {
                assert!((speed - 47.0).abs() < 1e-9);
                assert_eq!(plan.entries()[1].option, RoadOption::ChangeLaneLeft);
                assert_eq!(plan.last(), fx.route.last());
            }
            other => panic!("expected commit, got {:?}", other),
        }
    }

    #[test]
    fn test_overtake_waits_when_far() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(125.0);
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 25.0, speed: 0.0 };
        let decision =
            fx.planner().overtake(&[obstacle.clone()], &target, fx.route.entries(), false);
        assert!(matches!(decision, OvertakeDecision::Continue { .. }));
    }

    #[test]
    fn test_oncoming_traffic_forces_stop_when_close() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(107.4);
        let oncoming = Actor::vehicle(60, Transform::new(140.0, 1.75, 180.0), 50.0);
        let actors = vec![obstacle.clone(), oncoming];
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 4.0, speed: 0.0 };

        let decision = fx.planner().overtake(&actors, &target, fx.route.entries(), false);
        assert_eq!(decision, OvertakeDecision::EmergencyStop);
    }

    #[test]
    fn test_oncoming_traffic_means_follow_when_far() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(125.0);
        let oncoming = Actor::vehicle(60, Transform::new(150.0, 1.75, 180.0), 50.0);
        let actors = vec![obstacle.clone(), oncoming];
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 25.0, speed: 0.0 };

        let decision = fx.planner().overtake(&actors, &target, fx.route.entries(), false);
        assert!(matches!(decision, OvertakeDecision::Follow { .. }));
    }

    #[test]
    fn test_distant_oncoming_car_leaves_room() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(107.4);
        let oncoming = Actor::vehicle(60, Transform::new(195.0, 1.75, 180.0), 10.0);
        let actors = vec![obstacle.clone(), oncoming];
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 4.0, speed: 0.0 };

        let decision = fx.planner().overtake(&actors, &target, fx.route.entries(), false);
        assert!(matches!(decision, OvertakeDecision::Commit { .. }));
    }

    #[test]
    fn test_single_lane_road_abandons_overtake() {
        let fx = Fixture::new(StraightRoad::one_way(1000.0, 1), 20.0);
        let obstacle = obstacle_at(107.4);
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 4.0, speed: 0.0 };
        let decision =
            fx.planner().overtake(&[obstacle.clone()], &target, fx.route.entries(), false);
        assert!(matches!(decision, OvertakeDecision::Continue { .. }));
    }

    #[test]
    fn test_free_lane_waits_until_braking_distance() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(109.4);
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 6.0, speed: 0.0 };
        let decision =
            fx.planner().overtake(&[obstacle.clone()], &target, fx.route.entries(), false);
        assert!(matches!(decision, OvertakeDecision::Continue { .. }));
    }

    #[test]
    fn test_pending_detour_is_not_resynthesized() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(107.4);
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 4.0, speed: 0.0 };
        let decision =
            fx.planner().overtake(&[obstacle.clone()], &target, fx.route.entries(), true);
        assert_eq!(decision, OvertakeDecision::Proceed { speed: 47.0 });
    }

    #[test]
    fn test_pending_detour_still_stops_for_oncoming_traffic() {
        let fx = Fixture::new(StraightRoad::two_way(1000.0), 20.0);
        let obstacle = obstacle_at(107.4);
        let oncoming = Actor::vehicle(60, Transform::new(140.0, 1.75, 180.0), 50.0);
        let actors = vec![obstacle.clone(), oncoming];
        let target = OvertakeTarget { actor: &obstacle, length: 2.0, distance: 4.0, speed: 0.0 };

        let decision = fx.planner().overtake(&actors, &target, fx.route.entries(), true);
        assert_eq!(decision, OvertakeDecision::EmergencyStop);
    }
}
