//! Hazard Detector
//!
//! Finds the nearest actor of one class that is relevant to the ego path:
//! close to the reference waypoint, in the queried lane, and inside the
//! angular cone measured from the ego's front bumper.
//!
//! ## Relevance filter
//! 1. Class match and self-exclusion (the snapshot may contain the ego)
//! 2. Within `search_radius` of the ego waypoint
//! 3. Lane match against the ego lane shifted by `lane_offset`, or against the
//!    route waypoint a few steps ahead (catches actors past a lane boundary).
//!    Skipped when both ego and actor are inside a junction.
//! 4. Cone and `max_distance` test from the ego front bumper to the actor's
//!    rear bumper (vehicles) or centre (pedestrians, obstacles)

use crate::types::{
    Actor, ActorClass, ActorId, AngleCone, Extent, LaneOffset, Location, Transform, Waypoint,
};
use crate::world::LaneGraph;

use super::geometry::{compute_distance, is_within_distance};

/// Ego pose and lane context for one tick of hazard queries.
#[derive(Debug, Clone, PartialEq)]
pub struct EgoFrame {
    pub id: ActorId,
    pub transform: Transform,
    pub extent: Extent,
    pub waypoint: Waypoint,
    /// Route waypoint a few steps ahead
    pub lookahead: Option<Waypoint>,
}

impl EgoFrame {
    pub fn front_transform(&self) -> Transform {
        self.transform.shifted(self.extent.x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardQuery {
    pub class: ActorClass,
    /// Pre-filter radius around the ego waypoint
    pub search_radius: f64,
    /// Range of the cone test
    pub max_distance: f64,
    pub cone: AngleCone,
    pub lane_offset: LaneOffset,
}

impl HazardQuery {
    pub fn new(class: ActorClass, search_radius: f64, max_distance: f64, cone: AngleCone) -> Self {
        Self { class, search_radius, max_distance, cone, lane_offset: LaneOffset::Current }
    }

    pub fn in_lane(mut self, lane_offset: LaneOffset) -> Self {
        self.lane_offset = lane_offset;
        self
    }
}

/// Result of one hazard query. `distance` is centre-to-centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardResult<'a> {
    pub present: bool,
    pub actor: Option<&'a Actor>,
    pub distance: f64,
}

impl<'a> HazardResult<'a> {
    pub fn none() -> Self {
        Self { present: false, actor: None, distance: f64::INFINITY }
    }

    pub fn found(actor: &'a Actor, distance: f64) -> Self {
        Self { present: true, actor: Some(actor), distance }
    }

    /// Centre distance minus both bounding-box half extents.
    pub fn bumper_gap(&self, ego_extent: &Extent) -> f64 {
        match self.actor {
            Some(actor) => self.distance - actor.extent.max_half() - ego_extent.max_half(),
            None => f64::INFINITY,
        }
    }
}

pub struct HazardDetector<'w, M: LaneGraph + ?Sized> {
    map: &'w M,
    ego: &'w EgoFrame,
}

impl<'w, M: LaneGraph + ?Sized> HazardDetector<'w, M> {
    pub fn new(map: &'w M, ego: &'w EgoFrame) -> Self {
        Self { map, ego }
    }

    /// Nearest qualifying actor, or `present = false`. Never fails.
    pub fn detect<'a>(&self, actors: &'a [Actor], query: &HazardQuery) -> HazardResult<'a> {
        self.qualifying(actors, query)
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(actor, distance)| HazardResult::found(actor, distance))
            .unwrap_or_else(HazardResult::none)
    }

    /// Every qualifying actor, nearest first.
    pub fn detect_all<'a>(&self, actors: &'a [Actor], query: &HazardQuery) -> Vec<(&'a Actor, f64)> {
        let mut hits = self.qualifying(actors, query);
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    fn qualifying<'a>(&self, actors: &'a [Actor], query: &HazardQuery) -> Vec<(&'a Actor, f64)> {
        let reference = self.ego.waypoint.location();
        let ego_lane = self.lane_key(&self.ego.waypoint, query.lane_offset);
        let lookahead_lane = self
            .ego
            .lookahead
            .as_ref()
            .and_then(|wp| self.lane_key(wp, query.lane_offset));
        let front = self.ego.front_transform();

        actors
            .iter()
            .filter(|actor| actor.class() == query.class && actor.id != self.ego.id)
            .filter(|actor| compute_distance(&actor.location(), &reference) < query.search_radius)
            .filter(|actor| self.in_queried_lane(actor, ego_lane, lookahead_lane))
            .filter(|actor| {
                is_within_distance(&probe_point(actor), &front, query.max_distance, query.cone)
            })
            .map(|actor| (actor, compute_distance(&actor.location(), &self.ego.transform.location)))
            .collect()
    }

    /// (road, lane) selected by the offset, `None` when that lane does not exist.
    fn lane_key(&self, waypoint: &Waypoint, offset: LaneOffset) -> Option<(u32, i32)> {
        let lane = match offset {
            LaneOffset::Current => Some(waypoint.clone()),
            LaneOffset::Left => self.map.left_lane(waypoint),
            LaneOffset::Right => self.map.right_lane(waypoint),
        };
        lane.map(|wp| (wp.road_id, wp.lane_id))
    }

    fn in_queried_lane(
        &self,
        actor: &Actor,
        ego_lane: Option<(u32, i32)>,
        lookahead_lane: Option<(u32, i32)>,
    ) -> bool {
        let Some(actor_wp) = self.map.waypoint_at_any(&actor.location()) else {
            return false;
        };
        if self.ego.waypoint.is_junction && actor_wp.is_junction {
            return true;
        }
        let key = Some((actor_wp.road_id, actor_wp.lane_id));
        (ego_lane.is_some() && key == ego_lane) || (lookahead_lane.is_some() && key == lookahead_lane)
    }
}

/// Point of the actor used for the cone test.
fn probe_point(actor: &Actor) -> Location {
    match actor.class() {
        ActorClass::Vehicle => actor.rear_transform().location,
        ActorClass::Pedestrian | ActorClass::StaticObstacle => actor.location(),
    }
}
