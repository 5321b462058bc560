//! Straight multi-lane road
//!
//! Reference line runs along +x from `x = 0` to `x = length`, with signed
//! lane ids:
//!
//! ```text
//!   y > 0   lane  2   <- travels -x
//!           lane  1   <-
//!   y = 0  ---------- centre marking
//!           lane -1   -> travels +x
//!   y < 0   lane -2   ->
//! ```
//!
//! Left and right are taken in each lane's own travel direction, so the
//! left neighbour of lane -1 is lane 1 and the left neighbour of lane 1 is
//! lane -1.

use serde::{Deserialize, Serialize};

use crate::types::{
    LaneChange, LaneType, Location, ManeuverPlan, RoadOption, Transform, Waypoint,
};
use crate::world::LaneGraph;

fn default_lane_width() -> f64 {
    3.5
}

fn default_road_id() -> u32 {
    1
}

fn default_marking() -> LaneChange {
    LaneChange::Both
}

/// Half-open interval `[start, end)` along x flagged as junction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JunctionSpan {
    pub start: f64,
    pub end: f64,
}

impl JunctionSpan {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightRoad {
    #[serde(default = "default_road_id")]
    pub road_id: u32,
    pub length: f64,
    #[serde(default = "default_lane_width")]
    pub lane_width: f64,
    /// Lanes travelling +x, innermost first (ids -1, -2, ...)
    pub forward_lanes: Vec<LaneType>,
    /// Lanes travelling -x, innermost first (ids 1, 2, ...)
    #[serde(default)]
    pub backward_lanes: Vec<LaneType>,
    /// Marking between the two directions
    #[serde(default = "default_marking")]
    pub centre_marking: LaneChange,
    /// Marking between lanes of the same direction
    #[serde(default = "default_marking")]
    pub lane_marking: LaneChange,
    #[serde(default)]
    pub junctions: Vec<JunctionSpan>,
}

impl StraightRoad {
    /// One lane each way with a broken centre line.
    pub fn two_way(length: f64) -> Self {
        Self {
            road_id: default_road_id(),
            length,
            lane_width: default_lane_width(),
            forward_lanes: vec![LaneType::Driving],
            backward_lanes: vec![LaneType::Driving],
            centre_marking: LaneChange::Both,
            lane_marking: LaneChange::Both,
            junctions: Vec::new(),
        }
    }

    /// `lanes` driving lanes, all travelling +x.
    pub fn one_way(length: f64, lanes: usize) -> Self {
        Self {
            forward_lanes: vec![LaneType::Driving; lanes.max(1)],
            backward_lanes: Vec::new(),
            ..Self::two_way(length)
        }
    }

    pub fn with_junction(mut self, start: f64, end: f64) -> Self {
        self.junctions.push(JunctionSpan { start, end });
        self
    }

    pub fn with_centre_marking(mut self, marking: LaneChange) -> Self {
        self.centre_marking = marking;
        self
    }

    /// Appends an outer lane of `lane_type` on the +x side.
    pub fn with_outer_lane(mut self, lane_type: LaneType) -> Self {
        self.forward_lanes.push(lane_type);
        self
    }

    /// Lateral centre of a lane.
    pub fn lane_centre(&self, lane_id: i32) -> f64 {
        let k = lane_id.unsigned_abs() as f64;
        let y = (k - 0.5) * self.lane_width;
        if lane_id < 0 {
            -y
        } else {
            y
        }
    }

    pub fn lane_type(&self, lane_id: i32) -> Option<LaneType> {
        let idx = (lane_id.unsigned_abs() as usize).checked_sub(1)?;
        if lane_id < 0 {
            self.forward_lanes.get(idx).copied()
        } else if lane_id > 0 {
            self.backward_lanes.get(idx).copied()
        } else {
            None
        }
    }

    /// Waypoint of `lane_id` at `x`, `None` outside the road.
    pub fn waypoint(&self, lane_id: i32, x: f64) -> Option<Waypoint> {
        let lane_type = self.lane_type(lane_id)?;
        if !(0.0..=self.length).contains(&x) {
            return None;
        }
        let yaw = if lane_id < 0 { 0.0 } else { 180.0 };
        let (left_lane_change, right_lane_change) = self.markings(lane_id);
        Some(Waypoint {
            road_id: self.road_id,
            lane_id,
            s: x,
            transform: Transform::new(x, self.lane_centre(lane_id), yaw),
            is_junction: self.junctions.iter().any(|j| j.contains(x)),
            lane_type,
            left_lane_change,
            right_lane_change,
        })
    }

    /// (left, right) crossing permissions in the lane's own frame.
    fn markings(&self, lane_id: i32) -> (LaneChange, LaneChange) {
        let k = lane_id.unsigned_abs() as usize;
        let (own, other) = if lane_id < 0 {
            (self.forward_lanes.len(), self.backward_lanes.len())
        } else {
            (self.backward_lanes.len(), self.forward_lanes.len())
        };
        let left = match (k, other) {
            (1, 0) => LaneChange::None,
            (1, _) => self.centre_marking,
            _ => self.lane_marking,
        };
        let right = if k < own { self.lane_marking } else { LaneChange::None };
        (left, right)
    }

    /// Lane whose strip contains `y`, clamped to the outermost lanes.
    fn lane_at(&self, y: f64) -> Option<i32> {
        let k = (y.abs() / self.lane_width).floor() as i32 + 1;
        let (count, sign) = if y < 0.0 || (y == 0.0 && !self.forward_lanes.is_empty()) {
            (self.forward_lanes.len(), -1)
        } else {
            (self.backward_lanes.len(), 1)
        };
        if count == 0 {
            // Whole half of the road missing: snap to the other side
            let fallback = if sign < 0 { 1 } else { -1 };
            return self.lane_type(fallback).map(|_| fallback);
        }
        Some(sign * k.min(count as i32))
    }

    fn on_road(&self, location: &Location) -> bool {
        let left = self.backward_lanes.len() as f64 * self.lane_width;
        let right = self.forward_lanes.len() as f64 * self.lane_width;
        (0.0..=self.length).contains(&location.x)
            && location.y <= left + self.lane_width
            && location.y >= -(right + self.lane_width)
    }

    fn lane_ids(&self) -> impl Iterator<Item = i32> + '_ {
        let forward = (1..=self.forward_lanes.len() as i32).map(|k| -k);
        let backward = 1..=self.backward_lanes.len() as i32;
        forward.chain(backward)
    }

    fn shifted(&self, waypoint: &Waypoint, dx: f64) -> Vec<Waypoint> {
        self.waypoint(waypoint.lane_id, waypoint.s + dx).into_iter().collect()
    }

    /// Direction of travel along x: +1 for negative ids, -1 otherwise.
    fn travel_sign(lane_id: i32) -> f64 {
        if lane_id < 0 {
            1.0
        } else {
            -1.0
        }
    }
}

impl LaneGraph for StraightRoad {
    fn waypoint_at(&self, location: &Location) -> Option<Waypoint> {
        if !self.on_road(location) {
            return None;
        }
        self.lane_ids()
            .filter(|id| self.lane_type(*id) == Some(LaneType::Driving))
            .min_by(|a, b| {
                let da = (self.lane_centre(*a) - location.y).abs();
                let db = (self.lane_centre(*b) - location.y).abs();
                da.total_cmp(&db)
            })
            .and_then(|id| self.waypoint(id, location.x))
    }

    fn waypoint_at_any(&self, location: &Location) -> Option<Waypoint> {
        if !self.on_road(location) {
            return None;
        }
        self.lane_at(location.y).and_then(|id| self.waypoint(id, location.x))
    }

    fn next(&self, waypoint: &Waypoint, distance: f64) -> Vec<Waypoint> {
        self.shifted(waypoint, Self::travel_sign(waypoint.lane_id) * distance)
    }

    fn previous(&self, waypoint: &Waypoint, distance: f64) -> Vec<Waypoint> {
        self.shifted(waypoint, -Self::travel_sign(waypoint.lane_id) * distance)
    }

    fn left_lane(&self, waypoint: &Waypoint) -> Option<Waypoint> {
        let id = match waypoint.lane_id {
            -1 => 1,
            1 => -1,
            id if id < 0 => id + 1,
            id => id - 1,
        };
        self.waypoint(id, waypoint.s)
    }

    fn right_lane(&self, waypoint: &Waypoint) -> Option<Waypoint> {
        let id = if waypoint.lane_id < 0 { waypoint.lane_id - 1 } else { waypoint.lane_id + 1 };
        self.waypoint(id, waypoint.s)
    }
}

/// Lane-following route from `start`, one entry every `step` meters.
pub fn straight_route<M: LaneGraph + ?Sized>(
    map: &M,
    start: &Waypoint,
    step: f64,
    length: f64,
) -> ManeuverPlan {
    let mut plan = ManeuverPlan::new();
    plan.push(start.clone(), RoadOption::LaneFollow);

    let mut current = start.clone();
    let mut covered = 0.0;
    while covered < length {
        let Some(next) = map.next(&current, step).into_iter().next() else {
            break;
        };
        covered += step;
        plan.push(next.clone(), RoadOption::LaneFollow);
        current = next;
    }
    plan
}
