use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Location, Transform};

/// Travel-direction intent attached to each route entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoadOption {
    Void,
    Left,
    Right,
    Straight,
    #[default]
    LaneFollow,
    ChangeLaneLeft,
    ChangeLaneRight,
}

impl RoadOption {
    pub fn is_turn(self) -> bool {
        matches!(self, RoadOption::Left | RoadOption::Right)
    }

    pub fn lane_change_side(self) -> Option<LateralSide> {
        match self {
            RoadOption::ChangeLaneLeft => Some(LateralSide::Left),
            RoadOption::ChangeLaneRight => Some(LateralSide::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralSide {
    Left,
    Right,
}

impl LateralSide {
    pub fn opposite(self) -> Self {
        match self {
            LateralSide::Left => LateralSide::Right,
            LateralSide::Right => LateralSide::Left,
        }
    }

    pub fn lane_change_option(self) -> RoadOption {
        match self {
            LateralSide::Left => RoadOption::ChangeLaneLeft,
            LateralSide::Right => RoadOption::ChangeLaneRight,
        }
    }

    pub fn offset(self) -> LaneOffset {
        match self {
            LateralSide::Left => LaneOffset::Left,
            LateralSide::Right => LaneOffset::Right,
        }
    }
}

impl fmt::Display for LateralSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LateralSide::Left => write!(f, "left"),
            LateralSide::Right => write!(f, "right"),
        }
    }
}

/// Lane selector for hazard queries: -1 left, 0 current, +1 right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LaneOffset {
    Left,
    #[default]
    Current,
    Right,
}

impl LaneOffset {
    pub fn value(self) -> i32 {
        match self {
            LaneOffset::Left => -1,
            LaneOffset::Current => 0,
            LaneOffset::Right => 1,
        }
    }
}

/// Lane-marking permission for crossing into the neighbouring lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LaneChange {
    #[default]
    None,
    Right,
    Left,
    Both,
}

impl LaneChange {
    pub fn allows(self, side: LateralSide) -> bool {
        matches!(
            (self, side),
            (LaneChange::Both, _)
                | (LaneChange::Left, LateralSide::Left)
                | (LaneChange::Right, LateralSide::Right)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LaneType {
    #[default]
    Driving,
    Shoulder,
    Sidewalk,
    Parking,
}

/// A sampled point on the lane graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub road_id: u32,
    pub lane_id: i32,
    /// Distance along the road reference line
    pub s: f64,
    pub transform: Transform,
    pub is_junction: bool,
    pub lane_type: LaneType,
    /// Permission for crossing the left-hand marking
    pub left_lane_change: LaneChange,
    /// Permission for crossing the right-hand marking
    pub right_lane_change: LaneChange,
}

impl Waypoint {
    pub fn location(&self) -> Location {
        self.transform.location
    }

    pub fn same_lane(&self, other: &Waypoint) -> bool {
        self.road_id == other.road_id && self.lane_id == other.lane_id
    }

    pub fn lane_change_towards(&self, side: LateralSide) -> LaneChange {
        match side {
            LateralSide::Left => self.left_lane_change,
            LateralSide::Right => self.right_lane_change,
        }
    }

    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        nalgebra::distance(&self.location(), &other.location())
    }
}
