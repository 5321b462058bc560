//! Plain data shared by the detectors, controllers and the arbiter.

mod actor;
mod control;
mod geometry;
mod plan;
mod road;

pub use actor::{Actor, ActorClass, ActorId, ActorKind, ObstacleTag};
pub use control::{BehaviorState, ControlIntent, VehicleControl};
pub use geometry::{AngleCone, Extent, Location, Transform};
pub use plan::{ManeuverPlan, PlanEntry};
pub use road::{LaneChange, LaneOffset, LaneType, LateralSide, RoadOption, Waypoint};
