//! Decision engine
//!
//! Leaf-first: geometry predicates, hazard detection, the following law,
//! lane-change path synthesis, the lateral planner and finally the arbiter
//! that ties them together once per tick.

pub mod arbiter;
pub mod car_following;
pub mod ego_state;
pub mod geometry;
pub mod hazard;
pub mod lateral;
pub mod path_synthesis;

pub use arbiter::{BehaviorAgent, TickOutcome};
pub use car_following::{following_speed, time_to_collision, FollowingBand, FollowingCommand};
pub use ego_state::EgoState;
pub use hazard::{EgoFrame, HazardDetector, HazardQuery, HazardResult};
pub use lateral::{LateralPlanner, OvertakeDecision, OvertakeTarget, TailgateManeuver};
pub use path_synthesis::{closest_in_list, PathRequest, PathSynthesis, PathSynthesizer};
