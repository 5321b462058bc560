//! Synthetic world
//!
//! Deterministic stand-ins for the collaborators the decision core talks
//! to: a straight lane graph, a pure-pursuit route follower, YAML scenarios
//! and a closed-loop runner.

mod follower;
mod road;
mod runner;
mod scenario;

pub use follower::{FollowerGains, RouteFollower};
pub use road::{straight_route, JunctionSpan, StraightRoad};
pub use runner::{RunReport, RunSummary, ScenarioRunner, TickRecord, VehicleDynamics};
pub use scenario::{EgoSpec, Scenario, TrafficLight};
