//! # bp_core - Behavior Planner Decision Core
//!
//! Once per control tick the planner looks at a perception snapshot,
//! picks exactly one behavior (stop, follow, slow for a junction, get
//! around an obstacle, cruise) and hands a target speed and optional
//! maneuver plan to a path follower.
//!
//! ## Features
//! - Priority arbitration: traffic control > pedestrians > vehicles >
//!   junctions > static obstacles > cruise
//! - Time-to-collision car following with three bands
//! - Tailgating avoidance and overtaking with lane-change path synthesis
//! - Cautious / normal / aggressive behavior profiles
//! - Synthetic straight-road world for deterministic closed-loop runs
//!
//! ```rust
//! use bp_core::config::PlannerConfig;
//! use bp_core::sim::{Scenario, ScenarioRunner};
//!
//! let scenario = Scenario::random_traffic(42, 8);
//! let report = ScenarioRunner::new(scenario, PlannerConfig::default())
//!     .unwrap()
//!     .run();
//! assert!(report.summary.ticks > 0);
//! ```

// Tuning-heavy constructors take many parameters
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod config;
pub mod engine;
pub mod error;
pub mod profile;
pub mod sim;
pub mod types;
pub mod world;

pub use config::PlannerConfig;
pub use engine::{BehaviorAgent, TickOutcome};
pub use error::{PlannerError, Result};
pub use profile::{BehaviorKind, BehaviorProfile};
pub use types::{
    Actor, ActorKind, BehaviorState, ControlIntent, ManeuverPlan, RoadOption, VehicleControl,
    Waypoint,
};
pub use world::{EgoObservation, LaneGraph, PathFollower, Perception, WorldSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
