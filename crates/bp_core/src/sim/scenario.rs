//! Scenario files
//!
//! A scenario is one straight road, an ego start, a list of actors moving
//! at constant velocity along their heading, and optional traffic lights.
//!
//! ```yaml
//! name: stalled_car
//! road: { length: 600.0, forward_lanes: [driving], backward_lanes: [driving] }
//! ego: { x: 20.0, speed: 30.0 }
//! actors:
//!   - id: 1
//!     transform: { location: [120.0, -1.75], yaw: 0.0 }
//!     kind: { class: static_obstacle, tag: solid }
//! ```

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::types::{Actor, Extent, ObstacleTag, Transform};

use super::road::StraightRoad;

fn default_lane() -> i32 {
    -1
}

fn default_speed_limit() -> f64 {
    50.0
}

fn default_ticks() -> u64 {
    600
}

fn default_dt() -> f64 {
    0.05
}

fn default_trigger_distance() -> f64 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgoSpec {
    pub x: f64,
    #[serde(default = "default_lane")]
    pub lane_id: i32,
    /// km/h
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub extent: Extent,
}

/// Signal that binds the ego while red and close to the stop line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    /// Stop line position along the road (m)
    pub stop_x: f64,
    /// First red tick (inclusive)
    pub red_from: u64,
    /// First green tick after the red phase
    pub red_until: u64,
    /// Front-bumper distance before the line where the light starts to bind (m)
    #[serde(default = "default_trigger_distance")]
    pub trigger_distance: f64,
}

impl TrafficLight {
    pub fn is_red(&self, tick: u64) -> bool {
        (self.red_from..self.red_until).contains(&tick)
    }

    pub fn binds(&self, tick: u64, front_x: f64) -> bool {
        let to_line = self.stop_x - front_x;
        self.is_red(tick) && to_line >= 0.0 && to_line <= self.trigger_distance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub road: StraightRoad,
    /// km/h
    #[serde(default = "default_speed_limit")]
    #[validate(range(min = 1.0))]
    pub speed_limit: f64,
    pub ego: EgoSpec,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub traffic_lights: Vec<TrafficLight>,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Seconds per tick
    #[serde(default = "default_dt")]
    #[validate(range(min = 0.001, max = 1.0))]
    pub dt: f64,
}

impl Scenario {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let mut scenario = Self::from_yaml_str(&source)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .as_ref()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reproducible two-way road with `count` random actors ahead of the ego.
    ///
    /// Mix: slower cars in the ego lane, oncoming cars, and obstacles
    /// (a quarter of them debris).
    pub fn random_traffic(seed: u64, count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let road = StraightRoad::two_way(1500.0);
        let lane = road.lane_width / 2.0;

        let actors = (0..count)
            .map(|i| {
                let id = i as u32 + 1;
                let x = rng.gen_range(60.0..1300.0);
                match rng.gen_range(0..100) {
                    0..=54 => {
                        Actor::vehicle(id, Transform::new(x, -lane, 0.0), rng.gen_range(10.0..35.0))
                    }
                    55..=79 => Actor::vehicle(
                        id,
                        Transform::new(x, lane, 180.0),
                        rng.gen_range(20.0..50.0),
                    ),
                    roll => {
                        let tag = if roll >= 95 { ObstacleTag::Debris } else { ObstacleTag::Solid };
                        let half = rng.gen_range(0.3..1.2);
                        Actor::obstacle(id, Transform::new(x, -lane, 0.0), Extent::new(half, half), tag)
                    }
                }
            })
            .collect();

        Self {
            name: format!("random_{}_{}", seed, count),
            road,
            speed_limit: default_speed_limit(),
            ego: EgoSpec { x: 20.0, lane_id: -1, speed: 0.0, extent: Extent::default() },
            actors,
            traffic_lights: Vec::new(),
            ticks: 1200,
            dt: default_dt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActorClass;

    const STALLED: &str = r#"
name: stalled_car
road:
  length: 600.0
  forward_lanes: [driving]
  backward_lanes: [driving]
ego:
  x: 20.0
  speed: 30.0
actors:
  - id: 1
    transform: { location: [120.0, -1.75], yaw: 0.0 }
    extent: { x: 2.4, y: 1.0 }
    kind: { class: static_obstacle, tag: solid }
traffic_lights:
  - { stop_x: 300.0, red_from: 0, red_until: 100 }
"#;

    #[test]
    fn test_parse_with_defaults() {
        let scenario = Scenario::from_yaml_str(STALLED).unwrap();
        assert_eq!(scenario.name, "stalled_car");
        assert_eq!(scenario.speed_limit, 50.0);
        assert_eq!(scenario.ego.lane_id, -1);
        assert_eq!(scenario.ticks, 600);
        assert_eq!(scenario.road.lane_width, 3.5);
        assert_eq!(scenario.actors[0].class(), ActorClass::StaticObstacle);
        assert_eq!(scenario.traffic_lights[0].trigger_distance, 10.0);
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let source = STALLED.replace("name: stalled_car", "name: bad\ndt: 0.0");
        assert!(Scenario::from_yaml_str(&source).is_err());
    }

    #[test]
    fn test_traffic_light_window() {
        let light =
            TrafficLight { stop_x: 100.0, red_from: 10, red_until: 20, trigger_distance: 10.0 };
        assert!(!light.binds(5, 95.0));
        assert!(light.binds(10, 95.0));
        assert!(!light.binds(20, 95.0));
        assert!(!light.binds(15, 80.0));
        assert!(!light.binds(15, 101.0));
    }

    #[test]
    fn test_random_traffic_is_reproducible() {
        let a = Scenario::random_traffic(7, 12);
        let b = Scenario::random_traffic(7, 12);
        let c = Scenario::random_traffic(8, 12);
        assert_eq!(a, b);
        assert_ne!(a.actors, c.actors);
        assert_eq!(a.actors.len(), 12);
        assert!(a.actors.iter().all(|actor| actor.id != 0));
    }

    #[test]
    fn test_shipped_scenarios_parse() {
        let sources = [
            include_str!("../../../../scenarios/stalled_car.yaml"),
            include_str!("../../../../scenarios/slow_lead.yaml"),
            include_str!("../../../../scenarios/tailgater.yaml"),
            include_str!("../../../../scenarios/red_light.yaml"),
            include_str!("../../../../scenarios/debris.yaml"),
        ];
        for source in sources {
            let scenario = Scenario::from_yaml_str(source).unwrap();
            assert!(!scenario.name.is_empty());
            assert!(scenario.road.waypoint(scenario.ego.lane_id, scenario.ego.x).is_some());
        }
    }

    #[test]
    fn test_load_names_scenario_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiet_road.yaml");
        let source = STALLED.replace("name: stalled_car\n", "");
        std::fs::write(&path, source).unwrap();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.name, "quiet_road");
    }
}
