use serde::{Deserialize, Serialize};

use super::geometry::{Extent, Location, Transform};

pub type ActorId = u32;

/// Static obstacle type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleTag {
    /// Loose debris: drive over it at reduced speed
    Debris,
    /// Anything that has to be driven around
    #[default]
    Solid,
}

impl ObstacleTag {
    pub fn is_ignorable(self) -> bool {
        matches!(self, ObstacleTag::Debris)
    }
}

/// Actor classification with per-kind fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ActorKind {
    Vehicle,
    Pedestrian,
    StaticObstacle {
        #[serde(default)]
        tag: ObstacleTag,
    },
}

/// Field-less class selector used by hazard queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorClass {
    Vehicle,
    Pedestrian,
    StaticObstacle,
}

impl ActorKind {
    pub fn class(&self) -> ActorClass {
        match self {
            ActorKind::Vehicle => ActorClass::Vehicle,
            ActorKind::Pedestrian => ActorClass::Pedestrian,
            ActorKind::StaticObstacle { .. } => ActorClass::StaticObstacle,
        }
    }
}

/// Read-only snapshot of one traffic participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub transform: Transform,
    #[serde(default)]
    pub extent: Extent,
    /// km/h
    #[serde(default)]
    pub speed: f64,
    pub kind: ActorKind,
}

impl Actor {
    pub fn vehicle(id: ActorId, transform: Transform, speed: f64) -> Self {
        Self { id, transform, extent: Extent::default(), speed, kind: ActorKind::Vehicle }
    }

    pub fn pedestrian(id: ActorId, transform: Transform, speed: f64) -> Self {
        Self {
            id,
            transform,
            extent: Extent::new(0.3, 0.3),
            speed,
            kind: ActorKind::Pedestrian,
        }
    }

    pub fn obstacle(id: ActorId, transform: Transform, extent: Extent, tag: ObstacleTag) -> Self {
        Self { id, transform, extent, speed: 0.0, kind: ActorKind::StaticObstacle { tag } }
    }

    pub fn location(&self) -> Location {
        self.transform.location
    }

    pub fn class(&self) -> ActorClass {
        self.kind.class()
    }

    pub fn obstacle_tag(&self) -> Option<ObstacleTag> {
        match self.kind {
            ActorKind::StaticObstacle { tag } => Some(tag),
            _ => None,
        }
    }

    /// Transform of the rear bumper.
    pub fn rear_transform(&self) -> Transform {
        self.transform.shifted(-self.extent.x)
    }
}
