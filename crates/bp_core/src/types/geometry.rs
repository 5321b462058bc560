//! World-frame pose primitives
//!
//! x forward along the road reference line, y to the left, yaw in degrees
//! measured counter-clockwise from +x.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

pub type Location = Point2<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Location,
    /// Heading in degrees
    pub yaw: f64,
}

impl Transform {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { location: Point2::new(x, y), yaw }
    }

    /// Unit vector along the heading.
    pub fn forward_vector(&self) -> Vector2<f64> {
        let rad = self.yaw.to_radians();
        Vector2::new(rad.cos(), rad.sin())
    }

    /// Same heading, location shifted along the forward vector.
    pub fn shifted(&self, distance: f64) -> Self {
        Self { location: self.location + self.forward_vector() * distance, yaw: self.yaw }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Bounding box half-extents (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
}

impl Extent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn max_half(&self) -> f64 {
        self.x.max(self.y)
    }
}

impl Default for Extent {
    /// Mid-size car
    fn default() -> Self {
        Self { x: 2.4, y: 1.0 }
    }
}

/// Angular interval in degrees, measured from the reference heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleCone {
    pub low: f64,
    pub high: f64,
}

impl AngleCone {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Everything ahead up to `high` degrees off the heading.
    pub const fn ahead(high: f64) -> Self {
        Self { low: 0.0, high }
    }

    /// Inclusive on both ends so dead-ahead (0 deg) and dead-behind (180 deg) match.
    pub fn contains(&self, angle: f64) -> bool {
        self.low <= angle && angle <= self.high
    }
}
