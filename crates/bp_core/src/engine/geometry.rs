//! Geometry & hazard predicates
//!
//! Pure helpers shared by every detector. Angles in degrees.

use crate::types::{AngleCone, Location, Transform};

/// Below this separation two points are treated as coincident.
const COINCIDENT_EPSILON: f64 = 0.001;

/// Euclidean distance between two locations.
#[inline]
pub fn compute_distance(a: &Location, b: &Location) -> f64 {
    nalgebra::distance(a, b)
}

/// Unsigned angle between the reference heading and the direction to `target`.
///
/// Returns 0.0 for coincident points.
pub fn bearing_deg(target: &Location, reference: &Transform) -> f64 {
    let to_target = target - reference.location;
    let norm = to_target.norm();
    if norm < COINCIDENT_EPSILON {
        return 0.0;
    }
    let cos = (reference.forward_vector().dot(&to_target) / norm).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Whether `target` lies within `max_distance` of the reference and inside
/// the angular cone around its heading.
///
/// Coincident points always qualify.
pub fn is_within_distance(
    target: &Location,
    reference: &Transform,
    max_distance: f64,
    cone: AngleCone,
) -> bool {
    let norm = compute_distance(target, &reference.location);
    if norm < COINCIDENT_EPSILON {
        return true;
    }
    if norm > max_distance {
        return false;
    }
    cone.contains(bearing_deg(target, reference))
}

/// Same-frame signed lateral offset of `target` (positive = left of heading).
pub fn lateral_offset(target: &Location, reference: &Transform) -> f64 {
    let fwd = reference.forward_vector();
    let rel = target - reference.location;
    fwd.x * rel.y - fwd.y * rel.x
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn test_bearing_ahead_and_behind() {
        let ego = Transform::new(0.0, 0.0, 0.0);
        assert!(bearing_deg(&Point2::new(10.0, 0.0), &ego).abs() < 1e-6);
        assert!((bearing_deg(&Point2::new(-10.0, 0.0), &ego) - 180.0).abs() < 1e-6);
        assert!((bearing_deg(&Point2::new(0.0, 5.0), &ego) - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_within_distance_respects_cone_and_range() {
        let ego = Transform::new(0.0, 0.0, 0.0);
        let ahead = AngleCone::ahead(30.0);

        assert!(is_within_distance(&Point2::new(20.0, 1.0), &ego, 25.0, ahead));
        assert!(!is_within_distance(&Point2::new(30.0, 0.0), &ego, 25.0, ahead));
        assert!(!is_within_distance(&Point2::new(5.0, 5.0), &ego, 25.0, ahead));
        assert!(!is_within_distance(&Point2::new(-10.0, 0.0), &ego, 25.0, ahead));
    }

    #[test]
    fn test_rear_cone_detects_follower() {
        let ego = Transform::new(0.0, 0.0, 0.0);
        let rear = AngleCone::new(160.0, 180.0);
        assert!(is_within_distance(&Point2::new(-12.0, 0.5), &ego, 20.0, rear));
        assert!(!is_within_distance(&Point2::new(-2.0, 3.5), &ego, 20.0, rear));
    }

    #[test]
    fn test_coincident_points_qualify() {
        let ego = Transform::new(3.0, 4.0, 45.0);
        assert!(is_within_distance(&Point2::new(3.0, 4.0), &ego, 0.0, AngleCone::new(160.0, 180.0)));
    }

    #[test]
    fn test_lateral_offset_sign() {
        let ego = Transform::new(0.0, 0.0, 0.0);
        assert!(lateral_offset(&Point2::new(5.0, 3.5), &ego) > 0.0);
        assert!(lateral_offset(&Point2::new(5.0, -3.5), &ego) < 0.0);

        let reversed = Transform::new(0.0, 0.0, 180.0);
        assert!(lateral_offset(&Point2::new(5.0, 3.5), &reversed) < 0.0);
    }
}
