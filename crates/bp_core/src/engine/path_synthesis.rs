//! Lane-change path synthesis
//!
//! Builds the detour used by overtakes and tailgating yields:
//!
//! ```text
//!  start ─ next ─╮                          ╭─ rejoin ─ old route ...
//!                ╰─ side ─ s1 ─ s2 ─ ... ─ sN ╯
//! ```
//!
//! The straight part is walked in `sampling_distance` steps until the
//! summed step lengths reach the requested distance. The walk is bounded by
//! `max_steps`; running out of budget is a routing desync.

use crate::config::{OvertakeConfig, OvertakeMode};
use crate::error::{PlannerError, Result};
use crate::types::{LaneType, LateralSide, ManeuverPlan, PlanEntry, RoadOption, Waypoint};
use crate::world::LaneGraph;

use super::geometry::compute_distance;

/// Shape of one detour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRequest {
    /// Distance to cover in the borrowed lane (m)
    pub distance: f64,
    pub departure_side: LateralSide,
    /// Side of the borrowed lane leading back, in that lane's own frame
    pub return_side: LateralSide,
    /// Road option recorded on the cut-back entry
    pub return_option: RoadOption,
    /// Walk the borrowed lane with `previous()` (opposing traffic lanes)
    pub walk_backward: bool,
}

impl PathRequest {
    pub fn overtake(distance: f64, config: &OvertakeConfig) -> Self {
        Self {
            distance,
            departure_side: config.departure_side,
            return_side: config.return_side(),
            return_option: config.return_option(),
            walk_backward: config.mode == OvertakeMode::TwoWay,
        }
    }

    /// Move over into a same-direction lane and come back after `distance`.
    pub fn lane_yield(distance: f64, side: LateralSide) -> Self {
        Self {
            distance,
            departure_side: side,
            return_side: side.opposite(),
            return_option: side.opposite().lane_change_option(),
            walk_backward: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathSynthesis {
    pub plan: ManeuverPlan,
    /// Summed step lengths along the borrowed lane
    pub covered_distance: f64,
    pub steps: usize,
}

pub struct PathSynthesizer<'m, M: LaneGraph + ?Sized> {
    map: &'m M,
    sampling_distance: f64,
    return_offset: f64,
    max_steps: usize,
}

impl<'m, M: LaneGraph + ?Sized> PathSynthesizer<'m, M> {
    pub fn new(map: &'m M, config: &OvertakeConfig) -> Self {
        Self {
            map,
            sampling_distance: config.sampling_distance,
            return_offset: config.return_offset,
            max_steps: config.max_steps,
        }
    }

    /// Synthesizes the detour from `start` and splices it onto `old_route`.
    ///
    /// Fails with `UnreachableLane` when a lane change is illegal or the lane
    /// is missing, and with `RoutingDesync` when the walk cannot complete or
    /// there is no route to rejoin.
    pub fn synthesize(
        &self,
        start: &Waypoint,
        request: &PathRequest,
        old_route: &[PlanEntry],
    ) -> Result<PathSynthesis> {
        if old_route.is_empty() {
            return Err(PlannerError::desync("no active route to rejoin"));
        }

        let mut plan = ManeuverPlan::new();
        plan.push(start.clone(), RoadOption::LaneFollow);

        let departure = request.departure_side;
        let pivot = first(self.map.next(start, self.sampling_distance))
            .ok_or(PlannerError::UnreachableLane { side: departure })?;
        let side_wp = self.lane_change_target(&pivot, departure)?;
        plan.push(pivot, departure.lane_change_option());
        plan.push(side_wp.clone(), RoadOption::LaneFollow);

        let mut last = side_wp;
        let mut covered = 0.0;
        let mut steps = 0;
        while covered < request.distance {
            if steps >= self.max_steps {
                return Err(PlannerError::desync(format!(
                    "step budget of {} exhausted after {:.1} m of {:.1} m",
                    self.max_steps, covered, request.distance
                )));
            }
            let next = first(self.walk(&last, self.sampling_distance, request.walk_backward))
                .ok_or_else(|| PlannerError::desync("borrowed lane ended mid-maneuver"))?;
            covered += compute_distance(&next.location(), &last.location());
            plan.push(next.clone(), RoadOption::LaneFollow);
            last = next;
            steps += 1;
        }

        let exit = first(self.walk(&last, self.return_offset, request.walk_backward))
            .ok_or_else(|| PlannerError::desync("borrowed lane ended before the cut-back"))?;
        let back = self.lane_change_target(&exit, request.return_side)?;
        plan.push(back.clone(), request.return_option);

        let rejoin = closest_in_list(&back, old_route)
            .ok_or_else(|| PlannerError::desync("no waypoint to rejoin"))?;
        plan.extend_from_slice(&old_route[rejoin..]);

        Ok(PathSynthesis { plan, covered_distance: covered, steps })
    }

    fn walk(&self, from: &Waypoint, distance: f64, backward: bool) -> Vec<Waypoint> {
        if backward {
            self.map.previous(from, distance)
        } else {
            self.map.next(from, distance)
        }
    }

    /// Neighbouring driving lane reachable across a permissive marking.
    fn lane_change_target(&self, from: &Waypoint, side: LateralSide) -> Result<Waypoint> {
        if !from.lane_change_towards(side).allows(side) {
            return Err(PlannerError::UnreachableLane { side });
        }
        self.map
            .adjacent_lane(from, side)
            .filter(|wp| wp.lane_type == LaneType::Driving)
            .ok_or(PlannerError::UnreachableLane { side })
    }
}

/// Index of the route entry nearest to `target` by position.
pub fn closest_in_list(target: &Waypoint, entries: &[PlanEntry]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = compute_distance(&a.waypoint.location(), &target.location());
            let db = compute_distance(&b.waypoint.location(), &target.location());
            da.total_cmp(&db)
        })
        .map(|(idx, _)| idx)
}

fn first(mut waypoints: Vec<Waypoint>) -> Option<Waypoint> {
    if waypoints.is_empty() {
        None
    } else {
        Some(waypoints.swap_remove(0))
    }
}
