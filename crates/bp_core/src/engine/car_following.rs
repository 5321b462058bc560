//! Car-Following Controller
//!
//! Time-to-collision law with three bands:
//!
//! | band        | ttc                          | target speed                               |
//! |-------------|------------------------------|--------------------------------------------|
//! | Decelerate  | `ttc < safety_time`          | `max(0, lead - speed_decrease)`, capped    |
//! | MatchLead   | `safety_time <= ttc < 2*st`  | `max(min_speed, lead)`, capped             |
//! | Cruise      | `ttc >= 2*st`                | `min(max_speed, limit - speed_lim_dist)`   |
//!
//! Every band is capped by the cruise target, so the command never rises
//! when the gap shrinks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::BehaviorProfile;

const KMH_TO_MS: f64 = 1.0 / 3.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowingBand {
    Decelerate,
    MatchLead,
    Cruise,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowingCommand {
    /// km/h
    pub target_speed: f64,
    /// seconds
    pub ttc: f64,
    pub band: FollowingBand,
}

/// Time to collision in seconds.
///
/// Closing speed is floored at the smallest positive `f64`, so a lead that is
/// as fast or faster yields a huge (or infinite) ttc instead of a division by zero.
pub fn time_to_collision(ego_speed: f64, lead_speed: f64, gap: f64) -> f64 {
    let closing = ((ego_speed - lead_speed) * KMH_TO_MS).max(f64::from_bits(1));
    gap / closing
}

/// Target speed behind a lead vehicle. Speeds in km/h, gap in meters.
pub fn following_speed(
    ego_speed: f64,
    lead_speed: f64,
    gap: f64,
    speed_limit: f64,
    min_speed: f64,
    profile: &BehaviorProfile,
) -> FollowingCommand {
    let ttc = time_to_collision(ego_speed, lead_speed, gap);
    let cap = profile.cruise_speed(speed_limit);

    // A non-positive gap means the bumpers already overlap
    let (band, target_speed) = if ttc < profile.safety_time {
        (FollowingBand::Decelerate, (lead_speed - profile.speed_decrease).max(0.0).min(cap))
    } else if ttc < 2.0 * profile.safety_time {
        (FollowingBand::MatchLead, min_speed.max(lead_speed).min(cap))
    } else {
        (FollowingBand::Cruise, cap)
    };

    debug!("following: ttc={:.2}s band={:?} target={:.1}km/h", ttc, band, target_speed);
    FollowingCommand { target_speed, ttc, band }
}
