use serde::{Deserialize, Serialize};

use super::plan::ManeuverPlan;

/// Low-level actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VehicleControl {
    /// 0.0..=1.0
    pub throttle: f64,
    /// -1.0..=1.0, positive steers left
    pub steer: f64,
    /// 0.0..=1.0
    pub brake: f64,
    pub hand_brake: bool,
}

impl VehicleControl {
    /// Full stop keeping the current steering angle so the car stays in lane during turns.
    pub fn emergency_stop(steer: f64, max_brake: f64) -> Self {
        Self { throttle: 0.0, steer, brake: max_brake, hand_brake: false }
    }
}

/// Outcome of one arbitration tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BehaviorState {
    EmergencyStop,
    FollowVehicle,
    HandleIntersection,
    AvoidStaticObstacle,
    Cruise,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 5] = [
        BehaviorState::EmergencyStop,
        BehaviorState::FollowVehicle,
        BehaviorState::HandleIntersection,
        BehaviorState::AvoidStaticObstacle,
        BehaviorState::Cruise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorState::EmergencyStop => "EMERGENCY_STOP",
            BehaviorState::FollowVehicle => "FOLLOW_VEHICLE",
            BehaviorState::HandleIntersection => "HANDLE_INTERSECTION",
            BehaviorState::AvoidStaticObstacle => "AVOID_STATIC_OBSTACLE",
            BehaviorState::Cruise => "CRUISE",
        }
    }
}

/// The single output of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlIntent {
    pub state: BehaviorState,
    /// km/h
    pub target_speed: f64,
    /// Set only on the tick a new plan replaced the active route
    pub maneuver_plan: Option<ManeuverPlan>,
    pub emergency_stop: bool,
}

impl ControlIntent {
    pub fn stop() -> Self {
        Self {
            state: BehaviorState::EmergencyStop,
            target_speed: 0.0,
            maneuver_plan: None,
            emergency_stop: true,
        }
    }

    pub fn drive(state: BehaviorState, target_speed: f64) -> Self {
        Self { state, target_speed, maneuver_plan: None, emergency_stop: false }
    }

    pub fn with_plan(mut self, plan: Option<ManeuverPlan>) -> Self {
        self.maneuver_plan = plan;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_stop_keeps_steering() {
        let control = VehicleControl::emergency_stop(-0.2, 0.5);
        assert_eq!(control.throttle, 0.0);
        assert_eq!(control.brake, 0.5);
        assert_eq!(control.steer, -0.2);
        assert!(!control.hand_brake);
    }

    #[test]
    fn test_state_serializes_screaming_case() {
        let json = serde_json::to_string(&BehaviorState::AvoidStaticObstacle).unwrap();
        assert_eq!(json, "\"AVOID_STATIC_OBSTACLE\"");
        for state in BehaviorState::ALL {
            assert_eq!(serde_json::to_string(&state).unwrap(), format!("\"{}\"", state.as_str()));
        }
    }
}
