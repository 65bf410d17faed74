//! Navigation states, run memory and actuator commands.

use std::fmt;

use crate::core::{Direction, RotationDirection};

/// Phase of the direction-reversing U-turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UturnPhase {
    /// Driving toward the trigger wall
    Approach,
    /// First 90° rotation
    FirstTurn,
    /// Second 90° rotation
    SecondTurn,
}

/// Parking move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParkingPhase {
    First,
    Second,
    Third,
}

impl ParkingPhase {
    pub fn index(self) -> usize {
        match self {
            ParkingPhase::First => 0,
            ParkingPhase::Second => 1,
            ParkingPhase::Third => 2,
        }
    }

    /// Following move, `None` after the last.
    pub fn next(self) -> Option<Self> {
        match self {
            ParkingPhase::First => Some(ParkingPhase::Second),
            ParkingPhase::Second => Some(ParkingPhase::Third),
            ParkingPhase::Third => None,
        }
    }
}

/// Navigation state.
///
/// Data-free apart from the phase, so a state doubles as the key of its
/// timer in the run context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavState {
    /// Open-loop unparking move `step`
    Unpark { step: usize },
    /// Wall following along a segment
    Normal,
    /// Corner ahead, waiting for the turn trigger distance
    PreTurn,
    /// Rotating to the next cardinal direction
    Turning,
    /// Laps done, waiting to stop in front of a wall
    PreStop,
    /// Final straight toward the parking lot
    Approach,
    /// Stop and reverse before the parking search
    Realign,
    /// Lap direction reversal
    Uturn(UturnPhase),
    /// Creeping along the outer wall looking for the lot
    FindParking,
    /// Open-loop parking move
    Parking(ParkingPhase),
    /// Terminal
    Stop,
}

impl NavState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NavState::Stop)
    }

    /// States whose output must reach the actuator before anything else
    /// is evaluated.
    pub fn settles_before_next(&self) -> bool {
        matches!(self, NavState::Stop | NavState::Parking(_))
    }

    /// Open-loop states that drive the actuators directly.
    pub fn is_open_loop(&self) -> bool {
        matches!(
            self,
            NavState::Unpark { .. } | NavState::Parking(_) | NavState::Stop
        )
    }

    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            NavState::Unpark { .. } => "UNPARK",
            NavState::Normal => "NORMAL",
            NavState::PreTurn => "PRE_TURN",
            NavState::Turning => "TURNING",
            NavState::PreStop => "PRE_STOP",
            NavState::Approach => "APPROACH",
            NavState::Realign => "REALIGN",
            NavState::Uturn(UturnPhase::Approach) => "UTURN_APPROACH",
            NavState::Uturn(UturnPhase::FirstTurn) => "UTURN_1",
            NavState::Uturn(UturnPhase::SecondTurn) => "UTURN_2",
            NavState::FindParking => "FIND_PARKING",
            NavState::Parking(ParkingPhase::First) => "PARKING_1",
            NavState::Parking(ParkingPhase::Second) => "PARKING_2",
            NavState::Parking(ParkingPhase::Third) => "PARKING_3",
            NavState::Stop => "STOP",
        }
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavState::Unpark { step } => write!(f, "UNPARK_{}", step + 1),
            other => f.write_str(other.name()),
        }
    }
}

/// Everything the state machine remembers between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Navigation {
    pub state: NavState,
    /// Lap direction; flipped only by a U-turn
    pub rotation: RotationDirection,
    /// Intended cardinal direction
    pub direction: Direction,
    /// Completed 90° turns
    pub turn_count: u32,
    /// Target distance to the outer wall (meters)
    pub target_offset: f32,
    /// Time of the last NORMAL to PRE_TURN hand-over
    pub last_pre_turn_ms: Option<u64>,
    /// Current segment had no committed marker; hug the wall harder
    pub unmarked_segment: bool,
    /// Encoder reading when the drive of the current parking move began
    pub drive_origin_deg: Option<f32>,
}

impl Navigation {
    pub fn new(state: NavState, rotation: RotationDirection, target_offset: f32) -> Self {
        Self {
            state,
            rotation,
            direction: Direction::North,
            turn_count: 0,
            target_offset,
            last_pre_turn_ms: None,
            unmarked_segment: false,
            drive_origin_deg: None,
        }
    }

    /// Same memory in another state.
    pub fn to(&self, state: NavState) -> Self {
        Self {
            state,
            drive_origin_deg: None,
            ..self.clone()
        }
    }

    /// Wall following runs outside of rotations.
    pub fn wall_following(&self) -> bool {
        !matches!(
            self.state,
            NavState::Turning
                | NavState::Uturn(UturnPhase::FirstTurn)
                | NavState::Uturn(UturnPhase::SecondTurn)
        )
    }

    /// States that hold the outer wall tightly.
    pub fn wall_boosted(&self) -> bool {
        match self.state {
            NavState::Approach | NavState::FindParking => true,
            NavState::Normal => self.unmarked_segment,
            _ => false,
        }
    }

    /// U-turn rotations steer harder.
    pub fn heading_boosted(&self) -> bool {
        matches!(
            self.state,
            NavState::Uturn(UturnPhase::FirstTurn) | NavState::Uturn(UturnPhase::SecondTurn)
        )
    }
}

/// Steering source for a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Steering {
    /// Heading and wall controllers
    Law,
    /// Fixed steering percent
    Fixed(f32),
}

/// Actuator command produced by one state evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Command {
    pub motor_speed: f32,
    pub steering: Steering,
}

impl Command {
    /// Zero speed, centered steering.
    pub const HALT: Command = Command {
        motor_speed: 0.0,
        steering: Steering::Fixed(0.0),
    };

    /// Closed-loop driving at `motor_speed`.
    pub fn drive(motor_speed: f32) -> Self {
        Self {
            motor_speed,
            steering: Steering::Law,
        }
    }

    /// Open-loop output.
    pub fn fixed(motor_speed: f32, steering: f32) -> Self {
        Self {
            motor_speed,
            steering: Steering::Fixed(steering),
        }
    }
}
