//! Navigation tables.
//!
//! Every threshold the state machine uses lives here so the two arena
//! challenges share one state machine. [`NavConfig::obstacle`] and
//! [`NavConfig::open`] are the presets.

use serde::{Deserialize, Serialize};

use crate::control::PidConfig;
use crate::core::RotationDirection;

use super::lane::Lane;

/// A value per lap direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerRotation<T> {
    pub clockwise: T,
    pub counter_clockwise: T,
}

impl<T> PerRotation<T> {
    pub fn new(clockwise: T, counter_clockwise: T) -> Self {
        Self {
            clockwise,
            counter_clockwise,
        }
    }

    pub fn get(&self, rotation: RotationDirection) -> &T {
        match rotation {
            RotationDirection::Clockwise => &self.clockwise,
            RotationDirection::CounterClockwise => &self.counter_clockwise,
        }
    }
}

impl<T: Clone> PerRotation<T> {
    /// Same value for both directions.
    pub fn both(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}

/// How a run begins once the lap direction is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// Drive out of the parking lot first
    Unpark,
    /// Start lapping immediately
    Drive,
}

/// How a run ends after the final turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishMode {
    /// Approach, find and enter the parking lot
    Park,
    /// Keep driving and stop once the front wall is close enough
    StopAhead { front_distance: f32, delay_ms: u64 },
}

/// One distance per lane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneTable {
    pub base: f32,
    pub outer1: f32,
    pub outer2: f32,
    pub inner1: f32,
    pub inner2: f32,
}

impl LaneTable {
    /// Same distance for every lane.
    pub const fn uniform(distance: f32) -> Self {
        Self {
            base: distance,
            outer1: distance,
            outer2: distance,
            inner1: distance,
            inner2: distance,
        }
    }

    /// Distance for a lane, `base` when no lane applies.
    pub fn get(&self, lane: Option<Lane>) -> f32 {
        match lane {
            None => self.base,
            Some(Lane::Outer1) => self.outer1,
            Some(Lane::Outer2) => self.outer2,
            Some(Lane::Inner1) => self.inner1,
            Some(Lane::Inner2) => self.inner2,
        }
    }
}

/// Forward speeds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub base: f32,
    /// Speed on the laps where the robot pushes
    pub push: f32,
}

/// Turn counts at which the robot drives faster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushRules {
    /// NORMAL pushes from this turn count on
    pub normal_from: u32,
    /// PRE_TURN and TURNING push on turn counts in `turn_from..turn_until`
    pub turn_from: u32,
    pub turn_until: u32,
}

impl PushRules {
    pub fn normal(&self, turn_count: u32) -> bool {
        turn_count >= self.normal_from
    }

    pub fn turning(&self, turn_count: u32) -> bool {
        (self.turn_from..self.turn_until).contains(&turn_count)
    }
}

/// Corner handling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnConfig {
    /// NORMAL hands over to PRE_TURN at this front distance (meters)
    pub pre_turn_distance: f32,
    pub cooldown_ms: u64,
    pub push_cooldown_ms: u64,
    /// Turn is complete within this heading error (degrees)
    pub heading_tolerance: f32,
    /// Front distance that starts the turn, per lane of the next segment
    pub trigger: LaneTable,
    pub push_trigger: LaneTable,
    /// Turn trigger on the final approach to the parking lot
    pub final_approach: PerRotation<f32>,
}

/// Half-open front-distance interval `(near, far]` in which a marker slot
/// is targeted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetBand {
    pub near: f32,
    pub far: f32,
}

impl TargetBand {
    pub const fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    #[inline]
    pub fn contains(&self, distance: f32) -> bool {
        distance > self.near && distance <= self.far
    }
}

/// Marker-driven lane selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Target outer-wall distance per lane (meters)
    pub offsets: LaneTable,
    /// Front-distance bands for the first, second and third slot in travel
    /// order; later bands take precedence
    pub bands: [TargetBand; 3],
    /// Lane forced on the first segment
    pub first_segment: Option<Lane>,
    /// Segment length used to derive front distance from the back wall
    pub arena_length: f32,
}

/// PID gains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PidSettings {
    pub heading: PidConfig,
    pub wall: PidConfig,
    /// Wall gain while hugging the outer wall closely
    pub boosted_wall_kp: f32,
    /// Heading gain during U-turn rotations
    pub boosted_heading_kp: f32,
}

/// Optional stop-and-reverse phase between the approach and the parking
/// search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealignConfig {
    pub stop_ms: u64,
    pub reverse_until_ms: u64,
    pub settle_ms: u64,
    pub reverse_speed: f32,
    pub target_offset: f32,
}

/// Final straight before the parking search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApproachConfig {
    pub speed: f32,
    pub target_offset: f32,
    pub front_distance: f32,
    pub delay_ms: u64,
    pub realign: Option<RealignConfig>,
}

/// U-turn that reverses the lap direction before parking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UturnConfig {
    pub speed: f32,
    pub target_offset: f32,
    pub front_distance: f32,
    pub delay_ms: u64,
    pub heading_tolerance: f32,
    /// The U-turn completes when the heading enters `[start, end]`
    pub exit_window: [f32; 2],
}

/// Parking-wall trigger of the parking search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParkingWallRule {
    /// Parking walls farther than this are ignored (meters)
    pub max_distance: f32,
    /// Bearing window `[start, end)` meaning "behind the robot"
    pub behind_window: [f32; 2],
    /// How far behind the wall end must be (meters)
    pub target_distance: f32,
}

/// Slow search for the parking lot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FindParkingConfig {
    pub speed: f32,
    pub target_offset: f32,
    pub wall_rule: Option<ParkingWallRule>,
    /// Front distance that also starts parking (meters)
    pub front_fallback: Option<f32>,
}

/// One open-loop parking move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParkingStep {
    pub speed: f32,
    /// Steering for a clockwise lap; mirrored for counter-clockwise
    pub steering: f32,
    /// Signed encoder travel that ends the move (degrees)
    pub encoder_target: f32,
}

/// Parking choreography.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParkingConfig {
    /// Neutral output until this phase time
    pub neutral_ms: u64,
    /// Steering snapped with zero speed until this phase time
    pub snap_ms: u64,
    pub steps: [ParkingStep; 3],
}

/// One open-loop unparking move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnparkStep {
    pub steering: f32,
    /// Encoder travel that ends the move (degrees)
    pub encoder_travel: f32,
}

/// Unparking choreography.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnparkConfig {
    pub speed: f32,
    pub steps: Vec<UnparkStep>,
}

/// Complete navigation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub start: StartMode,
    pub finish: FinishMode,
    pub use_markers: bool,
    pub final_turn_count: u32,
    pub pid: PidSettings,
    pub speed: SpeedProfile,
    pub push: Option<PushRules>,
    pub turn: TurnConfig,
    pub lanes: LaneConfig,
    pub approach: PerRotation<ApproachConfig>,
    pub uturn: PerRotation<UturnConfig>,
    pub find_parking: PerRotation<FindParkingConfig>,
    pub parking: ParkingConfig,
    pub unpark: PerRotation<UnparkConfig>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self::obstacle()
    }
}

impl NavConfig {
    /// Obstacle challenge: markers, unpark at the start, park at the end.
    pub fn obstacle() -> Self {
        Self {
            start: StartMode::Unpark,
            finish: FinishMode::Park,
            use_markers: true,
            final_turn_count: 12,
            pid: PidSettings {
                heading: PidConfig::new(3.0, 0.0, 0.0, 100.0),
                wall: PidConfig::new(180.0, 0.0, 0.0, 90.0),
                boosted_wall_kp: 300.0,
                boosted_heading_kp: 6.0,
            },
            speed: SpeedProfile {
                base: 3.0,
                push: 4.5,
            },
            push: Some(PushRules {
                normal_from: 5,
                turn_from: 4,
                turn_until: 11,
            }),
            turn: TurnConfig {
                pre_turn_distance: 1.20,
                cooldown_ms: 4000,
                push_cooldown_ms: 2000,
                heading_tolerance: 30.0,
                trigger: LaneTable {
                    base: 0.78,
                    outer1: 0.67,
                    outer2: 0.50,
                    inner1: 0.97,
                    inner2: 1.07,
                },
                push_trigger: LaneTable {
                    base: 0.89,
                    outer1: 0.76,
                    outer2: 0.59,
                    inner1: 1.06,
                    inner2: 1.16,
                },
                final_approach: PerRotation::new(0.59, 0.60),
            },
            lanes: LaneConfig {
                offsets: LaneTable {
                    base: 0.50,
                    outer1: 0.43,
                    outer2: 0.25,
                    inner1: 0.62,
                    inner2: 0.76,
                },
                bands: [
                    TargetBand::new(2.00, 2.90),
                    TargetBand::new(1.50, 2.70),
                    TargetBand::new(1.00, 1.80),
                ],
                first_segment: Some(Lane::Outer1),
                arena_length: 3.0,
            },
            approach: PerRotation::new(
                ApproachConfig {
                    speed: 1.5,
                    target_offset: 0.31,
                    front_distance: 1.80,
                    delay_ms: 1000,
                    realign: None,
                },
                ApproachConfig {
                    speed: 3.0,
                    target_offset: 0.31,
                    front_distance: 1.20,
                    delay_ms: 500,
                    realign: None,
                },
            ),
            uturn: PerRotation::new(
                UturnConfig {
                    speed: 3.0,
                    target_offset: 0.75,
                    front_distance: 1.00,
                    delay_ms: 1000,
                    heading_tolerance: 40.0,
                    exit_window: [90.0, 190.0],
                },
                UturnConfig {
                    speed: 3.0,
                    target_offset: 0.75,
                    front_distance: 0.80,
                    delay_ms: 1000,
                    heading_tolerance: 40.0,
                    exit_window: [170.0, 270.0],
                },
            ),
            find_parking: PerRotation::new(
                FindParkingConfig {
                    speed: 1.0,
                    target_offset: 0.31,
                    wall_rule: Some(ParkingWallRule {
                        max_distance: 1.0,
                        behind_window: [180.0, 300.0],
                        target_distance: 0.40,
                    }),
                    front_fallback: Some(1.565),
                },
                FindParkingConfig {
                    speed: 1.0,
                    target_offset: 0.31,
                    wall_rule: Some(ParkingWallRule {
                        max_distance: 1.0,
                        behind_window: [240.0, 360.0],
                        target_distance: 0.47,
                    }),
                    front_fallback: Some(0.96),
                },
            ),
            parking: ParkingConfig {
                neutral_ms: 300,
                snap_ms: 600,
                steps: [
                    ParkingStep {
                        speed: -1.0,
                        steering: -100.0,
                        encoder_target: -460.0,
                    },
                    ParkingStep {
                        speed: -1.0,
                        steering: 100.0,
                        encoder_target: -380.0,
                    },
                    ParkingStep {
                        speed: 1.0,
                        steering: -100.0,
                        encoder_target: 80.0,
                    },
                ],
            },
            unpark: PerRotation::new(
                UnparkConfig {
                    speed: 1.5,
                    steps: vec![
                        UnparkStep {
                            steering: 100.0,
                            encoder_travel: 450.0,
                        },
                        UnparkStep {
                            steering: -100.0,
                            encoder_travel: 350.0,
                        },
                    ],
                },
                UnparkConfig {
                    speed: 1.5,
                    steps: vec![
                        UnparkStep {
                            steering: -100.0,
                            encoder_travel: 400.0,
                        },
                        UnparkStep {
                            steering: 100.0,
                            encoder_travel: 270.0,
                        },
                        UnparkStep {
                            steering: -100.0,
                            encoder_travel: 80.0,
                        },
                        UnparkStep {
                            steering: 0.0,
                            encoder_travel: 100.0,
                        },
                    ],
                },
            ),
        }
    }

    /// Open challenge: three laps without markers, stop in the start section.
    pub fn open() -> Self {
        let obstacle = Self::obstacle();
        Self {
            start: StartMode::Drive,
            finish: FinishMode::StopAhead {
                front_distance: 1.80,
                delay_ms: 100,
            },
            use_markers: false,
            speed: SpeedProfile {
                base: 4.5,
                push: 4.5,
            },
            push: None,
            turn: TurnConfig {
                pre_turn_distance: 1.20,
                cooldown_ms: 1500,
                push_cooldown_ms: 1500,
                heading_tolerance: 20.0,
                trigger: LaneTable::uniform(0.65),
                push_trigger: LaneTable::uniform(0.65),
                final_approach: PerRotation::both(0.65),
            },
            lanes: LaneConfig {
                offsets: LaneTable::uniform(0.30),
                first_segment: None,
                ..obstacle.lanes.clone()
            },
            ..obstacle
        }
    }

    /// Whether NORMAL pushes at this turn count.
    pub fn push_normal(&self, turn_count: u32) -> bool {
        self.push.is_some_and(|p| p.normal(turn_count))
    }

    /// Whether PRE_TURN and TURNING push at this turn count.
    pub fn push_turning(&self, turn_count: u32) -> bool {
        self.push.is_some_and(|p| p.turning(turn_count))
    }

    /// Sanity checks for loaded files.
    pub fn validate(&self) -> Result<(), String> {
        if self.final_turn_count == 0 {
            return Err("final_turn_count must be positive".into());
        }
        if self.turn.heading_tolerance <= 0.0 || self.turn.heading_tolerance >= 90.0 {
            return Err(format!(
                "turn heading tolerance {} outside (0, 90)",
                self.turn.heading_tolerance
            ));
        }
        if self.parking.neutral_ms > self.parking.snap_ms {
            return Err("parking neutral phase ends after the steering snap".into());
        }
        for band in &self.lanes.bands {
            if band.near >= band.far {
                return Err(format!("empty target band ({}, {}]", band.near, band.far));
            }
        }
        Ok(())
    }
}
