//! State transition function.
//!
//! [`step`] evaluates the current state once against one tick of inputs. It
//! never touches the actuators or the controllers: it returns the next run
//! memory, the command for this evaluation and whether the next state should
//! be evaluated again within the same tick.

use crate::core::math::in_arc;
use crate::core::{Point2D, Segment, SegmentLocation};
use crate::fusion::{ClassifiedMarker, MarkerMap};
use crate::geometry::{LineSegment, ResolvedWalls};

use super::config::{FinishMode, NavConfig, ParkingWallRule};
use super::context::RunContext;
use super::lane::{inner_color, lane_for, outer_color};
use super::state::{Command, NavState, Navigation, ParkingPhase, UturnPhase};
use super::steering::heading_error;

/// Everything a state evaluation may look at.
#[derive(Clone, Copy, Debug)]
pub struct TickInputs<'a> {
    /// Monotonic time (milliseconds)
    pub now_ms: u64,
    /// Heading relative to the start heading, `[0, 360)` clockwise
    pub heading: f32,
    /// Accumulated wheel encoder angle (degrees)
    pub encoder_deg: f32,
    pub walls: ResolvedWalls,
    pub parking_walls: &'a [LineSegment],
    pub markers: &'a MarkerMap,
}

impl TickInputs<'_> {
    /// Distance to the visible front wall.
    pub fn front_wall(&self) -> Option<f32> {
        self.walls.front_distance()
    }

    /// Front distance, derived from the back wall when the front is hidden.
    pub fn front_or_back(&self, arena_length: f32) -> Option<f32> {
        self.front_wall().or_else(|| {
            self.walls
                .back
                .map(|w| arena_length - w.perpendicular_distance(Point2D::ZERO))
        })
    }

    fn front_within(&self, distance: f32) -> bool {
        self.front_wall().is_some_and(|d| d <= distance)
    }
}

/// Outcome of one state evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub next: Navigation,
    pub command: Command,
    /// Evaluate `next` again before commanding the actuators
    pub instant: bool,
}

impl Step {
    fn stay(next: Navigation, command: Command) -> Self {
        Self {
            next,
            command,
            instant: false,
        }
    }

    /// Leave for `next.state`. States that must be seen by the actuator
    /// first end the tick with a neutral command.
    fn go(next: Navigation) -> Self {
        let instant = !next.state.settles_before_next();
        Self {
            next,
            command: Command::HALT,
            instant,
        }
    }
}

/// Evaluate the current state once.
pub fn step(
    nav: &Navigation,
    inputs: &TickInputs<'_>,
    ctx: &RunContext,
    config: &NavConfig,
) -> Step {
    let elapsed_ms = ctx.elapsed_ms(nav.state, inputs.now_ms).unwrap_or(0);
    let travel = ctx
        .encoder_travel(nav.state, inputs.encoder_deg)
        .unwrap_or(0.0);

    match nav.state {
        NavState::Unpark { step } => unpark(nav, step, travel, config),
        NavState::Normal => normal(nav, inputs, config),
        NavState::PreTurn => pre_turn(nav, inputs, config),
        NavState::Turning => turning(nav, inputs, config),
        NavState::PreStop => pre_stop(nav, inputs, elapsed_ms, config),
        NavState::Approach => approach(nav, inputs, elapsed_ms, config),
        NavState::Realign => realign(nav, elapsed_ms, config),
        NavState::Uturn(phase) => uturn(nav, phase, inputs, elapsed_ms, config),
        NavState::FindParking => find_parking(nav, inputs, config),
        NavState::Parking(phase) => parking(nav, phase, inputs, elapsed_ms, config),
        NavState::Stop => Step::stay(nav.clone(), Command::HALT),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lap
// ─────────────────────────────────────────────────────────────────────────────

fn unpark(nav: &Navigation, step: usize, travel: f32, config: &NavConfig) -> Step {
    let table = config.unpark.get(nav.rotation);
    let Some(current) = table.steps.get(step) else {
        return Step::go(nav.to(NavState::Normal));
    };

    if travel >= current.encoder_travel {
        let next = if step + 1 < table.steps.len() {
            NavState::Unpark { step: step + 1 }
        } else {
            NavState::Normal
        };
        return Step::go(nav.to(next));
    }

    Step::stay(nav.clone(), Command::fixed(table.speed, current.steering))
}

/// Committed markers of a segment, first slot in travel order first.
fn segment_markers<'m>(
    markers: &'m MarkerMap,
    segment: Segment,
    nav: &Navigation,
    config: &NavConfig,
) -> [Option<&'m ClassifiedMarker>; 3] {
    if !config.use_markers {
        return [None; 3];
    }
    SegmentLocation::in_travel_order(nav.rotation).map(|location| markers.at(segment, location))
}

fn normal(nav: &Navigation, inputs: &TickInputs<'_>, config: &NavConfig) -> Step {
    let push = config.push_normal(nav.turn_count);
    let (speed, cooldown_ms) = if push {
        (config.speed.push, config.turn.push_cooldown_ms)
    } else {
        (config.speed.base, config.turn.cooldown_ms)
    };

    let segment = Segment::from_direction(nav.direction);
    let slots = segment_markers(inputs.markers, segment, nav, config);

    if nav.turn_count >= config.final_turn_count {
        let next = match config.finish {
            FinishMode::Park => {
                if slots[0].is_some_and(|m| m.color == inner_color(nav.rotation)) {
                    NavState::Uturn(UturnPhase::Approach)
                } else {
                    NavState::Approach
                }
            }
            FinishMode::StopAhead { .. } => NavState::PreStop,
        };
        return Step::go(nav.to(next));
    }

    let mut next = nav.clone();
    if config.use_markers && slots.iter().all(Option::is_none) {
        next.unmarked_segment = true;
    }

    // Later bands win: the nearest slot in range is the one being passed.
    let lanes = &config.lanes;
    if let Some(front) = inputs.front_or_back(lanes.arena_length)
        && let Some(marker) = lanes
            .bands
            .iter()
            .zip(slots)
            .filter_map(|(band, slot)| slot.filter(|_| band.contains(front)))
            .last()
        && let Some(lane) = lane_for(marker.color, marker.side, nav.rotation)
    {
        next.target_offset = lanes.offsets.get(Some(lane));
    }

    if nav.turn_count == 0
        && let Some(lane) = lanes.first_segment
    {
        next.target_offset = lanes.offsets.get(Some(lane));
    }

    let cooldown_over = nav
        .last_pre_turn_ms
        .is_none_or(|t| inputs.now_ms.saturating_sub(t) >= cooldown_ms);
    if cooldown_over && inputs.front_within(config.turn.pre_turn_distance) {
        next.unmarked_segment = false;
        next.last_pre_turn_ms = Some(inputs.now_ms);
        return Step::go(next.to(NavState::PreTurn));
    }

    Step::stay(next, Command::drive(speed))
}

/// Front distance at which the corner turn starts.
///
/// Depends on the first committed marker of the next segment (the mid slot
/// stands in when the first is empty) and on whether this is the last turn
/// before the parking approach.
pub fn turn_trigger_distance(nav: &Navigation, markers: &MarkerMap, config: &NavConfig) -> f32 {
    let table = if config.push_turning(nav.turn_count) {
        &config.turn.push_trigger
    } else {
        &config.turn.trigger
    };
    let final_approach = matches!(config.finish, FinishMode::Park)
        && nav.turn_count + 1 == config.final_turn_count;
    let parking = *config.turn.final_approach.get(nav.rotation);

    if !config.use_markers {
        return if final_approach { parking } else { table.base };
    }

    let next_segment = Segment::from_direction(nav.direction.turned(nav.rotation));
    let first = markers
        .at(next_segment, SegmentLocation::first(nav.rotation))
        .map(|m| (m, false));
    let marker = first.or_else(|| markers.at(next_segment, SegmentLocation::B).map(|m| (m, true)));

    match marker {
        Some((_, true)) if final_approach => parking,
        Some((m, _)) if final_approach && m.color == outer_color(nav.rotation) => parking,
        Some((m, _)) => table.get(lane_for(m.color, m.side, nav.rotation)),
        None if final_approach => parking,
        None => table.base,
    }
}

fn pre_turn(nav: &Navigation, inputs: &TickInputs<'_>, config: &NavConfig) -> Step {
    let speed = if config.push_turning(nav.turn_count) {
        config.speed.push
    } else {
        config.speed.base
    };

    let distance = turn_trigger_distance(nav, inputs.markers, config);
    if inputs.front_within(distance) {
        let mut next = nav.to(NavState::Turning);
        next.direction = nav.direction.turned(nav.rotation);
        return Step::go(next);
    }

    Step::stay(nav.clone(), Command::drive(speed))
}

fn turning(nav: &Navigation, inputs: &TickInputs<'_>, config: &NavConfig) -> Step {
    let speed = if config.push_turning(nav.turn_count) {
        config.speed.push
    } else {
        config.speed.base
    };

    let mut next = nav.clone();
    next.target_offset = config.lanes.offsets.base;

    let error = heading_error(nav.direction.to_heading(), inputs.heading);
    if error.abs() <= config.turn.heading_tolerance {
        next.turn_count += 1;
        return Step::go(next.to(NavState::Normal));
    }

    Step::stay(next, Command::drive(speed))
}

fn pre_stop(
    nav: &Navigation,
    inputs: &TickInputs<'_>,
    elapsed_ms: u64,
    config: &NavConfig,
) -> Step {
    let FinishMode::StopAhead {
        front_distance,
        delay_ms,
    } = config.finish
    else {
        return Step::go(nav.to(NavState::Stop));
    };

    if elapsed_ms >= delay_ms && inputs.front_within(front_distance) {
        return Step::go(nav.to(NavState::Stop));
    }
    Step::stay(nav.clone(), Command::drive(config.speed.base))
}

// ─────────────────────────────────────────────────────────────────────────────
// Parking approach
// ─────────────────────────────────────────────────────────────────────────────

fn approach(
    nav: &Navigation,
    inputs: &TickInputs<'_>,
    elapsed_ms: u64,
    config: &NavConfig,
) -> Step {
    let cfg = config.approach.get(nav.rotation);
    let mut next = nav.clone();
    next.target_offset = cfg.target_offset;

    if elapsed_ms >= cfg.delay_ms && inputs.front_within(cfg.front_distance) {
        let to = if cfg.realign.is_some() {
            NavState::Realign
        } else {
            NavState::FindParking
        };
        return Step::go(next.to(to));
    }

    Step::stay(next, Command::drive(cfg.speed))
}

fn realign(nav: &Navigation, elapsed_ms: u64, config: &NavConfig) -> Step {
    let Some(cfg) = &config.approach.get(nav.rotation).realign else {
        return Step::go(nav.to(NavState::FindParking));
    };

    if elapsed_ms < cfg.stop_ms {
        Step::stay(nav.clone(), Command::HALT)
    } else if elapsed_ms < cfg.reverse_until_ms {
        let mut next = nav.clone();
        next.target_offset = cfg.target_offset;
        Step::stay(next, Command::drive(cfg.reverse_speed))
    } else if elapsed_ms >= cfg.reverse_until_ms + cfg.settle_ms {
        Step::go(nav.to(NavState::FindParking))
    } else {
        Step::stay(nav.clone(), Command::HALT)
    }
}

fn uturn(
    nav: &Navigation,
    phase: UturnPhase,
    inputs: &TickInputs<'_>,
    elapsed_ms: u64,
    config: &NavConfig,
) -> Step {
    let cfg = config.uturn.get(nav.rotation);
    // The U-turn rotates against the lap direction
    let reverse = nav.rotation.flipped();

    match phase {
        UturnPhase::Approach => {
            let mut next = nav.clone();
            next.target_offset = cfg.target_offset;
            if elapsed_ms >= cfg.delay_ms && inputs.front_within(cfg.front_distance) {
                next.direction = nav.direction.turned(reverse);
                return Step::go(next.to(NavState::Uturn(UturnPhase::FirstTurn)));
            }
            Step::stay(next, Command::drive(cfg.speed))
        }
        UturnPhase::FirstTurn => {
            let error = heading_error(nav.direction.to_heading(), inputs.heading);
            if error.abs() <= cfg.heading_tolerance {
                let mut next = nav.to(NavState::Uturn(UturnPhase::SecondTurn));
                next.direction = nav.direction.turned(reverse);
                return Step::go(next);
            }
            Step::stay(nav.clone(), Command::drive(cfg.speed))
        }
        UturnPhase::SecondTurn => {
            let [start, end] = cfg.exit_window;
            if inputs.heading >= start && inputs.heading <= end {
                let mut next = nav.to(NavState::Approach);
                next.rotation = reverse;
                return Step::go(next);
            }
            Step::stay(nav.clone(), Command::drive(cfg.speed))
        }
    }
}

/// Parking wall to track, `None` when none is close enough.
///
/// Walls are split by perpendicular bearing into ahead (`[0, 180)`) and
/// behind. With walls on both sides the closest behind is the lot's near
/// end; with only walls ahead the closest of those; with only walls behind
/// the farthest, which is the lot's far end.
pub fn select_parking_wall(walls: &[LineSegment], max_distance: f32) -> Option<LineSegment> {
    let dist = |w: &LineSegment| w.perpendicular_distance(Point2D::ZERO);
    let (ahead, behind): (Vec<LineSegment>, Vec<LineSegment>) = walls
        .iter()
        .copied()
        .filter(|w| dist(w) < max_distance)
        .partition(|w| in_arc(w.perpendicular_bearing(Point2D::ZERO), 0.0, 180.0));

    let closest = |set: &[LineSegment]| set.iter().copied().min_by(|a, b| dist(a).total_cmp(&dist(b)));

    match (ahead.is_empty(), behind.is_empty()) {
        (false, false) => closest(&behind),
        (false, true) => closest(&ahead),
        (true, false) => behind.iter().copied().max_by(|a, b| dist(a).total_cmp(&dist(b))),
        (true, true) => None,
    }
}

fn parking_wall_reached(walls: &[LineSegment], rule: &ParkingWallRule) -> bool {
    let Some(wall) = select_parking_wall(walls, rule.max_distance) else {
        return false;
    };
    let [start, end] = rule.behind_window;
    let behind = in_arc(wall.perpendicular_bearing(Point2D::ZERO), start, end);
    behind && -wall.p2().y >= rule.target_distance
}

fn find_parking(nav: &Navigation, inputs: &TickInputs<'_>, config: &NavConfig) -> Step {
    let cfg = config.find_parking.get(nav.rotation);
    let mut next = nav.clone();
    next.target_offset = cfg.target_offset;

    let by_wall = cfg
        .wall_rule
        .as_ref()
        .is_some_and(|rule| parking_wall_reached(inputs.parking_walls, rule));
    let by_front = cfg.front_fallback.is_some_and(|d| inputs.front_within(d));
    if by_wall || by_front {
        return Step::go(next.to(NavState::Parking(ParkingPhase::First)));
    }

    Step::stay(next, Command::drive(cfg.speed))
}

fn parking(
    nav: &Navigation,
    phase: ParkingPhase,
    inputs: &TickInputs<'_>,
    elapsed_ms: u64,
    config: &NavConfig,
) -> Step {
    let cfg = &config.parking;
    let step = cfg.steps[phase.index()];
    // Steering is tabled for a clockwise lap
    let steering = step.steering * nav.rotation.turn_sign();

    if elapsed_ms < cfg.neutral_ms {
        return Step::stay(nav.clone(), Command::HALT);
    }
    if elapsed_ms < cfg.snap_ms {
        return Step::stay(nav.clone(), Command::fixed(0.0, steering));
    }

    // Travel counts from the first drive tick, not from entry
    let mut next = nav.clone();
    let origin = *next.drive_origin_deg.get_or_insert(inputs.encoder_deg);
    let travel = inputs.encoder_deg - origin;

    let done = if step.encoder_target < 0.0 {
        travel <= step.encoder_target
    } else {
        travel >= step.encoder_target
    };
    if done {
        let to = phase.next().map_or(NavState::Stop, NavState::Parking);
        return Step::go(nav.to(to));
    }

    Step::stay(next, Command::fixed(step.speed, steering))
}
