//! Pathik - run the control loop against the simulated arena
//!
//! ```text
//! pathik --challenge obstacle --lap ccw --markers --duration-secs 90
//! ```
//!
//! Ctrl-C stops the run: the controller enters STOP on the next tick and the
//! drive train is left at neutral.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use log::{error, info, trace, warn};

use pathik::config::{Challenge, PathikConfig};
use pathik::core::{Clock, MarkerColor, RotationDirection};
use pathik::error::{Error, Result};
use pathik::io::{BinaryLogger, LogSink, NullLogger};
use pathik::navigation::RunContext;
use pathik::robot::{Collaborators, Robot, SensorBuffers, TickOutcome};
use pathik::sim::{Arena, GroundTruthFilter, SimActuator, SimConfig, SimProducers, SimWorld};

/// Lap direction of the simulated start pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Lap {
    Cw,
    Ccw,
}

impl From<Lap> for RotationDirection {
    fn from(lap: Lap) -> Self {
        match lap {
            Lap::Cw => RotationDirection::Clockwise,
            Lap::Ccw => RotationDirection::CounterClockwise,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pathik", version, about = "Arena robot control loop on a simulated arena")]
struct Args {
    /// Configuration file (defaults to configs/pathik.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Challenge preset; overrides the navigation tables of the config file
    #[arg(long, value_enum)]
    challenge: Option<Challenge>,

    /// Lap direction of the simulated start
    #[arg(long, value_enum, default_value = "cw")]
    lap: Lap,

    /// Place the demo marker layout in the arena
    #[arg(long)]
    markers: bool,

    /// Abort the run after this many seconds
    #[arg(long, default_value_t = 180.0)]
    duration_secs: f32,

    /// Write binary tick records into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Simulation noise seed (0 = random)
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PathikConfig::load(path)?,
        None => PathikConfig::load_default()?,
    };
    if let Some(challenge) = args.challenge {
        config.apply_challenge(challenge);
    }
    if args.log_dir.is_some() {
        config.runtime.log_dir = args.log_dir.clone();
    }
    config.validate()?;

    info!(
        "Pathik v{} starting: {:?} start, {} turns, tick {} ms",
        env!("CARGO_PKG_VERSION"),
        config.navigation.start,
        config.navigation.final_turn_count,
        config.runtime.tick_period_ms
    );

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        handler_stop.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;
    let mut ctx = RunContext::with_stop_flag(Arc::clone(&stop));

    let arena = demo_arena(args.markers);
    let start = arena.start_pose(args.lap.into());
    let sim = SimConfig {
        seed: args.seed,
        ..Default::default()
    };
    let world = SimWorld::new(arena, start, sim).shared();

    let clock = Clock::new();
    let buffers = SensorBuffers::from_config(&config.runtime);
    let producers_stop = Arc::new(AtomicBool::new(false));
    let producers = SimProducers::spawn(
        Arc::clone(&world),
        &buffers,
        clock,
        Arc::clone(&producers_stop),
    )?;

    let logger: Box<dyn LogSink> = match &config.runtime.log_dir {
        Some(dir) => {
            let logger = BinaryLogger::in_dir(dir)?;
            info!("Logging ticks to {}", logger.path().display());
            Box::new(logger)
        }
        None => Box::new(NullLogger),
    };
    let collaborators = Collaborators {
        actuator: Box::new(SimActuator::new(Arc::clone(&world))),
        color_filter: Box::new(GroundTruthFilter::new(Arc::clone(&world))),
        logger,
    };
    let mut robot = Robot::new(&config, buffers, clock, collaborators);

    let period = Duration::from_millis(config.runtime.tick_period_ms);
    let limit = Duration::from_secs_f32(args.duration_secs.max(0.0));
    let result = drive(&mut robot, &mut ctx, period, limit);

    // Neutral output whatever happened above
    if let Err(e) = robot.halt() {
        warn!("Failed to halt drive train: {}", e);
    }
    producers_stop.store(true, Ordering::Relaxed);
    producers.join();

    let pose = world.lock().pose();
    info!(
        "Final pose ({:.2}, {:.2}) heading {:.1}°, {} markers committed",
        pose.position.x,
        pose.position.y,
        pose.heading,
        robot.fusion().map().len()
    );
    result
}

/// Tick until the controller terminates, the time limit passes or a stop is
/// requested before the controller started.
fn drive(
    robot: &mut Robot,
    ctx: &mut RunContext,
    period: Duration,
    limit: Duration,
) -> Result<()> {
    let started = Instant::now();
    let mut last = started;

    loop {
        let tick_start = Instant::now();
        let dt = tick_start.duration_since(last).as_secs_f32();
        last = tick_start;

        let outcome = robot.update(dt, ctx)?;
        match outcome {
            TickOutcome::Drove(out) if out.terminated => {
                info!("Run complete in {:.1} s", started.elapsed().as_secs_f32());
                return Ok(());
            }
            TickOutcome::Drove(out) => trace!(
                "{} speed {:.1} steering {:.1}",
                out.state, out.motor_speed, out.steering
            ),
            TickOutcome::Waiting | TickOutcome::Calibrating => {
                if ctx.stop_requested() {
                    info!("Stopped before the run started");
                    return Ok(());
                }
            }
        }

        if started.elapsed() >= limit {
            warn!("Time limit of {:.0} s reached", limit.as_secs_f32());
            return Ok(());
        }

        std::thread::sleep(period.saturating_sub(tick_start.elapsed()));
    }
}

/// Standard arena, optionally with a marker pair in each straight.
fn demo_arena(markers: bool) -> Arena {
    let arena = Arena::standard();
    if !markers {
        return arena;
    }
    arena
        .with_marker(0.70, 1.50, MarkerColor::Red)
        .with_marker(1.50, 2.30, MarkerColor::Green)
        .with_marker(2.30, 1.50, MarkerColor::Red)
        .with_marker(1.50, 0.30, MarkerColor::Green)
}
