//! Headless Simulation Runner
//!
//! Plays an island, a heist shift or a sea voyage from a seed with a simple
//! scripted policy and prints the event counts and outcome.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plunder::core::config::SimulationConfig;
use plunder::core::error::PlunderError;
use plunder::core::types::{seeded_rng, TilePos, Vec2};
use plunder::generation::{generate_building, generate_island, MAX_DIFFICULTY};
use plunder::player::{Broadside, HelmIntent, Player, PlayerIntent, PlayerShip};
use plunder::simulation::{EventTally, HeistLoadout, HeistSim, IslandSim, SeaOutcome, SeaSim};
use plunder::spatial::geometry::wrap_angle;
use serde::Serialize;

/// Headless Simulation Runner - scripted playthroughs for tuning
#[derive(Parser, Debug)]
#[command(name = "headless_sim")]
#[command(about = "Run a level from a seed with a scripted policy and report what happened")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Random seed for deterministic runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// TOML file overriding the default tunables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, global = true, default_value = "json")]
    format: String,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Fight across a generated island toward the treasure
    Island {
        #[arg(long, default_value_t = 1)]
        difficulty: u32,

        /// Put a boss at the treasure
        #[arg(long)]
        boss: bool,

        /// Maximum 60 Hz steps before giving up
        #[arg(long, default_value_t = 10_000)]
        steps: u64,
    },
    /// Defend a generated building for one shift
    Heist {
        #[arg(long, default_value_t = 1)]
        shift: u32,

        /// Maximum turns before giving up
        #[arg(long, default_value_t = 500)]
        turns: u32,
    },
    /// Sail the open sea, landing on every island in turn
    Sea {
        #[arg(long, default_value_t = 1)]
        difficulty: u32,

        #[arg(long, default_value_t = 20_000)]
        steps: u64,
    },
}

/// JSON output structure
#[derive(Serialize)]
struct Summary {
    mode: &'static str,
    seed: u64,
    outcome: String,
    steps: u64,
    events: EventTally,
}

const DT: f32 = 1.0 / 60.0;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "plunder=debug" } else { "plunder=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let summary = match run(&args, seed) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match args.format.as_str() {
        "text" => print_text(&summary),
        "json" => print_json(&summary),
        other => {
            eprintln!("Unknown format '{other}', defaulting to json");
            print_json(&summary);
        }
    }
    ExitCode::SUCCESS
}

fn run(args: &Args, seed: u64) -> Result<Summary, PlunderError> {
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    match args.mode {
        Mode::Island { difficulty, boss, steps } => run_island(&config, seed, difficulty, boss, steps),
        Mode::Heist { shift, turns } => run_heist(&config, seed, shift, turns),
        Mode::Sea { difficulty, steps } => Ok(run_sea(&config, seed, difficulty, steps)),
    }
}

fn run_island(
    config: &SimulationConfig,
    seed: u64,
    difficulty: u32,
    boss: bool,
    max_steps: u64,
) -> Result<Summary, PlunderError> {
    if difficulty > MAX_DIFFICULTY {
        return Err(PlunderError::InvalidGenerationParams(format!(
            "difficulty {difficulty} exceeds {MAX_DIFFICULTY}"
        )));
    }
    let mut rng = seeded_rng(seed);
    let layout = generate_island(difficulty, &config.island, &mut rng);
    let mut sim = IslandSim::new(layout, Player::default(), boss, config.combat.clone(), seed);
    let mut events = EventTally::default();
    let mut steps = 0;
    while !sim.is_over() && steps < max_steps {
        let intent = island_policy(&sim);
        events.record(&sim.step(DT, &intent));
        steps += 1;
    }
    Ok(Summary {
        mode: "island",
        seed,
        outcome: format!("{:?}", sim.outcome),
        steps,
        events,
    })
}

/// Fight whatever is close, otherwise walk the shortest route to the treasure
fn island_policy(sim: &IslandSim) -> PlayerIntent {
    let tile_size = sim.layout.level.tile_size;
    let player = &sim.player;
    let nearest = sim
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos()
                .distance(&player.pos)
                .total_cmp(&b.pos().distance(&player.pos))
        });

    let mut intent = PlayerIntent::default();
    let goal = match nearest {
        Some(enemy) if enemy.pos().distance(&player.pos) < 90.0 => {
            let dist = enemy.pos().distance(&player.pos);
            let aim = enemy.pos() - player.pos;
            intent.aim = Some(aim);
            intent.attack = dist < player.weapon.range() + enemy.base.radius;
            intent.fire = !intent.attack && player.ammo > 0;
            enemy.pos()
        }
        _ => sim.layout.exit.center(tile_size),
    };

    let here = TilePos::from_world(player.pos, tile_size);
    let there = TilePos::from_world(goal, tile_size);
    intent.move_dir = match sim.find_path(here, there).first() {
        Some(next) => next.center(tile_size) - player.pos,
        None => goal - player.pos,
    };
    intent
}

fn run_heist(config: &SimulationConfig, seed: u64, shift: u32, max_turns: u32) -> Result<Summary, PlunderError> {
    if shift == 0 {
        return Err(PlunderError::InvalidGenerationParams(
            "shifts are numbered from 1".into(),
        ));
    }
    let mut rng = seeded_rng(seed);
    let layout = generate_building(shift, &config.building, &mut rng);
    let mut sim = HeistSim::new(layout, HeistLoadout::default(), config.heist.clone(), seed);
    let mut events = EventTally::default();
    let mut turns = 0;
    while !sim.is_over() && turns < max_turns {
        heist_policy(&mut sim, &mut events);
        events.record(&sim.step_turn());
        turns += 1;
    }
    Ok(Summary {
        mode: "heist",
        seed,
        outcome: format!("{:?}", sim.outcome),
        steps: u64::from(turns),
        events,
    })
}

/// Lock the door in front of each visible intruder, then sound the alarm on
/// the first one standing in a watched room
fn heist_policy(sim: &mut HeistSim, events: &mut EventTally) {
    let seen: Vec<(TilePos, Option<TilePos>)> = sim
        .intruders
        .iter()
        .filter(|i| i.visible && !i.is_terminal())
        .map(|i| (i.pos, i.path.front().copied()))
        .collect();
    for &(_, next) in &seen {
        let Some(next) = next else { continue };
        match sim.lock_door(next) {
            Ok(log) => events.record(&log),
            Err(reason) => tracing::debug!(%reason, "lock skipped"),
        }
    }
    for &(pos, _) in &seen {
        if let Ok(log) = sim.trigger_alarm(pos) {
            events.record(&log);
            break;
        }
    }
}

fn run_sea(config: &SimulationConfig, seed: u64, difficulty: u32, max_steps: u64) -> Summary {
    let mut sim = SeaSim::new(
        PlayerShip::default(),
        difficulty,
        config.sea.clone(),
        config.combat.clone(),
        seed,
    );
    let mut events = EventTally::default();
    let mut steps = 0;
    while steps < max_steps {
        let helm = sea_policy(&sim);
        events.record(&sim.step(DT, &helm));
        steps += 1;
        match sim.outcome {
            SeaOutcome::Landed { .. } => sim.resume(),
            SeaOutcome::Sunk => break,
            SeaOutcome::Sailing => {}
        }
        if sim.islands.iter().all(|m| m.visited) {
            break;
        }
    }
    Summary {
        mode: "sea",
        seed,
        outcome: format!("{:?}", sim.outcome),
        steps,
        events,
    }
}

/// Head for the nearest unvisited island and fire on any ship abeam
fn sea_policy(sim: &SeaSim) -> HelmIntent {
    let ship = &sim.ship;
    let mut helm = HelmIntent {
        thrust: 1.0,
        ..Default::default()
    };
    let destination = sim
        .islands
        .iter()
        .filter(|m| !m.visited)
        .map(|m| m.pos)
        .min_by(|a, b| a.distance(&ship.pos).total_cmp(&b.distance(&ship.pos)));
    if let Some(dest) = destination {
        helm.turn = steer(ship.heading, dest - ship.pos);
    }

    let target = sim
        .enemies
        .iter()
        .filter(|e| e.is_alive() && e.pos().distance(&ship.pos) <= ship.cannon_range)
        .map(|e| e.pos())
        .next();
    if let Some(target) = target {
        let bearing = wrap_angle((target - ship.pos).angle() - ship.heading);
        helm.fire = Some(if bearing >= 0.0 {
            Broadside::Starboard
        } else {
            Broadside::Port
        });
    }
    helm
}

fn steer(heading: f32, toward: Vec2) -> f32 {
    let error = wrap_angle(toward.angle() - heading);
    (error * 2.0).clamp(-1.0, 1.0)
}

fn print_json(summary: &Summary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize summary: {e}"),
    }
}

fn print_text(summary: &Summary) {
    println!("Headless {} run", summary.mode);
    println!("=================");
    println!("Outcome: {}", summary.outcome);
    println!("Steps: {}", summary.steps);
    println!("Seed: {}", summary.seed);
    let mut counts: Vec<_> = summary.events.counts.iter().collect();
    counts.sort();
    for (label, count) in counts {
        println!("  {label}: {count}");
    }
}
