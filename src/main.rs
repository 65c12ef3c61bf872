//! Bomb Arena headless driver
//!
//! Loads a level (default arena or a text file) and an optional JSON config,
//! then plays a scripted input sequence through the fixed-timestep loop,
//! logging every game event. Run with `RUST_LOG=debug` for detail.
//!
//! Usage: `bomb-arena [LEVEL_FILE] [CONFIG_JSON]`

use std::error::Error;
use std::fs;

use bomb_arena::GameConfig;
use bomb_arena::consts::*;
use bomb_arena::sim::{GameEvent, Grid, Round, RoundPhase, TickInput};

/// Scripted input: hold `input` for `duration_ms`
struct Step {
    duration_ms: f32,
    input: TickInput,
}

fn step(duration_ms: f32, input: TickInput) -> Step {
    Step { duration_ms, input }
}

/// Time to cross two tiles at the default speed
const TWO_TILES_MS: f32 = 2.0 * GRID_SIZE / PLAYER_SPEED * 1000.0;

fn script() -> Vec<Step> {
    let idle = TickInput::default();
    let bomb = TickInput {
        place_bomb: true,
        ..idle
    };
    let right = TickInput { right: true, ..idle };
    let left = TickInput { left: true, ..idle };
    let up = TickInput { up: true, ..idle };
    let down = TickInput { down: true, ..idle };

    vec![
        // Blow up the block east of the spawn corridor, then hide
        step(TWO_TILES_MS, right),
        step(SIM_DT_MS, bomb),
        step(TWO_TILES_MS, left),
        step(TWO_TILES_MS, down),
        step(3000.0, idle),
        // Come back and stand on a fresh bomb
        step(TWO_TILES_MS, up),
        step(SIM_DT_MS, bomb),
        step(2500.0, idle),
    ]
}

/// Fixed-timestep loop with a bounded number of substeps per frame
struct Driver {
    round: Round,
    accumulator: f32,
}

impl Driver {
    fn update(&mut self, frame_ms: f32, input: &TickInput) {
        self.accumulator += frame_ms.min(100.0);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.round.tick(SIM_DT_MS, input);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }

        for event in self.round.drain_events() {
            log_event(&event);
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::BombPlaced { id, pos, .. } => {
            log::info!("bomb {} placed at ({:.0}, {:.0})", id, pos.x, pos.y)
        }
        GameEvent::ExplosionCreated { pos, .. } => {
            log::debug!("explosion at ({:.0}, {:.0})", pos.x, pos.y)
        }
        GameEvent::ExplosionExpired { pos, .. } => {
            log::trace!("explosion gone at ({:.0}, {:.0})", pos.x, pos.y)
        }
        GameEvent::BlockDestroyed { x, y } => log::info!("block destroyed at tile ({}, {})", x, y),
        GameEvent::PlayerDied => log::info!("player died"),
        GameEvent::EnemyKilled { id, .. } => log::info!("enemy {} destroyed", id),
        GameEvent::RoundCleared => log::info!("arena cleared"),
        GameEvent::RoundRestarted => log::info!("round restarted"),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);

    let grid = match args.next() {
        Some(path) => {
            log::info!("Loading level from {}", path);
            Grid::parse(&fs::read_to_string(&path)?)?
        }
        None => Grid::default_level(),
    };

    let config = match args.next() {
        Some(path) => {
            log::info!("Loading config from {}", path);
            GameConfig::from_json(&fs::read_to_string(&path)?)?
        }
        None => GameConfig::default(),
    };

    let mut driver = Driver {
        round: Round::new(config, grid, 0x5EED),
        accumulator: 0.0,
    };

    'script: for Step { duration_ms, input } in script() {
        let mut elapsed = 0.0;
        while elapsed < duration_ms {
            driver.update(SIM_DT_MS, &input);
            elapsed += SIM_DT_MS;

            if driver.round.phase() == RoundPhase::GameOver {
                log::info!("Game over at tick {}", driver.round.time_ticks());
                driver.round.restart();
                for event in driver.round.drain_events() {
                    log_event(&event);
                }
                break 'script;
            }
        }
    }

    let round = &driver.round;
    println!(
        "phase={:?} enemies={} bombs={} explosions={} destroyed_blocks={}",
        round.phase(),
        round.enemies().len(),
        round.bombs().len(),
        round.explosions().len(),
        round.destroyed_blocks().len()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Bomb Arena (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
