//! Round orchestration
//!
//! A [`Round`] owns the grid, the entity registry, and the seeded RNG, and
//! advances them one tick at a time:
//! movement → bomb placement → fuses → explosion lifetimes → contacts.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::blast::{self, Detonation};
use super::collision::{self, Outcome};
use super::enemy;
use super::grid::Grid;
use super::state::{Bomb, Enemy, EntityId, ExplosionCell, GameEvent, Player, Registry};
use crate::config::GameConfig;
use crate::error::LevelError;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Place a bomb at the player's position
    pub place_bomb: bool,
}

impl TickInput {
    /// Unit-length movement intent, zero when idle.
    ///
    /// When opposing keys are both held, left wins over right and up wins
    /// over down.
    pub fn direction(&self) -> Vec2 {
        let x = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        let y = if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        };
        Vec2::new(x, y).normalize_or_zero()
    }
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Active gameplay
    Playing,
    /// Player died; waiting for restart
    GameOver,
    /// Every enemy destroyed
    Cleared,
}

/// Summary of what one tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub bomb_placed: Option<EntityId>,
    pub detonations: Vec<Detonation>,
    /// Explosion cells that expired
    pub expired: Vec<EntityId>,
    pub player_died: bool,
}

/// One play session on a fixed level
#[derive(Debug, Clone)]
pub struct Round {
    config: GameConfig,
    grid: Grid,
    registry: Registry,
    phase: RoundPhase,
    /// Enemy direction source
    rng: Pcg32,
    seed: u64,
    /// Simulation tick counter
    time_ticks: u64,
}

impl Round {
    /// Start a round on an already loaded grid
    pub fn new(config: GameConfig, grid: Grid, seed: u64) -> Self {
        let mut round = Self {
            config,
            grid,
            registry: Registry::new(),
            phase: RoundPhase::Playing,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            time_ticks: 0,
        };
        round.populate();
        log::info!("Round started with seed {}", seed);
        round
    }

    /// Parse a character map and start a round on it
    pub fn load_level<S: AsRef<str>>(config: GameConfig, rows: &[S], seed: u64) -> Result<Self, LevelError> {
        let grid = Grid::load(rows)?;
        Ok(Self::new(config, grid, seed))
    }

    /// Spawn the player and enemies from the grid's spawn tiles
    fn populate(&mut self) {
        let grid_size = self.config.grid_size;
        self.registry
            .spawn_player(Grid::world_pos(self.grid.player_spawn(), grid_size));

        for &cell in self.grid.enemy_spawns() {
            let direction = enemy::spawn_direction(&mut self.rng);
            self.registry
                .spawn_enemy(Grid::world_pos(cell, grid_size), direction, self.config.enemy_speed);
        }
    }

    /// Advance the round by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: f32, input: &TickInput) -> TickReport {
        let mut report = TickReport::default();

        // Dead or cleared rounds stay frozen until restart
        if self.phase != RoundPhase::Playing || !self.registry.player_alive() {
            return report;
        }

        let elapsed_ms = elapsed_ms.max(0.0);
        self.time_ticks += 1;

        // Movement
        let delta = input.direction() * self.config.player_speed * (elapsed_ms / 1000.0);
        if delta != Vec2::ZERO {
            collision::move_player(&self.grid, &mut self.registry, &self.config, delta);
        }
        collision::move_enemies(&self.grid, &mut self.registry, &self.config, elapsed_ms);

        // Bomb placement
        if input.place_bomb {
            report.bomb_placed = self.try_place_bomb();
        }

        // Fuses, then explosion lifetimes
        report.detonations = blast::tick_fuses(&mut self.grid, &mut self.registry, &self.config, elapsed_ms);
        let fresh: Vec<EntityId> = report
            .detonations
            .iter()
            .flat_map(|d| d.cells.iter().copied())
            .collect();
        report.expired = blast::tick_explosions(&mut self.registry, elapsed_ms, &fresh);

        // Contacts
        let had_enemies = !self.registry.enemies().is_empty();
        for contact in collision::detect_contacts(&self.grid, &self.registry, &self.config) {
            if collision::resolve(&mut self.registry, &self.config, contact) == Outcome::PlayerKilled {
                report.player_died = true;
            }
        }

        if report.player_died {
            self.phase = RoundPhase::GameOver;
            log::info!("Game over after {} ticks", self.time_ticks);
        } else if had_enemies && self.registry.enemies().is_empty() {
            self.phase = RoundPhase::Cleared;
            self.registry.push_event(GameEvent::RoundCleared);
            log::info!("Round cleared after {} ticks", self.time_ticks);
        }

        report
    }

    /// Place a bomb under the player unless one is already too close.
    /// Returns the new bomb's id, or `None` if the request was rejected.
    pub fn try_place_bomb(&mut self) -> Option<EntityId> {
        let player = self.registry.player().filter(|p| p.alive)?;
        let (pos, owner) = (player.pos, player.id);

        if !collision::placement_allowed(&self.registry, &self.config, pos) {
            return None;
        }

        let id = self
            .registry
            .place_bomb(pos, owner, self.config.timings.bomb_fuse_ms);
        log::debug!("Bomb {} placed at ({:.1}, {:.1})", id, pos.x, pos.y);
        Some(id)
    }

    /// Reset the level and re-seed every entity.
    ///
    /// Bombs and explosion cells are dropped along with their countdowns, and
    /// events from the previous round are discarded.
    pub fn restart(&mut self) {
        self.grid.reset();
        self.registry.clear();
        self.registry.drain_events();
        self.registry.push_event(GameEvent::RoundRestarted);
        self.phase = RoundPhase::Playing;
        self.time_ticks = 0;
        self.populate();
        log::info!("Round restarted");
    }

    // === Snapshots ===

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RoundPhase::GameOver
    }

    pub fn player(&self) -> Option<&Player> {
        self.registry.player()
    }

    pub fn enemies(&self) -> &[Enemy] {
        self.registry.enemies()
    }

    pub fn bombs(&self) -> &[Bomb] {
        self.registry.bombs()
    }

    pub fn explosions(&self) -> &[ExplosionCell] {
        self.registry.explosions()
    }

    pub fn destroyed_blocks(&self) -> &[glam::IVec2] {
        self.grid.destroyed_blocks()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.registry.drain_events()
    }

    /// Apply a contact reported by an external physics layer
    pub fn apply_contact(&mut self, contact: collision::Contact) -> Outcome {
        let outcome = collision::resolve(&mut self.registry, &self.config, contact);
        if outcome == Outcome::PlayerKilled {
            self.phase = RoundPhase::GameOver;
        }
        outcome
    }
}
