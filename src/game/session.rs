//! Game session: owns the grid, the falling piece, timers and score.

use super::collision::{hard_drop, is_valid};
use super::error::ConfigError;
use super::grid::Grid;
use super::lines::{ClearRule, clear_lines};
use super::piece::{ActivePiece, ShapeKind};
use super::sand::SandSimulator;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// Most cadence steps a single `on_tick` may run per timer. Keeps a long
/// stall (e.g. a suspended terminal) from freezing the frame.
const MAX_CATCH_UP_STEPS: u32 = 8;

/// Session parameters. `width` and `height` are in grid cells; `unit` is
/// how many cells one shape sub-cell spans on each axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    pub unit: usize,
    pub fall_interval: Duration,
    pub sand_interval: Duration,
    pub clear_threshold_pct: u8,
    pub points_per_row: u32,
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let rule = ClearRule::default();
        Self {
            width: 10,
            height: 20,
            unit: 1,
            fall_interval: Duration::from_millis(500),
            sand_interval: Duration::from_millis(10),
            clear_threshold_pct: rule.threshold_pct,
            points_per_row: rule.points_per_row,
            seed: 0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit == 0 {
            return Err(ConfigError::ZeroUnit);
        }
        let min = (4 * self.unit).max(4);
        if self.width < min || self.height < min {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                unit: self.unit,
                min,
            });
        }
        if self.fall_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("fall"));
        }
        if self.sand_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("sand"));
        }
        if !(1..=100).contains(&self.clear_threshold_pct) {
            return Err(ConfigError::InvalidThreshold(self.clear_threshold_pct));
        }
        Ok(())
    }

    pub const fn clear_rule(&self) -> ClearRule {
        ClearRule {
            threshold_pct: self.clear_threshold_pct,
            points_per_row: self.points_per_row,
        }
    }
}

/// Discrete move command from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    /// Soft drop: one unit down, never locks.
    Down,
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    grid: Grid,
    piece: Option<ActivePiece>,
    sand: SandSimulator,
    rng: StdRng,
    score: u32,
    lines_cleared: u32,
    game_over: bool,
    fall_elapsed: Duration,
    sand_elapsed: Duration,
    last_cleared_rows: Vec<usize>,
    clear_events: u64,
    restarts: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            grid: Grid::new(config.width, config.height),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            piece: None,
            sand: SandSimulator::new(),
            score: 0,
            lines_cleared: 0,
            game_over: false,
            fall_elapsed: Duration::ZERO,
            sand_elapsed: Duration::ZERO,
            last_cleared_rows: Vec::new(),
            clear_events: 0,
            restarts: 0,
        };
        session.spawn_next();
        Ok(session)
    }

    /// Default cadences and scoring with the given size and seed.
    pub fn initialize(width: usize, height: usize, seed: u64) -> Result<Self, ConfigError> {
        Self::new(SessionConfig {
            width,
            height,
            seed,
            ..SessionConfig::default()
        })
    }

    /// Starts a fresh game with the same configuration.
    pub fn restart(&mut self) {
        self.restarts += 1;
        self.rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(self.restarts));
        self.grid.clear();
        self.piece = None;
        self.sand = SandSimulator::new();
        self.score = 0;
        self.lines_cleared = 0;
        self.game_over = false;
        self.fall_elapsed = Duration::ZERO;
        self.sand_elapsed = Duration::ZERO;
        self.last_cleared_rows.clear();
        info!("restart #{}", self.restarts);
        self.spawn_next();
    }

    /// Advances the fall and sand timers by `elapsed`, running each cadence
    /// as many times as it fired (bounded per call).
    pub fn on_tick(&mut self, elapsed: Duration) {
        if self.game_over {
            return;
        }
        self.fall_elapsed = self.fall_elapsed.saturating_add(elapsed);
        self.sand_elapsed = self.sand_elapsed.saturating_add(elapsed);

        let mut steps = 0;
        while self.fall_elapsed >= self.config.fall_interval && !self.game_over {
            self.fall_elapsed -= self.config.fall_interval;
            self.step_fall();
            steps += 1;
            if steps == MAX_CATCH_UP_STEPS {
                self.fall_elapsed = Duration::ZERO;
            }
        }

        let mut steps = 0;
        while self.sand_elapsed >= self.config.sand_interval && !self.game_over {
            self.sand_elapsed -= self.config.sand_interval;
            self.step_sand();
            steps += 1;
            if steps == MAX_CATCH_UP_STEPS {
                self.sand_elapsed = Duration::ZERO;
            }
        }
    }

    /// One automatic fall: down one unit, or lock, clear and spawn.
    pub fn step_fall(&mut self) {
        if self.game_over {
            return;
        }
        let unit = self.unit();
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        if !piece.try_move(&self.grid, 0, -unit) {
            self.lock_and_continue();
        }
    }

    /// One sand tick over the whole grid. Returns particles moved.
    pub fn step_sand(&mut self) -> usize {
        if self.game_over {
            return 0;
        }
        self.sand.tick(&mut self.grid, &mut self.rng)
    }

    pub fn request_move(&mut self, direction: Direction) -> bool {
        if self.game_over {
            return false;
        }
        let unit = self.unit();
        let (dx, dy) = match direction {
            Direction::Left => (-unit, 0),
            Direction::Right => (unit, 0),
            Direction::Down => (0, -unit),
        };
        self.piece
            .as_mut()
            .is_some_and(|p| p.try_move(&self.grid, dx, dy))
    }

    pub fn request_rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.piece.as_mut().is_some_and(|p| p.try_rotate(&self.grid))
    }

    /// Drops the piece flush onto whatever is below, locks it, clears and
    /// spawns the next one. Resets the fall timer.
    pub fn request_hard_drop(&mut self) {
        if self.game_over {
            return;
        }
        let Some(mut piece) = self.piece.take() else {
            return;
        };
        let travelled = hard_drop(&mut self.grid, &mut piece);
        debug!("hard drop {:?} travelled {travelled}", piece.kind);
        self.fall_elapsed = Duration::ZERO;
        self.after_lock();
    }

    /// Replaces the falling piece with a fresh spawn of `kind`. Sets game
    /// over if it does not fit.
    pub fn set_active_kind(&mut self, kind: ShapeKind) {
        if self.game_over {
            return;
        }
        let piece = ActivePiece::spawn_kind(kind, self.grid.width(), self.grid.height(), self.unit());
        self.place_spawned(piece);
    }

    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    pub const fn active_piece(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub const fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Rows emptied by the most recent clear that removed anything.
    pub fn last_cleared_rows(&self) -> &[usize] {
        &self.last_cleared_rows
    }

    /// Bumped once per clear pass that removed at least one row.
    pub const fn clear_events(&self) -> u64 {
        self.clear_events
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    const fn unit(&self) -> i32 {
        self.config.unit as i32
    }

    fn lock_and_continue(&mut self) {
        if let Some(piece) = self.piece.take() {
            piece.lock(&mut self.grid);
            self.after_lock();
        }
    }

    fn after_lock(&mut self) {
        let report = clear_lines(&mut self.grid, &self.config.clear_rule());
        if !report.is_empty() {
            self.score = self.score.saturating_add(report.points);
            self.lines_cleared = self.lines_cleared.saturating_add(report.rows.len() as u32);
            self.last_cleared_rows = report.rows;
            self.clear_events += 1;
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let unit = self.unit();
        let piece = ActivePiece::spawn(&mut self.rng, self.grid.width(), self.grid.height(), unit);
        self.place_spawned(piece);
    }

    fn place_spawned(&mut self, piece: ActivePiece) {
        if is_valid(&self.grid, piece.x, piece.y, &piece.shape, piece.unit) {
            self.piece = Some(piece);
        } else {
            info!("game over: {:?} blocked at spawn, score {}", piece.kind, self.score);
            self.piece = None;
            self.game_over = true;
        }
    }
}
