use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Configuration for the game
///
/// Geometry is given in pixels, the way a canvas-based client would describe
/// its playfield; the simulation itself only ever sees grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield width in pixels
    pub board_width: u32,
    /// Playfield height in pixels
    pub board_height: u32,
    /// Side of one square cell in pixels
    pub cell_size: u32,

    /// Head cell of a freshly spawned snake
    pub initial_head: (i32, i32),
    /// Initial length of the snake
    pub initial_snake_length: usize,

    /// Tick interval at the start of a run, in milliseconds
    pub initial_speed_ms: u64,
    /// Tick interval never drops below this, in milliseconds
    pub min_speed_ms: u64,
    /// Multiplier applied to the tick interval at each score threshold
    pub speed_factor: f64,
    /// Speed recalculates whenever the score becomes a multiple of this
    pub speed_up_every: u32,
    /// Points per food item
    pub food_score: u32,

    /// Random draws before food placement falls back to scanning free cells
    pub max_placement_attempts: u32,
    /// Fixed RNG seed for reproducible runs
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 400,
            board_height: 400,
            cell_size: 20,
            initial_head: (6, 15),
            initial_snake_length: 3,
            initial_speed_ms: 200,
            min_speed_ms: 50,
            speed_factor: 0.9,
            speed_up_every: 100,
            food_score: 10,
            max_placement_attempts: 1000,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board size in pixels
    pub fn new(board_width: u32, board_height: u32) -> Self {
        Self {
            board_width,
            board_height,
            ..Default::default()
        }
    }

    /// Create a small board for testing (10x10 cells)
    pub fn small() -> Self {
        Self {
            board_width: 200,
            board_height: 200,
            initial_head: (5, 5),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config in {:?}", path))
    }

    /// Number of cells across
    pub fn grid_width(&self) -> i32 {
        (self.board_width / self.cell_size.max(1)) as i32
    }

    /// Number of cells down
    pub fn grid_height(&self) -> i32 {
        (self.board_height / self.cell_size.max(1)) as i32
    }

    pub fn initial_speed(&self) -> Duration {
        Duration::from_millis(self.initial_speed_ms)
    }

    pub fn min_speed(&self) -> Duration {
        Duration::from_millis(self.min_speed_ms)
    }

    /// Reject configurations the grid model cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.board_width == 0 || self.board_height == 0 || self.cell_size == 0 {
            bail!(
                "board size and cell size must be positive (got {}x{}, cell {})",
                self.board_width,
                self.board_height,
                self.cell_size
            );
        }
        if self.board_width % self.cell_size != 0 || self.board_height % self.cell_size != 0 {
            bail!(
                "cell size {} does not evenly divide board {}x{}",
                self.cell_size,
                self.board_width,
                self.board_height
            );
        }
        if self.initial_snake_length < 2 {
            bail!("initial snake length must be at least 2");
        }

        // The snake spawns heading right with its body trailing to the left
        let (head_x, head_y) = self.initial_head;
        let tail_x = head_x - (self.initial_snake_length as i32 - 1);
        if tail_x < 0 || head_x >= self.grid_width() || head_y < 0 || head_y >= self.grid_height()
        {
            bail!(
                "initial snake at ({}, {}) with length {} does not fit a {}x{} grid",
                head_x,
                head_y,
                self.initial_snake_length,
                self.grid_width(),
                self.grid_height()
            );
        }

        let cells = self.grid_width() as usize * self.grid_height() as usize;
        if cells <= self.initial_snake_length {
            bail!("a {}-cell grid leaves no room for food", cells);
        }

        if !(self.speed_factor > 0.0 && self.speed_factor <= 1.0) {
            bail!("speed factor must be in (0, 1], got {}", self.speed_factor);
        }
        if self.initial_speed_ms == 0 || self.min_speed_ms == 0 {
            bail!("tick intervals must be positive");
        }
        if self.min_speed_ms > self.initial_speed_ms {
            bail!(
                "minimum speed {}ms is slower than initial speed {}ms",
                self.min_speed_ms,
                self.initial_speed_ms
            );
        }
        if self.speed_up_every == 0 || self.food_score == 0 {
            bail!("score increments and speed thresholds must be positive");
        }

        Ok(())
    }
}
