//! Game dimensions and scoring constants shared by the server and every replica

use thiserror::Error;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const POINTS_PER_LINE: u32 = 10;

/// Smallest board that still fits every shape at the spawn column
pub const MIN_WIDTH: usize = 5;
pub const MIN_HEIGHT: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board width {0} is below the minimum of {min}", min = MIN_WIDTH)]
    TooNarrow(usize),
    #[error("board height {0} is below the minimum of {min}", min = MIN_HEIGHT)]
    TooShort(usize),
}

/// Parameters every participant must agree on for scores to match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub points_per_line: u32,
}

impl GameConfig {
    pub fn new(width: usize, height: usize, points_per_line: u32) -> Result<Self, ConfigError> {
        if width < MIN_WIDTH {
            return Err(ConfigError::TooNarrow(width));
        }
        if height < MIN_HEIGHT {
            return Err(ConfigError::TooShort(height));
        }

        Ok(Self {
            width,
            height,
            points_per_line,
        })
    }

    /// Column at which every new shape appears
    pub fn spawn_col(&self) -> i32 {
        (self.width / 2) as i32
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            points_per_line: POINTS_PER_LINE,
        }
    }
}
