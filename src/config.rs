use crate::grid::{self, GRID_COLUMNS, GRID_ROWS};

pub const DEFAULT_DROP_INTERVAL_MS: u64 = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {rows}x{columns}")]
    EmptyGrid { rows: usize, columns: usize },
    #[error("grid dimensions {rows}x{columns} exceed the supported {max}x{max}")]
    GridTooLarge { rows: usize, columns: usize, max: usize },
    #[error("drop interval must be greater than zero")]
    ZeroDropInterval,
}

/// Settings for one game session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    /// Gravity fires once more than this many milliseconds have passed since
    /// the previous automatic drop.
    pub drop_interval_ms: u64,
    /// Seed for the piece generator; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub const MAX_DIMENSION: usize = grid::MAX_DIMENSION;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.rows > Self::MAX_DIMENSION || self.columns > Self::MAX_DIMENSION {
            return Err(ConfigError::GridTooLarge {
                rows: self.rows,
                columns: self.columns,
                max: Self::MAX_DIMENSION,
            });
        }
        if self.drop_interval_ms == 0 {
            return Err(ConfigError::ZeroDropInterval);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            columns: GRID_COLUMNS,
            drop_interval_ms: DEFAULT_DROP_INTERVAL_MS,
            seed: None,
        }
    }
}
