//! Playground configuration and construction errors.
//!
//! Defaults come from the constants in `brickfall_types`. A config is checked
//! once by [`PlaygroundConfig::validate`]; anything it rejects is a
//! programming error, so there is no recovery path beyond reporting it.

use thiserror::Error;

use crate::tetromino::{CatalogError, MAX_SHAPE_SIZE};
use crate::types::{
    BASE_GRAVITY_MS, CLEAR_DELAY_MS, COLLAPSE_MS, GRAVITY_STEP_MS, GRID_COLS, GRID_ROWS,
    HARD_DROP_MS, QUEUE_DEPTH, REPEAT_BASE_MS, REPEAT_FLOOR_MS, REPEAT_STEP_MS, ROWS_PER_LEVEL,
    SCORE_PER_BRICK, START_DELAY_MS,
};

/// Errors raised while building a playground.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least {min}x{min}, got {rows} rows x {cols} cols")]
    GridTooSmall { rows: u8, cols: u8, min: u8 },

    #[error("queue depth must be at least 1")]
    EmptyQueue,

    #[error("rows per level must be at least 1")]
    ZeroRowsPerLevel,

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Auto-repeat timing for held movement keys.
///
/// The n-th repeat (n starting at 1) waits `max(floor, base - step * n)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatTiming {
    pub base_ms: f64,
    pub step_ms: f64,
    pub floor_ms: f64,
}

impl RepeatTiming {
    /// Delay required before the next repeat, given how many already fired.
    pub fn delay_after(&self, repeats: u32) -> f64 {
        (self.base_ms - self.step_ms * repeats as f64).max(self.floor_ms)
    }
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            base_ms: REPEAT_BASE_MS,
            step_ms: REPEAT_STEP_MS,
            floor_ms: REPEAT_FLOOR_MS,
        }
    }
}

/// Everything a [`crate::Playground`] needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    pub rows: u8,
    pub cols: u8,
    pub queue_depth: usize,
    /// RNG seed; equal seeds replay identical piece sequences.
    pub seed: u32,
    pub start_delay_ms: f64,
    pub base_gravity_ms: f64,
    pub gravity_step_ms: f64,
    pub rows_per_level: u32,
    pub hard_drop_ms: f64,
    pub clear_delay_ms: f64,
    pub collapse_ms: f64,
    pub score_per_brick: u32,
    pub repeat: RepeatTiming,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            queue_depth: QUEUE_DEPTH,
            seed: 1,
            start_delay_ms: START_DELAY_MS,
            base_gravity_ms: BASE_GRAVITY_MS,
            gravity_step_ms: GRAVITY_STEP_MS,
            rows_per_level: ROWS_PER_LEVEL,
            hard_drop_ms: HARD_DROP_MS,
            clear_delay_ms: CLEAR_DELAY_MS,
            collapse_ms: COLLAPSE_MS,
            score_per_brick: SCORE_PER_BRICK,
            repeat: RepeatTiming::default(),
        }
    }
}

impl PlaygroundConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_grid(mut self, rows: u8, cols: u8) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth;
        self
    }

    pub fn with_start_delay_ms(mut self, delay: f64) -> Self {
        self.start_delay_ms = delay;
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatTiming) -> Self {
        self.repeat = repeat;
        self
    }

    /// Check every field; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = MAX_SHAPE_SIZE as u8;
        if self.rows < min || self.cols < min {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
                min,
            });
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::EmptyQueue);
        }
        if self.rows_per_level == 0 {
            return Err(ConfigError::ZeroRowsPerLevel);
        }

        let durations = [
            ("start_delay_ms", self.start_delay_ms),
            ("base_gravity_ms", self.base_gravity_ms),
            ("gravity_step_ms", self.gravity_step_ms),
            ("hard_drop_ms", self.hard_drop_ms),
            ("clear_delay_ms", self.clear_delay_ms),
            ("collapse_ms", self.collapse_ms),
            ("repeat.base_ms", self.repeat.base_ms),
            ("repeat.step_ms", self.repeat.step_ms),
            ("repeat.floor_ms", self.repeat.floor_ms),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { name, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(PlaygroundConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_grid_narrower_than_widest_shape() {
        let config = PlaygroundConfig::default().with_grid(20, 3);
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooSmall {
                rows: 20,
                cols: 3,
                min: 4
            })
        );
    }

    #[test]
    fn rejects_empty_queue_and_bad_durations() {
        let config = PlaygroundConfig::default().with_queue_depth(0);
        assert_eq!(config.validate(), Err(ConfigError::EmptyQueue));

        let config = PlaygroundConfig::default().with_start_delay_ms(f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration {
                name: "start_delay_ms",
                ..
            })
        ));
    }

    #[test]
    fn repeat_delay_accelerates_down_to_floor() {
        let timing = RepeatTiming::default();
        assert_eq!(timing.delay_after(1), 67.0);
        assert_eq!(timing.delay_after(2), 54.0);
        assert_eq!(timing.delay_after(10), timing.floor_ms);
    }
}
