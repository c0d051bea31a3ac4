//! Initial-state rules.

use rand::Rng;

use super::error::ConfigError;
use super::grid::Grid;

/// How a fresh grid is filled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeedRule {
    /// Every cell dead.
    Dead,
    /// Each cell independently alive with `live_probability`.
    Random { live_probability: f64 },
}

impl Default for SeedRule {
    fn default() -> Self {
        SeedRule::Random {
            live_probability: 0.5,
        }
    }
}

impl SeedRule {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SeedRule::Random { live_probability } if !(0.0..=1.0).contains(&live_probability) => {
                Err(ConfigError::InvalidProbability(live_probability))
            }
            _ => Ok(()),
        }
    }

    /// Build a `width` x `height` grid at generation 0.
    pub fn fill<R: Rng>(
        &self,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Result<Grid, ConfigError> {
        self.validate()?;
        match *self {
            SeedRule::Dead => Grid::new(width, height),
            SeedRule::Random { live_probability } => {
                if width == 0 || height == 0 {
                    return Err(ConfigError::EmptyGrid { width, height });
                }
                let cells = (0..width * height)
                    .map(|_| rng.random_bool(live_probability))
                    .collect();
                Grid::from_cells(width, height, cells)
            }
        }
    }
}
