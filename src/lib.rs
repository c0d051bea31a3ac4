//! Band-parallel Conway's Game of Life engine (B3/S23) on a bounded grid.
//!
//! The interior of the grid is split into row bands computed by a fixed
//! pool of persistent workers; the outer ring is computed serially by the
//! coordinator and the two are merged into the next generation.

pub mod bandlife;
pub use bandlife::{ConfigError, Engine, EngineConfig, EngineError, Grid, SeedRule};
