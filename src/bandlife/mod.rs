//! Band-parallel engine internals and public API.

mod band;
mod boundary;
mod engine;
mod error;
mod grid;
mod pool;
mod rules;
mod seed;

pub use band::{Band, BandResult, Task, band_ranges, partition};
pub use boundary::{for_each_ring_cell, reconcile, ring_len};
pub use engine::{Engine, EngineConfig, GenerationStats, advance};
pub use error::{ConfigError, EngineError};
pub use grid::Grid;
pub use pool::WorkerPool;
pub use rules::{next_state, step_serial};
pub use seed::SeedRule;
