use std::sync::OnceLock;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::band::{Task, partition};
use super::boundary;
use super::error::{ConfigError, EngineError};
use super::grid::Grid;
use super::pool::WorkerPool;
use super::seed::SeedRule;

const WORKERS_ENV: &str = "BANDLIFE_WORKERS";
const DEFAULT_WIDTH: usize = 160;
const DEFAULT_HEIGHT: usize = 90;

static PHYSICAL_CORES: OnceLock<usize> = OnceLock::new();

#[inline]
fn physical_core_count() -> usize {
    *PHYSICAL_CORES.get_or_init(|| num_cpus::get_physical().max(1))
}

/// Worker count from `BANDLIFE_WORKERS`, if set to a positive integer.
fn env_worker_count() -> Option<usize> {
    let raw = std::env::var(WORKERS_ENV).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(value = raw, "ignoring invalid {}", WORKERS_ENV);
            None
        }
    }
}

/// Resolve the worker count from a config, falling back to the environment
/// and then to the physical core count.
fn resolve_worker_count(config: &EngineConfig) -> usize {
    config
        .worker_count
        .or_else(env_worker_count)
        .unwrap_or_else(physical_core_count)
}

/// Configuration for an [`Engine`].
///
/// `EngineConfig::default()` gives a 160x90 half-filled grid with one worker
/// per physical core.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Number of persistent workers.
    /// `None` means `BANDLIFE_WORKERS`, or the physical core count.
    pub worker_count: Option<usize>,
    /// Initial fill of the grid.
    pub seed: SeedRule,
    /// Seed for the fill RNG. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            worker_count: None,
            seed: SeedRule::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set an explicit worker count. Zero is rejected by [`Self::validate`].
    pub fn worker_count(mut self, n: usize) -> Self {
        self.worker_count = Some(n);
        self
    }

    pub fn seed(mut self, rule: SeedRule) -> Self {
        self.seed = rule;
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.worker_count == Some(0) {
            return Err(ConfigError::NoWorkers);
        }
        self.seed.validate()
    }
}

/// Wall-clock cost of each phase of one generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Band tasks handed to the pool.
    pub bands: usize,
    pub boundary: Duration,
    pub dispatch: Duration,
    /// Time blocked on the result barrier, excluding splicing.
    pub await_results: Duration,
    pub merge: Duration,
    pub total: Duration,
}

/// Compute the generation after `current` on `pool`.
///
/// The boundary ring is computed on the calling thread, the interior in
/// bands on the pool. `current` is only read; the returned grid is a fresh
/// allocation one generation ahead. Spare buffers in `scratch` are used for
/// the band tasks and the returned blocks are pushed back for next time.
pub fn advance(
    pool: &WorkerPool,
    current: &Grid,
    scratch: &mut Vec<Vec<bool>>,
) -> Result<(Grid, GenerationStats), EngineError> {
    let started = Instant::now();
    let mut stats = GenerationStats::default();

    let mut next = current.blank_successor();
    boundary::reconcile(current, &mut next);
    let boundary_done = Instant::now();
    stats.boundary = boundary_done - started;

    let tasks: Vec<Task<'_>> = partition(current, pool.workers())
        .into_iter()
        .map(|band| Task::new(band, scratch.pop().unwrap_or_default()))
        .collect();
    stats.bands = tasks.len();
    let dispatched = Instant::now();
    stats.dispatch = dispatched - boundary_done;

    let mut merge = Duration::ZERO;
    pool.run(tasks, |result| {
        let splice = Instant::now();
        result.splice_into(&mut next);
        scratch.push(result.into_cells());
        merge += splice.elapsed();
    })?;

    let elapsed = dispatched.elapsed();
    stats.merge = merge;
    stats.await_results = elapsed.saturating_sub(merge);
    stats.total = started.elapsed();
    Ok((next, stats))
}

/// Band-parallel Life engine.
///
/// Owns the current grid and the worker pool. `&mut self` on every mutating
/// call means cell edits can never overlap a generation in flight.
pub struct Engine {
    grid: Grid,
    pool: WorkerPool,
    rng: StdRng,
    scratch: Vec<Vec<bool>>,
    last_stats: Option<GenerationStats>,
}

impl Engine {
    /// Validate `config`, seed the grid and start the workers.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = config.seed.fill(config.width, config.height, &mut rng)?;
        Self::with_grid(grid, resolve_worker_count(&config), rng)
    }

    /// Start an engine on an existing grid.
    pub fn from_grid(grid: Grid, workers: usize) -> Result<Self, ConfigError> {
        Self::with_grid(grid, workers, StdRng::from_os_rng())
    }

    fn with_grid(grid: Grid, workers: usize, rng: StdRng) -> Result<Self, ConfigError> {
        let pool = WorkerPool::new(workers)?;
        info!(
            width = grid.width(),
            height = grid.height(),
            workers,
            bands = partition(&grid, workers).len(),
            "engine ready"
        );
        Ok(Self {
            grid,
            pool,
            rng,
            scratch: Vec::with_capacity(workers),
            last_stats: None,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.grid.generation()
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    pub fn population(&self) -> u64 {
        self.grid.population()
    }

    /// Phase timings of the most recent generation.
    pub fn last_stats(&self) -> Option<GenerationStats> {
        self.last_stats
    }

    /// Advance one generation, blocking until every band is merged.
    ///
    /// On error the current grid and generation are unchanged.
    pub fn advance_generation(&mut self) -> Result<&Grid, EngineError> {
        let (next, stats) = advance(&self.pool, &self.grid, &mut self.scratch)?;
        self.grid = next;
        self.last_stats = Some(stats);
        debug!(
            generation = self.grid.generation(),
            bands = stats.bands,
            boundary_us = stats.boundary.as_micros() as u64,
            await_us = stats.await_results.as_micros() as u64,
            merge_us = stats.merge.as_micros() as u64,
            total_us = stats.total.as_micros() as u64,
            "generation complete"
        );
        Ok(&self.grid)
    }

    pub fn step(&mut self) -> Result<(), EngineError> {
        self.advance_generation().map(|_| ())
    }

    pub fn step_n(&mut self, n: u64) -> Result<(), EngineError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    pub fn get_cell(&self, x: usize, y: usize) -> Option<bool> {
        self.grid.get(x, y)
    }

    pub fn set_cell(&mut self, x: usize, y: usize, alive: bool) -> Result<(), EngineError> {
        if self.grid.set(x, y, alive) {
            Ok(())
        } else {
            Err(self.out_of_bounds(x, y))
        }
    }

    /// Flip one cell and return its new state.
    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<bool, EngineError> {
        let alive = !self.grid.get(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        self.grid.put(x, y, alive);
        Ok(alive)
    }

    /// Replace the grid with a fresh fill of the same size at generation 0.
    pub fn reseed(&mut self, rule: SeedRule) -> Result<(), ConfigError> {
        self.grid = rule.fill(self.grid.width(), self.grid.height(), &mut self.rng)?;
        self.last_stats = None;
        info!(?rule, "grid reseeded");
        Ok(())
    }

    /// Stop the workers. Later generations fail with a barrier violation.
    pub fn shutdown(&mut self) -> usize {
        let acks = self.pool.shutdown();
        info!(acknowledged = acks, "engine shut down");
        acks
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> EngineError {
        EngineError::OutOfBounds {
            x,
            y,
            width: self.grid.width(),
            height: self.grid.height(),
        }
    }
}
