//! Error types for the band-parallel engine.
//!
//! Construction-time problems surface as [`ConfigError`] and never reach the
//! update loop. Everything that can go wrong while a generation is in flight
//! is an [`EngineError`]; when one is returned the current grid is untouched.

/// Rejected engine or grid configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("grid dimensions must be at least 1x1, got {width}x{height}")]
    EmptyGrid {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The worker pool was asked to run with no workers.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// Random fill probability outside `[0, 1]`.
    #[error("live probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    /// A cell buffer does not match the declared dimensions.
    #[error("cell buffer holds {found} cells, expected {expected}")]
    CellCount {
        /// `width * height`.
        expected: usize,
        /// Cells actually supplied.
        found: usize,
    },

    /// Text rows of a pattern have different lengths.
    #[error("pattern row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// Unknown character in a text pattern.
    #[error("unexpected character {ch:?} in pattern row {row}")]
    BadCell {
        /// Zero-based row index.
        row: usize,
        /// The rejected character.
        ch: char,
    },

    /// The OS refused to start the worker threads.
    #[error("failed to start worker pool: {0}")]
    PoolBuild(String),
}

/// Fatal failure while advancing a generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A band task panicked. Its band is never merged.
    #[error("worker fault in band at row {offset}: {message}")]
    WorkerFault {
        /// Destination row offset of the failed band.
        offset: usize,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// Fewer results came back than tasks were dispatched.
    #[error("barrier violation: dispatched {dispatched} band tasks, received {received} results")]
    BarrierViolation {
        /// Tasks handed to the pool.
        dispatched: usize,
        /// Results observed before the result channel closed.
        received: usize,
    },

    /// A cell edit addressed a coordinate outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
}
