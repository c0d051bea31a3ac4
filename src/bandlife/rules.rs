//! B3/S23 rule evaluation and the single-threaded reference step.

use super::grid::Grid;

/// Next state of a cell given its current state and live Moore neighbors.
///
/// Neighbors outside the grid are simply absent from `live_neighbors`.
#[inline(always)]
pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    matches!((alive, live_neighbors), (true, 2) | (_, 3))
}

/// Advance `grid` one generation on the calling thread.
///
/// Every cell is evaluated against its clipped neighborhood. The parallel
/// engine must agree with this bit for bit.
pub fn step_serial(grid: &Grid) -> Grid {
    let mut next = grid.blank_successor();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let alive = grid.is_alive(x, y);
            next.put(x, y, next_state(alive, grid.live_neighbors(x, y)));
        }
    }
    next
}
