//! Serial computation of the outer ring.
//!
//! The ring is every cell with `y` in `{0, height-1}` or `x` in
//! `{0, width-1}`. No band covers it, so the coordinator fills it directly
//! from the current grid using clipped neighbor counts.

use super::grid::Grid;
use super::rules::next_state;

/// Visit each ring cell of a `width` x `height` grid exactly once.
pub fn for_each_ring_cell<F: FnMut(usize, usize)>(width: usize, height: usize, mut f: F) {
    if width == 0 || height == 0 {
        return;
    }
    let last_x = width - 1;
    let last_y = height - 1;

    for x in 0..width {
        f(x, 0);
        if last_y > 0 {
            f(x, last_y);
        }
    }
    for y in 1..last_y {
        f(0, y);
        if last_x > 0 {
            f(last_x, y);
        }
    }
}

/// Write the next state of every ring cell of `current` into `next`.
pub fn reconcile(current: &Grid, next: &mut Grid) {
    debug_assert_eq!(
        (current.width(), current.height()),
        (next.width(), next.height())
    );
    for_each_ring_cell(current.width(), current.height(), |x, y| {
        let alive = current.is_alive(x, y);
        next.put(x, y, next_state(alive, current.live_neighbors(x, y)));
    });
}

/// Number of ring cells in a `width` x `height` grid.
pub fn ring_len(width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        0
    } else if width < 3 || height < 3 {
        width * height
    } else {
        2 * width + 2 * (height - 2)
    }
}
