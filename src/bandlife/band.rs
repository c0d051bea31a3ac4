//! Row-band partitioning and the per-band interior kernel.
//!
//! The interior rows `1..height-1` are split into contiguous bands, one per
//! worker. Each band is a borrowed view of its rows plus one halo row above
//! and below, taken from the current grid. Workers compute columns
//! `1..width-1` of their interior rows; the outer ring belongs to the
//! boundary pass.

use std::ops::Range;

use super::grid::Grid;
use super::rules::next_state;

/// Interior row ranges for `workers` bands over a grid of `height` rows.
///
/// Yields `min(workers, height - 2)` non-empty ranges of `(height - 2) /
/// count` rows each. Remainder rows go to the last band, so the ranges
/// always cover `1..height-1` exactly once.
pub fn band_ranges(height: usize, workers: usize) -> Vec<Range<usize>> {
    let interior = height.saturating_sub(2);
    let count = workers.min(interior);
    if count == 0 {
        return Vec::new();
    }
    let size = interior / count;
    (0..count)
        .map(|i| {
            let start = 1 + i * size;
            let end = if i + 1 == count { height - 1 } else { start + size };
            start..end
        })
        .collect()
}

/// Split `grid` into bands for `workers` workers.
///
/// Grids narrower or shorter than 3 cells have no interior and yield no
/// bands.
pub fn partition(grid: &Grid, workers: usize) -> Vec<Band<'_>> {
    if grid.width() < 3 {
        return Vec::new();
    }
    band_ranges(grid.height(), workers)
        .into_iter()
        .map(|rows| Band {
            cells: grid.row_span(rows.start - 1, rows.end + 1),
            width: grid.width(),
            offset: rows.start,
            rows: rows.len(),
        })
        .collect()
}

/// Read-only view of `rows + 2` consecutive grid rows.
#[derive(Clone, Copy, Debug)]
pub struct Band<'g> {
    pub(crate) cells: &'g [bool],
    pub(crate) width: usize,
    pub(crate) offset: usize,
    pub(crate) rows: usize,
}

impl<'g> Band<'g> {
    /// Destination row of the first interior row.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of interior rows this band computes.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Interior cells per row.
    #[inline]
    pub fn interior_width(&self) -> usize {
        self.width - 2
    }

    #[inline]
    fn row(&self, r: usize) -> &'g [bool] {
        &self.cells[r * self.width..(r + 1) * self.width]
    }
}

/// Request to compute one band's interior block.
pub struct Task<'g> {
    band: Band<'g>,
    scratch: Vec<bool>,
}

impl<'g> Task<'g> {
    /// Pair a band with a scratch buffer. The buffer is cleared and sized to
    /// the band's interior; its allocation is reused when large enough.
    pub fn new(band: Band<'g>, mut scratch: Vec<bool>) -> Self {
        scratch.clear();
        scratch.resize(band.rows * band.interior_width(), false);
        Self { band, scratch }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.band.offset
    }

    #[inline]
    pub fn band(&self) -> &Band<'g> {
        &self.band
    }

    /// Compute the interior block of this band.
    pub fn run(self) -> BandResult {
        let Self { band, mut scratch } = self;
        advance_band(&band, &mut scratch);
        BandResult {
            offset: band.offset,
            width: band.interior_width(),
            cells: scratch,
        }
    }
}

/// Computed interior block of one band, keyed by its destination row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandResult {
    offset: usize,
    width: usize,
    cells: Vec<bool>,
}

impl BandResult {
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    /// Row `r` of the block, covering grid columns `1..width-1`.
    pub fn row(&self, r: usize) -> &[bool] {
        &self.cells[r * self.width..(r + 1) * self.width]
    }

    /// Copy the block into `next` at rows `offset..offset+rows`, columns
    /// `1..width-1`.
    pub fn splice_into(&self, next: &mut Grid) {
        debug_assert_eq!(self.width + 2, next.width());
        for r in 0..self.rows() {
            let dst = next.row_mut(self.offset + r);
            dst[1..=self.width].copy_from_slice(self.row(r));
        }
    }

    /// Give back the block's buffer for reuse as a scratch buffer.
    pub fn into_cells(self) -> Vec<bool> {
        self.cells
    }
}

/// Scalar interior kernel.
///
/// Keeps a rolling window of three vertical column sums so each cell costs
/// one add and one subtract instead of a full 3x3 scan.
fn advance_band(band: &Band<'_>, out: &mut [bool]) {
    let width = band.width;
    let iw = band.interior_width();
    debug_assert_eq!(out.len(), band.rows * iw);

    for r in 0..band.rows {
        let above = band.row(r);
        let mid = band.row(r + 1);
        let below = band.row(r + 2);
        let column = |x: usize| above[x] as u8 + mid[x] as u8 + below[x] as u8;

        let dst = &mut out[r * iw..(r + 1) * iw];
        let mut west = column(0);
        let mut center = column(1);
        for x in 1..width - 1 {
            let east = column(x + 1);
            let live = west + center + east - mid[x] as u8;
            dst[x - 1] = next_state(mid[x], live);
            west = center;
            center = east;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, band_ranges, partition};
    use crate::bandlife::grid::Grid;
    use crate::bandlife::rules::step_serial;

    #[test]
    fn ranges_split_evenly() {
        assert_eq!(band_ranges(10, 4), vec![1..3, 3..5, 5..7, 7..9]);
        assert_eq!(band_ranges(10, 1), vec![1..9]);
    }

    #[test]
    fn remainder_rows_go_to_last_band() {
        assert_eq!(band_ranges(12, 3), vec![1..4, 4..7, 7..11]);
        let ranges = band_ranges(90, 12);
        assert_eq!(ranges.len(), 12);
        assert_eq!(ranges.last().unwrap().end, 89);
    }

    #[test]
    fn more_workers_than_rows_caps_band_count() {
        assert_eq!(band_ranges(5, 8), vec![1..2, 2..3, 3..4]);
        assert!(band_ranges(2, 4).is_empty());
        assert!(band_ranges(1, 1).is_empty());
    }

    #[test]
    fn bands_carry_halo_rows() {
        let grid = Grid::from_text(
            "#....
             .#...
             ..#..
             ...#.
             ....#",
        )
        .unwrap();
        let bands = partition(&grid, 2);
        assert_eq!(bands.len(), 2);
        assert_eq!((bands[0].offset(), bands[0].rows()), (1, 1));
        assert_eq!((bands[1].offset(), bands[1].rows()), (2, 2));
        assert_eq!(bands[0].cells, grid.row_span(0, 3));
        assert_eq!(bands[1].cells, grid.row_span(1, 5));
    }

    #[test]
    fn narrow_grids_have_no_bands() {
        let grid = Grid::new(2, 10).unwrap();
        assert!(partition(&grid, 3).is_empty());
    }

    #[test]
    fn task_reuses_and_zeroes_scratch() {
        let grid = Grid::new(6, 5).unwrap();
        let band = partition(&grid, 1)[0];
        let task = Task::new(band, vec![true; 64]);
        let result = task.run();
        assert_eq!(result.rows(), 3);
        assert!(result.into_cells().iter().all(|&c| !c));
    }

    #[test]
    fn band_results_match_serial_interior() {
        let grid = Grid::from_text(
            "#..#..#
             .##..#.
             #.#.##.
             .#..#.#
             ##.#..#
             ..##.#.",
        )
        .unwrap();
        let expected = step_serial(&grid);
        let mut next = grid.blank_successor();
        for band in partition(&grid, 3) {
            Task::new(band, Vec::new()).run().splice_into(&mut next);
        }
        for y in 1..grid.height() - 1 {
            assert_eq!(
                &next.row(y)[1..grid.width() - 1],
                &expected.row(y)[1..grid.width() - 1],
                "row {y}"
            );
        }
    }
}
