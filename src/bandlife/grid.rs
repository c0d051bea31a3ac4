//! Fixed-size bounded grid of cells.
//!
//! Cells are stored row-major as one `bool` per cell, so any run of whole
//! rows is a contiguous slice. Band views rely on that.

use std::fmt;

use super::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    generation: u64,
    cells: Vec<bool>,
}

impl Grid {
    /// All-dead grid at generation 0.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        Ok(Self {
            width,
            height,
            generation: 0,
            cells: vec![false; width * height],
        })
    }

    /// Grid from a row-major cell buffer.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(ConfigError::CellCount {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            generation: 0,
            cells,
        })
    }

    /// Parse a text pattern, one line per row.
    ///
    /// `#`, `O` and `*` are live, `.` and `_` are dead. Leading and trailing
    /// whitespace on each line is ignored, as are blank lines.
    pub fn from_text(text: &str) -> Result<Self, ConfigError> {
        let mut width = 0;
        let mut height = 0;
        let mut cells = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let before = cells.len();
            for ch in line.chars() {
                match ch {
                    '#' | 'O' | '*' => cells.push(true),
                    '.' | '_' => cells.push(false),
                    other => return Err(ConfigError::BadCell { row: height, ch: other }),
                }
            }
            let row_width = cells.len() - before;
            if height == 0 {
                width = row_width;
            } else if row_width != width {
                return Err(ConfigError::RaggedRows {
                    row: height,
                    expected: width,
                    found: row_width,
                });
            }
            height += 1;
        }
        Self::from_cells(width, height, cells)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of completed generation updates that produced this grid.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Cell state, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.contains(x, y).then(|| self.cells[y * self.width + x])
    }

    /// Cell state; coordinates outside the grid read as dead.
    #[inline]
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y).unwrap_or(false)
    }

    /// Set a cell. Returns `false` and leaves the grid alone when out of range.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.put(x, y, alive);
        true
    }

    /// Count live cells among the up-to-8 Moore neighbors of `(x, y)`.
    ///
    /// Ranges are clipped at every edge: corner cells have 3 neighbors,
    /// other edge cells 5, interior cells 8.
    pub fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        debug_assert!(self.contains(x, y));
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(self.width - 1);
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(self.height - 1);
        let mut count = 0u8;
        for ny in y0..=y1 {
            let row = self.row(ny);
            for nx in x0..=x1 {
                count += row[nx] as u8;
            }
        }
        count - self.cells[y * self.width + x] as u8
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[bool] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(self.width)
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().filter(|&&alive| alive).count() as u64
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.contains(&true)
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        for (y, row) in self.rows().enumerate() {
            for (x, _) in row.iter().enumerate().filter(|(_, alive)| **alive) {
                f(x, y);
            }
        }
    }

    /// Row-major view of rows `start..end`.
    #[inline]
    pub(crate) fn row_span(&self, start: usize, end: usize) -> &[bool] {
        &self.cells[start * self.width..end * self.width]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [bool] {
        let start = y * self.width;
        &mut self.cells[start..start + self.width]
    }

    #[inline(always)]
    pub(crate) fn put(&mut self, x: usize, y: usize, alive: bool) {
        self.cells[y * self.width + x] = alive;
    }

    /// All-dead grid of the same shape, one generation ahead.
    pub(crate) fn blank_successor(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            generation: self.generation + 1,
            cells: vec![false; self.cells.len()],
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                f.write_str("\n")?;
            }
            for &alive in row {
                f.write_str(if alive { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}
