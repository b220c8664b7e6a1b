/**
 * Residual and Output Fields
 *
 * The residual field holds the unresolved quantization error of every pixel,
 * surrounded by a two-cell padding ring so that the 5×5 diffusion window of
 * any interior pixel stays in bounds. Coordinates used throughout the crate
 * are padded coordinates: interior pixel (y, x) lives at (y + 2, x + 2).
 */

use std::cmp::Ordering;
use std::ops::Range;

use crate::kernel::{DiffusionKernel, KERNEL_RADIUS, KERNEL_SIZE};

/// Width of the padding ring around the image
pub const BORDER: usize = KERNEL_RADIUS;

/// State of one residual field cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// Pixel still waiting to be quantized, with its current residual
    Unresolved(f64),
    /// Pixel already quantized
    Resolved,
    /// Border cell outside the image
    Padding,
}

/// Sign of a residual
///
/// Ordered negative, zero, positive: this is the first tie-break between
/// candidates of equal magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sign {
    /// Residual below zero
    Negative,
    /// Residual exactly zero
    Zero,
    /// Residual above zero
    Positive,
}

impl Sign {
    /// Sign of `value`
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Sign::Positive
        } else if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    /// -1, 0 or 1
    pub fn as_f64(self) -> f64 {
        match self {
            Sign::Negative => -1.0,
            Sign::Zero => 0.0,
            Sign::Positive => 1.0,
        }
    }
}

/// Rectangular region of the padded field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First row
    pub row: usize,
    /// First column
    pub col: usize,
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
}

impl Window {
    /// The diffusion footprint centered on (`row`, `col`)
    ///
    /// The center must be at least `BORDER` cells away from the top and left
    /// edges, which holds for every interior cell.
    pub fn centered(row: usize, col: usize) -> Self {
        Self {
            row: row - KERNEL_RADIUS,
            col: col - KERNEL_RADIUS,
            height: KERNEL_SIZE,
            width: KERNEL_SIZE,
        }
    }

    /// Row range covered by the window
    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.height
    }

    /// Column range covered by the window
    pub fn cols(&self) -> Range<usize> {
        self.col..self.col + self.width
    }

    /// Whether (`row`, `col`) falls inside the window
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }
}

/**
 * A pixel eligible for resolution
 *
 * Snapshot of a cell's residual at the time the candidate was generated.
 * Candidates order by (key, sign, row, col) ascending, where key = -|value|,
 * so the smallest candidate is the one with the largest error and ties are
 * broken deterministically.
 */
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Negated magnitude of the residual
    pub key: f64,
    /// Sign of the residual
    pub sign: Sign,
    /// Padded row
    pub row: usize,
    /// Padded column
    pub col: usize,
}

impl Candidate {
    /// Candidate for cell (`row`, `col`) holding `value`
    pub fn new(value: f64, row: usize, col: usize) -> Self {
        Self {
            key: -value.abs(),
            sign: Sign::of(value),
            row,
            col,
        }
    }

    /// Absolute residual at generation time
    pub fn magnitude(&self) -> f64 {
        -self.key
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then(self.sign.cmp(&other.sign))
            .then(self.row.cmp(&other.row))
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Padded grid of residuals
#[derive(Debug, Clone)]
pub struct ResidualField {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    discarded: f64,
}

impl ResidualField {
    /**
     * Build the field from row-major lightness values in [0, 1]
     *
     * Each interior cell starts at `lightness - 0.5`; the border is padding.
     * `lightness.len()` must equal `width * height`.
     */
    pub fn from_lightness(lightness: &[f64], width: usize, height: usize) -> Self {
        debug_assert_eq!(lightness.len(), width * height);

        let padded_width = width + 2 * BORDER;
        let padded_height = height + 2 * BORDER;
        let mut cells = vec![Cell::Padding; padded_width * padded_height];

        for (y, row) in lightness.chunks_exact(width.max(1)).enumerate() {
            let start = (y + BORDER) * padded_width + BORDER;
            for (cell, &value) in cells[start..start + width].iter_mut().zip(row) {
                *cell = Cell::Unresolved(value - 0.5);
            }
        }

        Self {
            width: padded_width,
            height: padded_height,
            cells,
            discarded: 0.0,
        }
    }

    /// Padded width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Padded height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells including padding
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the field has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of (`row`, `col`)
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Cell at (`row`, `col`)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    /// Window covering every cell
    pub fn whole(&self) -> Window {
        Window {
            row: 0,
            col: 0,
            height: self.height,
            width: self.width,
        }
    }

    /// Candidates for every unresolved cell in `window`, row-major
    pub fn enumerate(&self, window: Window) -> impl Iterator<Item = Candidate> + '_ {
        window.rows().flat_map(move |row| {
            window.cols().filter_map(move |col| match self.get(row, col) {
                Cell::Unresolved(value) => Some(Candidate::new(value, row, col)),
                Cell::Resolved | Cell::Padding => None,
            })
        })
    }

    /**
     * Mark (`row`, `col`) resolved
     *
     * Returns the last residual of the cell, or `None` if it was not
     * unresolved.
     */
    pub fn resolve(&mut self, row: usize, col: usize) -> Option<f64> {
        let idx = self.index(row, col);
        match self.cells[idx] {
            Cell::Unresolved(value) => {
                self.cells[idx] = Cell::Resolved;
                Some(value)
            }
            Cell::Resolved | Cell::Padding => None,
        }
    }

    /**
     * Spread `error` over the 5×5 window centered on (`row`, `col`)
     *
     * Only unresolved cells receive error. The share that lands on resolved
     * or padding cells is lost and tallied in `discarded()`.
     */
    pub fn diffuse(&mut self, row: usize, col: usize, error: f64, kernel: &DiffusionKernel) {
        let window = Window::centered(row, col);

        for (ky, r) in window.rows().enumerate() {
            for (kx, c) in window.cols().enumerate() {
                let share = error * kernel.weight(ky, kx);
                let idx = self.index(r, c);
                match &mut self.cells[idx] {
                    Cell::Unresolved(value) => *value += share,
                    Cell::Resolved | Cell::Padding => self.discarded += share,
                }
            }
        }
    }

    /// Sum of all unresolved residuals
    pub fn residual_mass(&self) -> f64 {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Unresolved(value) => *value,
                Cell::Resolved | Cell::Padding => 0.0,
            })
            .sum()
    }

    /// Total diffused error that fell on resolved or padding cells
    pub fn discarded(&self) -> f64 {
        self.discarded
    }

    /// Number of cells still unresolved
    pub fn unresolved_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, Cell::Unresolved(_)))
            .count()
    }
}

/// Quantized value of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Dark output pixel
    Black,
    /// Bright output pixel
    White,
}

impl Level {
    /// Level a residual of the given sign quantizes to
    ///
    /// A zero residual quantizes to black.
    pub fn from_sign(sign: Sign) -> Self {
        match sign {
            Sign::Positive => Level::White,
            Sign::Zero | Sign::Negative => Level::Black,
        }
    }
}

/// Padded grid of quantized pixels, each assigned at most once
#[derive(Debug, Clone)]
pub struct OutputField {
    width: usize,
    height: usize,
    cells: Vec<Option<Level>>,
}

impl OutputField {
    /// Unset field with the given padded dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Level at padded (`row`, `col`), if assigned
    pub fn get(&self, row: usize, col: usize) -> Option<Level> {
        self.cells[row * self.width + col]
    }

    /// Assign (`row`, `col`); returns `false` if it was already assigned
    pub fn assign(&mut self, row: usize, col: usize, level: Level) -> bool {
        let slot = &mut self.cells[row * self.width + col];
        if slot.is_some() {
            return false;
        }
        *slot = Some(level);
        true
    }

    fn interior(&self) -> impl Iterator<Item = Option<Level>> + '_ {
        (BORDER..self.height.saturating_sub(BORDER)).flat_map(move |row| {
            let start = row * self.width;
            self.cells[start + BORDER..start + self.width - BORDER]
                .iter()
                .copied()
        })
    }

    /// Number of interior cells still unset
    pub fn unset_count(&self) -> usize {
        self.interior().filter(Option::is_none).count()
    }

    /// Interior as row-major bytes, or `None` if any cell is unset
    pub fn to_bytes(&self, black: u8, white: u8) -> Option<Vec<u8>> {
        self.interior()
            .map(|level| {
                level.map(|level| match level {
                    Level::Black => black,
                    Level::White => white,
                })
            })
            .collect()
    }
}
