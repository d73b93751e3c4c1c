//! Shared types for the strokecmp metrics engine.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Re-export `RgbaImage` so downstream crates can hand pixel buffers to
/// the analyzer without depending on `image` directly.
///
/// This is the pixel buffer every coverage analysis consumes: row-major
/// RGBA8 data with explicit width and height.
pub use image::RgbaImage;

/// A fixed-shape `rows x cols` matrix with one value per quadrant cell.
///
/// Cells are stored row-major. Serialized as a nested array of rows
/// (`[[a, b], [c, d]]`) so JSON output reads the same way the grid is laid
/// over the image.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantGrid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Copy> QuadrantGrid<T> {
    /// Build a grid by evaluating `f(row, col)` for every cell.
    #[must_use]
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    /// Build a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::MalformedGrid`] if there are no rows, a row
    /// is empty, or the rows differ in length.
    pub fn try_from_rows(rows: Vec<Vec<T>>) -> Result<Self, MetricsError> {
        let row_count = rows.len();
        let col_count = rows.first().map_or(0, Vec::len);
        if row_count == 0 || col_count == 0 {
            return Err(MetricsError::MalformedGrid(
                "quadrant grid must have at least one row and one column".to_string(),
            ));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != col_count) {
            return Err(MetricsError::MalformedGrid(format!(
                "row {idx} has {} cells, expected {col_count}",
                row.len()
            )));
        }
        Ok(Self {
            rows: row_count,
            cols: col_count,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of quadrant rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of quadrant columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Value of the cell at `(row, col)`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Iterate over the grid one row slice at a time.
    pub fn row_slices(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Apply `f` to every cell.
    #[must_use]
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> QuadrantGrid<U> {
        QuadrantGrid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().copied().map(f).collect(),
        }
    }

    /// Combine two grids of identical shape cell by cell.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::ShapeMismatch`] if the shapes differ.
    pub fn zip_with<U: Copy, V: Copy>(
        &self,
        other: &QuadrantGrid<U>,
        mut f: impl FnMut(T, U) -> V,
    ) -> Result<QuadrantGrid<V>, MetricsError> {
        if self.shape() != other.shape() {
            return Err(MetricsError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        Ok(QuadrantGrid {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .zip(other.cells())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

impl<T: Serialize> Serialize for QuadrantGrid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.chunks(self.cols.max(1)))
    }
}

impl<'de, T: Deserialize<'de> + Copy> Deserialize<'de> for QuadrantGrid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;
        Self::try_from_rows(rows).map_err(serde::de::Error::custom)
    }
}

/// Configuration for pixel coverage analysis.
///
/// Brightness is the mean of the R, G and B channels; a pixel counts as
/// white only when its brightness is strictly greater than
/// `brightness_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Number of quadrant rows laid over the image.
    pub quadrant_rows: u32,
    /// Number of quadrant columns laid over the image.
    pub quadrant_cols: u32,
    /// Brightness cutoff in `0.0..=255.0`.
    pub brightness_threshold: f64,
}

impl CoverageConfig {
    /// Default quadrant row count.
    pub const DEFAULT_QUADRANT_ROWS: u32 = 2;
    /// Default quadrant column count.
    pub const DEFAULT_QUADRANT_COLS: u32 = 4;
    /// Default brightness threshold (mid-gray).
    pub const DEFAULT_BRIGHTNESS_THRESHOLD: f64 = 128.0;

    /// Check the configuration before scanning any pixels.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::InvalidConfig`] if either quadrant dimension
    /// is zero or the threshold is outside `0.0..=255.0`.
    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.quadrant_rows == 0 || self.quadrant_cols == 0 {
            return Err(MetricsError::InvalidConfig(format!(
                "quadrant grid must be at least 1x1, got {}x{}",
                self.quadrant_rows, self.quadrant_cols
            )));
        }
        if !(0.0..=255.0).contains(&self.brightness_threshold) {
            return Err(MetricsError::InvalidConfig(format!(
                "brightness threshold must be within 0..=255, got {}",
                self.brightness_threshold
            )));
        }
        Ok(())
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            quadrant_rows: Self::DEFAULT_QUADRANT_ROWS,
            quadrant_cols: Self::DEFAULT_QUADRANT_COLS,
            brightness_threshold: Self::DEFAULT_BRIGHTNESS_THRESHOLD,
        }
    }
}

/// Node-grid geometry of one stroke-graph panel.
///
/// Horizontal edges join `(r, c)` to `(r, c + 1)`, vertical edges join
/// `(r, c)` to `(r + 1, c)`. `diagonal_slots` is the number of places a
/// diagonal or arc edge can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTopology {
    /// Node rows.
    pub rows: usize,
    /// Node columns.
    pub cols: usize,
    /// Possible diagonal/arc edge positions.
    pub diagonal_slots: usize,
}

impl GridTopology {
    /// Default node rows.
    pub const DEFAULT_ROWS: usize = 5;
    /// Default node columns.
    pub const DEFAULT_COLS: usize = 17;

    /// Topology with one diagonal slot per grid cell.
    #[must_use]
    pub const fn with_cell_diagonals(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            diagonal_slots: rows.saturating_sub(1) * cols.saturating_sub(1),
        }
    }

    /// Number of horizontal edge positions: `rows * (cols - 1)`.
    #[must_use]
    pub const fn horizontal_slots(&self) -> usize {
        self.rows * self.cols.saturating_sub(1)
    }

    /// Number of vertical edge positions: `(rows - 1) * cols`.
    #[must_use]
    pub const fn vertical_slots(&self) -> usize {
        self.rows.saturating_sub(1) * self.cols
    }

    /// Every edge a panel with this topology could possibly draw.
    ///
    /// # Examples
    ///
    /// ```
    /// use strokecmp_metrics::GridTopology;
    ///
    /// // 80 horizontal + 68 vertical + 64 diagonal slots.
    /// assert_eq!(GridTopology::default().max_possible_edges(), 212);
    /// ```
    #[must_use]
    pub const fn max_possible_edges(&self) -> usize {
        self.horizontal_slots() + self.vertical_slots() + self.diagonal_slots
    }
}

impl Default for GridTopology {
    fn default() -> Self {
        Self::with_cell_diagonals(Self::DEFAULT_ROWS, Self::DEFAULT_COLS)
    }
}

/// All tunable constants of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Pixel coverage settings.
    pub coverage: CoverageConfig,
    /// Edge grid geometry shared by every panel.
    pub topology: GridTopology,
}

/// Errors that can occur while computing metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to decode an image file into a pixel buffer.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyImageData,

    /// The pixel buffer has a zero dimension or inconsistent data length.
    #[error("invalid pixel buffer ({width}x{height}): {reason}")]
    InvalidBuffer {
        /// Buffer width in pixels.
        width: u32,
        /// Buffer height in pixels.
        height: u32,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Analysis configuration is invalid.
    #[error("invalid metrics configuration: {0}")]
    InvalidConfig(String),

    /// An edge grid does not match its topology.
    #[error("invalid edge grid: {0}")]
    InvalidGrid(String),

    /// A nested quadrant matrix is empty or ragged.
    #[error("malformed quadrant grid: {0}")]
    MalformedGrid(String),

    /// Aggregation was asked to summarize zero samples.
    #[error("cannot aggregate an empty sample set")]
    EmptyInput,

    /// Two quadrant matrices that must line up have different shapes.
    #[error("quadrant grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// `(rows, cols)` of the first matrix.
        expected: (usize, usize),
        /// `(rows, cols)` of the offending matrix.
        found: (usize, usize),
    },
}

/// Round `value` to `decimals` places, half away from zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// `part / whole * 100`, or 0 when `whole` is zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
