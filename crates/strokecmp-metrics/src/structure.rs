//! Structural decomposition of a stroke drawing.
//!
//! Two independent measurements:
//!
//! - [`count_edges`] walks a panel's node grid and tallies drawn edges by
//!   type (horizontal, vertical, arc, diagonal) against the maximum the
//!   grid topology allows.
//! - [`extract_chains`] tokenizes each path's `d` string and records its
//!   number of drawing segments.
//!
//! # Strategy pattern
//!
//! Edge counting works against the [`EdgeSource`] trait, so any stroke
//! generator that can answer presence queries can be measured. [`EdgeGrid`]
//! is the concrete implementation loaded from JSON.

use serde::{Deserialize, Deserializer, Serialize};

use crate::path_data;
use crate::types::{GridTopology, MetricsError, round_to};

/// Type tag of a non-orthogonal edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagonalKind {
    /// Curved connection.
    Arc,
    /// Straight diagonal connection.
    #[serde(alias = "diag")]
    Diagonal,
}

/// A diagonal or arc edge crossing one grid cell.
///
/// The anchor `(row, col)` is the cell's top-left node, so it spans nodes
/// `(row, col)` to `(row + 1, col + 1)`. Each cell holds at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagonalEdge {
    /// Anchor cell row.
    pub row: usize,
    /// Anchor cell column.
    pub col: usize,
    /// Arc or straight diagonal.
    #[serde(rename = "type")]
    pub kind: DiagonalKind,
}

/// Read access to one panel of a stroke graph.
pub trait EdgeSource {
    /// Grid geometry the queries range over.
    fn topology(&self) -> GridTopology;

    /// Whether an edge joins `(row, col)` and `(row, col + 1)`.
    fn has_horizontal(&self, row: usize, col: usize) -> bool;

    /// Whether an edge joins `(row, col)` and `(row + 1, col)`.
    fn has_vertical(&self, row: usize, col: usize) -> bool;

    /// Every diagonal and arc edge in the panel.
    fn diagonal_edges(&self) -> &[DiagonalEdge];
}

/// Serialized form of one panel, before it is checked against a topology.
///
/// `horizontal[r][c]` is the edge `(r, c)-(r, c+1)`; `vertical[r][c]` is
/// the edge `(r, c)-(r+1, c)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeGridData {
    /// `rows x (cols - 1)` presence matrix.
    pub horizontal: Vec<Vec<bool>>,
    /// `(rows - 1) x cols` presence matrix.
    pub vertical: Vec<Vec<bool>>,
    /// Diagonal and arc edges.
    pub diagonals: Vec<DiagonalEdge>,
}

impl EdgeGridData {
    /// An all-empty panel shaped for `topology`.
    #[must_use]
    pub fn empty(topology: GridTopology) -> Self {
        Self {
            horizontal: vec![vec![false; topology.cols.saturating_sub(1)]; topology.rows],
            vertical: vec![vec![false; topology.cols]; topology.rows.saturating_sub(1)],
            diagonals: Vec::new(),
        }
    }

    /// Validate against `topology` and build an [`EdgeGrid`].
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::InvalidGrid`] if a presence matrix has the
    /// wrong shape, a diagonal is anchored outside the cell grid, two
    /// diagonals share a cell, or there are more diagonals than the
    /// topology has diagonal slots.
    pub fn into_grid(self, topology: GridTopology) -> Result<EdgeGrid, MetricsError> {
        let horizontal = flatten_checked(
            "horizontal",
            self.horizontal,
            topology.rows,
            topology.cols.saturating_sub(1),
        )?;
        let vertical = flatten_checked(
            "vertical",
            self.vertical,
            topology.rows.saturating_sub(1),
            topology.cols,
        )?;

        let cell_rows = topology.rows.saturating_sub(1);
        let cell_cols = topology.cols.saturating_sub(1);
        let mut occupied = vec![false; cell_rows * cell_cols];
        for edge in &self.diagonals {
            if edge.row >= cell_rows || edge.col >= cell_cols {
                return Err(MetricsError::InvalidGrid(format!(
                    "diagonal anchored at ({}, {}) is outside the {cell_rows}x{cell_cols} cell grid",
                    edge.row, edge.col
                )));
            }
            let cell = &mut occupied[edge.row * cell_cols + edge.col];
            if *cell {
                return Err(MetricsError::InvalidGrid(format!(
                    "more than one diagonal anchored at ({}, {})",
                    edge.row, edge.col
                )));
            }
            *cell = true;
        }
        if self.diagonals.len() > topology.diagonal_slots {
            return Err(MetricsError::InvalidGrid(format!(
                "{} diagonal edges exceed the {} available slots",
                self.diagonals.len(),
                topology.diagonal_slots
            )));
        }

        Ok(EdgeGrid {
            topology,
            horizontal,
            vertical,
            diagonals: self.diagonals,
        })
    }
}

/// Flatten a nested presence matrix, checking it is exactly `rows x cols`.
fn flatten_checked(
    name: &str,
    matrix: Vec<Vec<bool>>,
    rows: usize,
    cols: usize,
) -> Result<Vec<bool>, MetricsError> {
    if matrix.len() != rows {
        return Err(MetricsError::InvalidGrid(format!(
            "{name} matrix has {} rows, expected {rows}",
            matrix.len()
        )));
    }
    if let Some((idx, row)) = matrix.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(MetricsError::InvalidGrid(format!(
            "{name} row {idx} has {} entries, expected {cols}",
            row.len()
        )));
    }
    Ok(matrix.into_iter().flatten().collect())
}

/// One validated stroke-graph panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeGrid {
    topology: GridTopology,
    horizontal: Vec<bool>,
    vertical: Vec<bool>,
    diagonals: Vec<DiagonalEdge>,
}

impl EdgeSource for EdgeGrid {
    fn topology(&self) -> GridTopology {
        self.topology
    }

    fn has_horizontal(&self, row: usize, col: usize) -> bool {
        let cols = self.topology.cols.saturating_sub(1);
        row < self.topology.rows
            && col < cols
            && self
                .horizontal
                .get(row * cols + col)
                .copied()
                .unwrap_or(false)
    }

    fn has_vertical(&self, row: usize, col: usize) -> bool {
        let cols = self.topology.cols;
        row < self.topology.rows.saturating_sub(1)
            && col < cols
            && self.vertical.get(row * cols + col).copied().unwrap_or(false)
    }

    fn diagonal_edges(&self) -> &[DiagonalEdge] {
        &self.diagonals
    }
}

/// Edge tallies for one panel or a whole multi-panel sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeCounts {
    /// Horizontal edges drawn.
    pub h_edges: usize,
    /// Vertical edges drawn.
    pub v_edges: usize,
    /// Arc edges drawn.
    pub arcs: usize,
    /// Straight diagonal edges drawn.
    pub diags: usize,
    /// Sum of the four counts above.
    pub total_edges: usize,
    /// Edges the topology could hold, summed over panels.
    pub max_possible_edges: usize,
    /// `total_edges / max_possible_edges * 100`, one decimal, at most 100.
    pub edge_density: f64,
}

impl EdgeCounts {
    /// Assemble counts and derive total and density.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(h_edges: usize, v_edges: usize, arcs: usize, diags: usize, max: usize) -> Self {
        let total_edges = h_edges + v_edges + arcs + diags;
        let edge_density = if max == 0 {
            0.0
        } else {
            round_to(total_edges as f64 / max as f64 * 100.0, 1).min(100.0)
        };
        Self {
            h_edges,
            v_edges,
            arcs,
            diags,
            total_edges,
            max_possible_edges: max,
            edge_density,
        }
    }
}

/// Count the edges drawn in one panel.
///
/// Horizontal presence is summed over every `(r, c)` with `c < cols - 1`,
/// vertical over every `(r, c)` with `r < rows - 1`; the diagonal list is
/// split by its type tag.
///
/// # Examples
///
/// ```
/// use strokecmp_metrics::{EdgeGridData, GridTopology, count_edges};
///
/// let topology = GridTopology::default();
/// let mut data = EdgeGridData::empty(topology);
/// data.horizontal[0][0] = true;
/// let counts = count_edges(&data.into_grid(topology).unwrap());
/// assert_eq!(counts.total_edges, 1);
/// assert_eq!(counts.max_possible_edges, 212);
/// assert_eq!(counts.edge_density, 0.5);
/// ```
pub fn count_edges<S: EdgeSource + ?Sized>(source: &S) -> EdgeCounts {
    let topo = source.topology();

    let mut h_edges = 0;
    for row in 0..topo.rows {
        for col in 0..topo.cols.saturating_sub(1) {
            if source.has_horizontal(row, col) {
                h_edges += 1;
            }
        }
    }

    let mut v_edges = 0;
    for row in 0..topo.rows.saturating_sub(1) {
        for col in 0..topo.cols {
            if source.has_vertical(row, col) {
                v_edges += 1;
            }
        }
    }

    let (arcs, diags) = source
        .diagonal_edges()
        .iter()
        .fold((0, 0), |(arcs, diags), edge| match edge.kind {
            DiagonalKind::Arc => (arcs + 1, diags),
            DiagonalKind::Diagonal => (arcs, diags + 1),
        });

    let counts = EdgeCounts::new(h_edges, v_edges, arcs, diags, topo.max_possible_edges());
    if counts.total_edges > counts.max_possible_edges {
        tracing::warn!(
            total_edges = counts.total_edges,
            max_possible_edges = counts.max_possible_edges,
            "edge source reports more edges than its topology allows"
        );
    }
    counts
}

/// Count the edges of a sample spread over several panels.
///
/// Each panel contributes its own maximum, so the density of the sample
/// stays within `0..=100` however many panels the text needed.
pub fn count_panel_edges<S: EdgeSource>(panels: &[S]) -> EdgeCounts {
    let (h, v, arcs, diags, max) = panels.iter().map(count_edges).fold(
        (0, 0, 0, 0, 0),
        |(h, v, a, d, m), c| {
            (
                h + c.h_edges,
                v + c.v_edges,
                a + c.arcs,
                d + c.diags,
                m + c.max_possible_edges,
            )
        },
    );
    EdgeCounts::new(h, v, arcs, diags, max)
}

/// Segment counts of non-empty chains, in path order.
///
/// Every value is at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ChainLengths(Vec<usize>);

impl ChainLengths {
    /// Keep the non-zero counts, preserving order.
    #[must_use]
    pub fn from_counts(counts: impl IntoIterator<Item = usize>) -> Self {
        Self(counts.into_iter().filter(|&n| n > 0).collect())
    }

    /// The chain lengths.
    #[must_use]
    pub fn values(&self) -> &[usize] {
        &self.0
    }

    /// Number of chains.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no chains.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total segments across all chains.
    #[must_use]
    pub fn total_segments(&self) -> usize {
        self.0.iter().sum()
    }

    /// Mean chain length rounded to one decimal, 0 when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn avg_chain(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            round_to(self.total_segments() as f64 / self.0.len() as f64, 1)
        }
    }

    /// Longest chain, 0 when empty.
    #[must_use]
    pub fn max_chain(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

impl<'de> Deserialize<'de> for ChainLengths {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<usize>::deserialize(deserializer)?;
        if values.contains(&0) {
            return Err(serde::de::Error::custom(
                "chain lengths must be at least 1",
            ));
        }
        Ok(Self(values))
    }
}

/// Result of decomposing a set of paths into chains.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainExtraction {
    /// Segment count of every path, zeros included.
    pub raw_counts: Vec<usize>,
    /// Non-empty chains only.
    pub chains: ChainLengths,
    /// Paths with no drawing segment.
    pub degenerate_paths: usize,
    /// Tokens the tokenizer ignored across all paths.
    pub skipped_tokens: usize,
}

impl ChainExtraction {
    /// Number of paths examined.
    #[must_use]
    pub const fn path_count(&self) -> usize {
        self.raw_counts.len()
    }
}

/// Measure the segment count of every path `d` string.
///
/// Paths with zero segments (a lone move, an empty string, garbage) are
/// kept in [`ChainExtraction::raw_counts`] but left out of
/// [`ChainExtraction::chains`].
///
/// # Examples
///
/// ```
/// use strokecmp_metrics::extract_chains;
///
/// let result = extract_chains(&["M0 0H10V10L5 5", "M0 0"]);
/// assert_eq!(result.chains.values(), &[3]);
/// assert_eq!(result.raw_counts, vec![3, 0]);
/// assert_eq!(result.chains.avg_chain(), 3.0);
/// assert_eq!(result.chains.max_chain(), 3);
/// ```
pub fn extract_chains<P: AsRef<str>>(path_data: &[P]) -> ChainExtraction {
    let mut raw_counts = Vec::with_capacity(path_data.len());
    let mut skipped_tokens = 0;
    for data in path_data {
        let parsed = path_data::tokenize(data.as_ref());
        skipped_tokens += parsed.skipped;
        raw_counts.push(parsed.segment_count());
    }

    let chains = ChainLengths::from_counts(raw_counts.iter().copied());
    let degenerate_paths = raw_counts.len() - chains.len();
    if degenerate_paths > 0 {
        tracing::debug!(
            degenerate_paths,
            "zero-segment paths excluded from chain lengths"
        );
    }

    ChainExtraction {
        raw_counts,
        chains,
        degenerate_paths,
        skipped_tokens,
    }
}
