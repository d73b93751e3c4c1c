//! Folding per-sample reports into set averages and comparing two sets.
//!
//! Means are plain arithmetic means. An empty set is an error rather than
//! a silent zero, since the mean coverage of nothing usually points at a
//! misconfigured run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coverage::CoverageReport;
use crate::sample::SampleStats;
use crate::types::{MetricsError, QuadrantGrid, round_to};

/// Averages over a set of coverage reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of reports folded in.
    pub sample_count: usize,
    /// Mean of `coverage_pct`.
    pub coverage_pct: f64,
    /// Cell-wise mean of `quadrant_coverage`, one decimal.
    pub quadrant_coverage: QuadrantGrid<f64>,
}

/// Average coverage across `reports`.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyInput`] if `reports` is empty.
/// Returns [`MetricsError::ShapeMismatch`] if the quadrant grids do not
/// all share the shape of the first report's grid.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(reports: &[CoverageReport]) -> Result<AggregateStats, MetricsError> {
    let (first, rest) = reports.split_first().ok_or(MetricsError::EmptyInput)?;

    let mut sums = first.quadrant_coverage.clone();
    for report in rest {
        sums = sums.zip_with(&report.quadrant_coverage, |a, b| a + b)?;
    }

    let n = reports.len() as f64;
    let coverage_pct = reports.iter().map(|r| r.coverage_pct).sum::<f64>() / n;
    let quadrant_coverage = sums.map(|sum| round_to(sum / n, 1));

    Ok(AggregateStats {
        sample_count: reports.len(),
        coverage_pct,
        quadrant_coverage,
    })
}

/// Direction of a generated-minus-reference difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLabel {
    /// Generated has more coverage than reference.
    Denser,
    /// Generated has the same or less coverage.
    Sparser,
}

impl DiffLabel {
    /// `Denser` for strictly positive differences, `Sparser` otherwise.
    #[must_use]
    pub fn of(diff: f64) -> Self {
        if diff > 0.0 {
            Self::Denser
        } else {
            Self::Sparser
        }
    }
}

impl fmt::Display for DiffLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Denser => "denser",
            Self::Sparser => "sparser",
        })
    }
}

/// A signed difference and its label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignedDiff {
    /// `generated - reference`.
    pub value: f64,
    /// Sign of `value`.
    pub label: DiffLabel,
}

impl SignedDiff {
    fn between(reference: f64, generated: f64) -> Self {
        let value = generated - reference;
        Self {
            value,
            label: DiffLabel::of(value),
        }
    }

    /// Round the value and relabel, so float noise around zero reads as
    /// sparser.
    fn rounded(self, decimals: i32) -> Self {
        Self::between(0.0, round_to(self.value, decimals))
    }
}

/// Generated-versus-reference comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Difference of mean coverage.
    pub coverage: SignedDiff,
    /// Cell-wise difference of mean quadrant coverage, each labelled on
    /// its own. Values are rounded to one decimal like their inputs.
    pub quadrants: QuadrantGrid<SignedDiff>,
}

/// Compare generated averages against reference averages.
///
/// # Examples
///
/// ```
/// use strokecmp_metrics::{AggregateStats, DiffLabel, QuadrantGrid, diff};
///
/// let stats = |pct: f64| AggregateStats {
///     sample_count: 1,
///     coverage_pct: pct,
///     quadrant_coverage: QuadrantGrid::from_fn(1, 1, |_, _| pct),
/// };
/// let report = diff(&stats(12.0), &stats(15.0)).unwrap();
/// assert_eq!(report.coverage.value, 3.0);
/// assert_eq!(report.coverage.label, DiffLabel::Denser);
/// ```
///
/// # Errors
///
/// Returns [`MetricsError::ShapeMismatch`] if the quadrant grids differ
/// in shape.
pub fn diff(
    reference: &AggregateStats,
    generated: &AggregateStats,
) -> Result<DiffReport, MetricsError> {
    let quadrants = reference
        .quadrant_coverage
        .zip_with(&generated.quadrant_coverage, |r, g| {
            SignedDiff::between(r, g).rounded(1)
        })?;
    Ok(DiffReport {
        coverage: SignedDiff::between(reference.coverage_pct, generated.coverage_pct),
        quadrants,
    })
}

/// Averages of the structural metrics of generated samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureSummary {
    /// Number of samples folded in.
    pub sample_count: usize,
    /// Mean total edge count.
    pub mean_total_edges: f64,
    /// Mean edge density.
    pub mean_edge_density: f64,
    /// Mean number of paths.
    pub mean_path_count: f64,
    /// Mean of the per-sample average chain length.
    pub mean_avg_chain: f64,
    /// Longest chain in any sample.
    pub max_chain: usize,
}

/// Average the structural metrics of `samples`.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyInput`] if `samples` is empty.
#[allow(clippy::cast_precision_loss)]
pub fn summarize_structure(samples: &[SampleStats]) -> Result<StructureSummary, MetricsError> {
    if samples.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    let n = samples.len() as f64;
    let mean = |f: fn(&SampleStats) -> f64| samples.iter().map(f).sum::<f64>() / n;

    Ok(StructureSummary {
        sample_count: samples.len(),
        mean_total_edges: mean(|s| s.edges.total_edges as f64),
        mean_edge_density: mean(|s| s.edges.edge_density),
        mean_path_count: mean(|s| s.path_count as f64),
        mean_avg_chain: mean(|s| s.avg_chain),
        max_chain: samples.iter().map(|s| s.max_chain).max().unwrap_or(0),
    })
}
