//! strokecmp-metrics: Comparison metrics for generated stroke drawings (sans-IO).
//!
//! Measures how a set of generated drawings differs from a set of
//! reference drawings along two axes:
//!
//! - pixel coverage of the rendered image, overall and per quadrant
//! - stroke structure: grid edge counts and path chain lengths
//!
//! Per-sample results are folded into set averages and a signed
//! generated-minus-reference diff.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! pixel buffers, edge grids and path strings. Reading files and parsing
//! SVG markup live in `strokecmp-svg` and `strokecmp-bench`.

pub mod aggregate;
pub mod comparison;
pub mod coverage;
pub mod path_data;
pub mod raster;
pub mod sample;
pub mod structure;
pub mod types;

pub use aggregate::{
    AggregateStats, DiffLabel, DiffReport, SignedDiff, StructureSummary, aggregate, diff,
    summarize_structure,
};
pub use comparison::{Comparison, NamedCoverage};
pub use coverage::{CoverageReport, analyze_coverage};
pub use path_data::{CommandKind, PathCommand, PathData, tokenize};
pub use raster::{decode_pixel_buffer, pixel_buffer_from_raw};
pub use sample::{SampleInput, SampleStats, analyze_sample};
pub use structure::{
    ChainExtraction, ChainLengths, DiagonalEdge, DiagonalKind, EdgeCounts, EdgeGrid,
    EdgeGridData, EdgeSource, count_edges, count_panel_edges, extract_chains,
};
pub use types::{
    CoverageConfig, GridTopology, MetricsConfig, MetricsError, QuadrantGrid, RgbaImage,
};

/// Compare analyzed generated samples against analyzed references.
///
/// # Steps
///
/// 1. Average the reference coverage reports
/// 2. Average the generated samples' coverage reports
/// 3. Summarize the generated samples' structure
/// 4. Diff generated averages against reference averages
///
/// # Errors
///
/// Returns [`MetricsError::InvalidConfig`] if `config` is invalid.
/// Returns [`MetricsError::EmptyInput`] if either set is empty.
/// Returns [`MetricsError::ShapeMismatch`] if any quadrant grid does not
/// match the configured quadrant shape.
pub fn compare(
    config: &MetricsConfig,
    references: Vec<NamedCoverage>,
    samples: Vec<SampleStats>,
) -> Result<Comparison, MetricsError> {
    config.coverage.validate()?;
    let expected = (
        config.coverage.quadrant_rows as usize,
        config.coverage.quadrant_cols as usize,
    );
    let mut shapes = references
        .iter()
        .map(|r| &r.coverage)
        .chain(samples.iter().map(|s| &s.coverage))
        .map(|c| c.quadrant_coverage.shape());
    if let Some(found) = shapes.find(|&shape| shape != expected) {
        return Err(MetricsError::ShapeMismatch { expected, found });
    }

    // 1-2. Coverage averages.
    let reference_reports: Vec<CoverageReport> =
        references.iter().map(|r| r.coverage.clone()).collect();
    let reference_summary = aggregate(&reference_reports)?;
    let generated_reports: Vec<CoverageReport> =
        samples.iter().map(|s| s.coverage.clone()).collect();
    let generated_summary = aggregate(&generated_reports)?;

    // 3. Structure.
    let structure = summarize_structure(&samples)?;

    // 4. Diff.
    let difference = diff(&reference_summary, &generated_summary)?;

    tracing::info!(
        references = references.len(),
        samples = samples.len(),
        coverage_diff = difference.coverage.value,
        label = %difference.coverage.label,
        "comparison complete"
    );

    Ok(Comparison {
        config: *config,
        references,
        reference_summary,
        samples,
        generated_summary,
        structure,
        diff: difference,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// `width x 2` image whose left `white_cols` columns are white.
    fn striped(width: u32, white_cols: u32) -> RgbaImage {
        RgbaImage::from_fn(width, 2, |x, _| {
            if x < white_cols {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
    }

    fn reference(name: &str, white_cols: u32) -> NamedCoverage {
        NamedCoverage {
            name: name.to_string(),
            coverage: analyze_coverage(&striped(8, white_cols), &CoverageConfig::default())
                .unwrap(),
        }
    }

    fn sample(identifier: &str, white_cols: u32, paths: &[&str]) -> SampleStats {
        let config = MetricsConfig::default();
        let mut data = EdgeGridData::empty(config.topology);
        data.horizontal[0][0] = true;
        let panels = vec![data.into_grid(config.topology).unwrap()];
        let rendered = striped(8, white_cols);
        analyze_sample(
            &SampleInput {
                identifier,
                panels: &panels,
                path_data: paths,
                rendered: &rendered,
            },
            &config,
        )
        .unwrap()
    }

    #[test]
    fn compare_reports_denser_generated_set() {
        let references = vec![reference("a.svg", 2), reference("b.svg", 2)];
        let samples = vec![sample("HI", 4, &["M0 0H1V1"]), sample("YO", 4, &["M0 0L1 1"])];
        let comparison = compare(&MetricsConfig::default(), references, samples).unwrap();

        assert!((comparison.reference_summary.coverage_pct - 25.0).abs() < 1e-9);
        assert!((comparison.generated_summary.coverage_pct - 50.0).abs() < 1e-9);
        assert!((comparison.diff.coverage.value - 25.0).abs() < 1e-9);
        assert_eq!(comparison.diff.coverage.label, DiffLabel::Denser);
        // Columns 2-3 are the second quadrant column.
        let q = comparison.diff.quadrants.get(0, 1).unwrap();
        assert!((q.value - 100.0).abs() < 1e-9);
        assert_eq!(comparison.diff.quadrants.get(0, 0).unwrap().label, DiffLabel::Sparser);
        assert_eq!(comparison.structure.sample_count, 2);
        assert_eq!(comparison.structure.max_chain, 2);
    }

    #[test]
    fn compare_rejects_empty_sets() {
        let result = compare(&MetricsConfig::default(), vec![], vec![sample("X", 1, &[])]);
        assert!(matches!(result, Err(MetricsError::EmptyInput)));
        let result = compare(&MetricsConfig::default(), vec![reference("a", 1)], vec![]);
        assert!(matches!(result, Err(MetricsError::EmptyInput)));
    }

    #[test]
    fn compare_rejects_quadrant_shape_other_than_configured() {
        let config = MetricsConfig {
            coverage: CoverageConfig {
                quadrant_rows: 1,
                quadrant_cols: 1,
                ..CoverageConfig::default()
            },
            ..MetricsConfig::default()
        };
        let result = compare(&config, vec![reference("a", 1)], vec![sample("X", 1, &[])]);
        assert!(matches!(
            result,
            Err(MetricsError::ShapeMismatch {
                expected: (1, 1),
                found: (2, 4)
            })
        ));
    }

    #[test]
    fn report_lists_every_section() {
        let comparison = compare(
            &MetricsConfig::default(),
            vec![reference("ref.svg", 2)],
            vec![sample("HELLO", 0, &["M0 0H1V1L2 2", "M5 5"])],
        )
        .unwrap();
        let report = comparison.report();

        assert!(report.contains("Reference Analysis"));
        assert!(report.contains("  ref.svg"));
        assert!(report.contains("\"HELLO\" (1 panel)"));
        assert!(report.contains("Edges: H=1 V=0 Arc=0 Diag=0 Total=1 (0.5% density)"));
        assert!(report.contains("Paths: 2 chains, avg=3.0 max=3 segments"));
        assert!(report.contains("Chain lengths: [3]"));
        assert!(report.contains("Degenerate paths: 1"));
        assert!(report.contains("Difference:              -25.0% (sparser than reference)"));
        assert!(report.contains("ref=[100.0, 0.0, 0.0, 0.0]  gen=[0.0, 0.0, 0.0, 0.0]"));
    }

    #[test]
    fn comparison_serializes_to_json() {
        let comparison = compare(
            &MetricsConfig::default(),
            vec![reference("ref.svg", 8)],
            vec![sample("X", 8, &[])],
        )
        .unwrap();
        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["diff"]["coverage"]["label"], "sparser");
        assert_eq!(json["samples"][0]["identifier"], "X");
        assert_eq!(json["reference_summary"]["quadrant_coverage"][0][0], 100.0);
    }
}
