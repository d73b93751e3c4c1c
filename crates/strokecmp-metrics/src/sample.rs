//! Per-sample analysis: every metric for one generated drawing.

use serde::{Deserialize, Serialize};

use crate::coverage::{CoverageReport, analyze_coverage};
use crate::structure::{ChainLengths, EdgeCounts, EdgeSource, count_panel_edges, extract_chains};
use crate::types::{MetricsConfig, MetricsError, RgbaImage};

/// All metrics for one generated sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// What the sample was generated from (e.g. the input text).
    pub identifier: String,
    /// Number of stroke-graph panels the sample spans.
    pub panels: usize,
    /// Edge tallies summed over all panels.
    pub edges: EdgeCounts,
    /// Number of `<path>` elements examined, degenerate ones included.
    pub path_count: usize,
    /// Segment counts of the non-empty paths.
    pub chain_lengths: ChainLengths,
    /// Mean chain length, one decimal.
    pub avg_chain: f64,
    /// Longest chain.
    pub max_chain: usize,
    /// Paths with no drawing segment.
    pub degenerate_paths: usize,
    /// Pixel coverage of the rendered sample.
    pub coverage: CoverageReport,
}

/// Inputs describing one generated sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleInput<'a, S, P> {
    /// What the sample was generated from.
    pub identifier: &'a str,
    /// Stroke-graph panels.
    pub panels: &'a [S],
    /// `d` attribute of every rendered path.
    pub path_data: &'a [P],
    /// The rendered drawing.
    pub rendered: &'a RgbaImage,
}

/// Analyze one generated sample.
///
/// Coverage, edge counts and chain lengths are computed independently
/// from the three inputs.
///
/// # Errors
///
/// Returns [`MetricsError::InvalidGrid`] if a panel's topology differs
/// from `config.topology`, since densities would not be comparable.
/// Propagates any error from [`analyze_coverage`].
pub fn analyze_sample<S: EdgeSource, P: AsRef<str>>(
    input: &SampleInput<'_, S, P>,
    config: &MetricsConfig,
) -> Result<SampleStats, MetricsError> {
    if let Some((idx, panel)) = input
        .panels
        .iter()
        .enumerate()
        .find(|(_, p)| p.topology() != config.topology)
    {
        return Err(MetricsError::InvalidGrid(format!(
            "panel {idx} of {:?} has topology {:?}, expected {:?}",
            input.identifier,
            panel.topology(),
            config.topology
        )));
    }

    let coverage = analyze_coverage(input.rendered, &config.coverage)?;
    let edges = count_panel_edges(input.panels);
    let chains = extract_chains(input.path_data);

    tracing::debug!(
        identifier = input.identifier,
        panels = input.panels.len(),
        total_edges = edges.total_edges,
        paths = chains.path_count(),
        "analyzed sample"
    );

    Ok(SampleStats {
        identifier: input.identifier.to_string(),
        panels: input.panels.len(),
        edges,
        path_count: chains.path_count(),
        avg_chain: chains.chains.avg_chain(),
        max_chain: chains.chains.max_chain(),
        degenerate_paths: chains.degenerate_paths,
        chain_lengths: chains.chains,
        coverage,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::structure::{EdgeGrid, EdgeGridData};
    use crate::types::GridTopology;

    fn white_image() -> RgbaImage {
        RgbaImage::from_pixel(8, 4, image::Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn analyzes_every_metric() {
        let config = MetricsConfig::default();
        let mut data = EdgeGridData::empty(config.topology);
        data.horizontal[0][0] = true;
        data.vertical[0][0] = true;
        let panels = vec![data.into_grid(config.topology).unwrap()];
        let paths = ["M0 0H10V10L5 5", "M0 0", "M1 1L2 2"];
        let rendered = white_image();

        let stats = analyze_sample(
            &SampleInput {
                identifier: "HELLO WORLD",
                panels: &panels,
                path_data: &paths,
                rendered: &rendered,
            },
            &config,
        )
        .unwrap();

        assert_eq!(stats.identifier, "HELLO WORLD");
        assert_eq!(stats.panels, 1);
        assert_eq!(stats.edges.total_edges, 2);
        assert_eq!(stats.path_count, 3);
        assert_eq!(stats.chain_lengths.values(), &[3, 1]);
        assert!((stats.avg_chain - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats.max_chain, 3);
        assert_eq!(stats.degenerate_paths, 1);
        assert!((stats.coverage.coverage_pct - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mismatched_panel_topology_is_rejected() {
        let config = MetricsConfig::default();
        let other = GridTopology::with_cell_diagonals(3, 3);
        let panels = vec![EdgeGridData::empty(other).into_grid(other).unwrap()];
        let rendered = white_image();
        let result = analyze_sample::<EdgeGrid, &str>(
            &SampleInput {
                identifier: "X",
                panels: &panels,
                path_data: &[],
                rendered: &rendered,
            },
            &config,
        );
        assert!(matches!(result, Err(MetricsError::InvalidGrid(_))));
    }

    #[test]
    fn sample_without_structure_still_reports_coverage() {
        let rendered = white_image();
        let stats = analyze_sample::<EdgeGrid, &str>(
            &SampleInput {
                identifier: "plain",
                panels: &[],
                path_data: &[],
                rendered: &rendered,
            },
            &MetricsConfig::default(),
        )
        .unwrap();
        assert_eq!(stats.panels, 0);
        assert_eq!(stats.path_count, 0);
        assert_eq!(stats.max_chain, 0);
        assert_eq!(stats.coverage.total_pixels, 32);
    }
}
