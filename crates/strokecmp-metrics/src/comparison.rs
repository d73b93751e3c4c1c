//! A full reference-versus-generated comparison run and its text report.

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateStats, DiffReport, StructureSummary};
use crate::coverage::CoverageReport;
use crate::sample::SampleStats;
use crate::types::MetricsConfig;

/// Coverage of one named reference drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCoverage {
    /// Reference file name or label.
    pub name: String,
    /// Its coverage report.
    pub coverage: CoverageReport,
}

/// Everything measured in one comparison run, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Settings the run used.
    pub config: MetricsConfig,
    /// Per-reference coverage.
    pub references: Vec<NamedCoverage>,
    /// Averages over the references.
    pub reference_summary: AggregateStats,
    /// Per-generated-sample metrics.
    pub samples: Vec<SampleStats>,
    /// Coverage averages over the generated samples.
    pub generated_summary: AggregateStats,
    /// Structural averages over the generated samples.
    pub structure: StructureSummary,
    /// Generated minus reference.
    pub diff: DiffReport,
}

impl Comparison {
    /// Format the comparison as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let rule = "=".repeat(70);
        let mut lines = Vec::new();

        lines.push(format!("Reference Analysis\n{rule}"));
        for reference in &self.references {
            lines.push(String::new());
            lines.push(format!("  {}", reference.name));
            lines.push(format!("    Coverage: {:.2}%", reference.coverage.coverage_pct));
            lines.push("    Quadrant coverage:".to_string());
            for row in reference.coverage.quadrant_coverage.row_slices() {
                lines.push(format!("      {}", format_row(row)));
            }
        }
        lines.push(String::new());
        lines.push(format!(
            "  Average reference coverage: {:.1}%",
            self.reference_summary.coverage_pct
        ));
        lines.push("  Average quadrant coverage:".to_string());
        for row in self.reference_summary.quadrant_coverage.row_slices() {
            lines.push(format!("    {}", format_row(row)));
        }

        lines.push(String::new());
        lines.push(format!("Generated Analysis\n{rule}"));
        for sample in &self.samples {
            lines.push(String::new());
            lines.extend(sample_lines(sample));
        }

        lines.push(String::new());
        lines.push(format!("Comparison Summary\n{rule}"));
        lines.extend(self.summary_lines());

        lines.join("\n")
    }

    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "  Reference avg coverage:  {:.1}%",
                self.reference_summary.coverage_pct
            ),
            format!(
                "  Generated avg coverage:  {:.1}%",
                self.generated_summary.coverage_pct
            ),
            format!(
                "  Difference:              {:+.1}% ({} than reference)",
                self.diff.coverage.value, self.diff.coverage.label
            ),
            format!(
                "  Structure:               edges={:.1} density={:.1}% paths={:.1} avg chain={:.1} max chain={}",
                self.structure.mean_total_edges,
                self.structure.mean_edge_density,
                self.structure.mean_path_count,
                self.structure.mean_avg_chain,
                self.structure.max_chain,
            ),
            String::new(),
            "  Quadrant comparison (ref -> gen avg):".to_string(),
        ];

        let rows = self
            .reference_summary
            .quadrant_coverage
            .row_slices()
            .zip(self.generated_summary.quadrant_coverage.row_slices())
            .zip(self.diff.quadrants.row_slices());
        for ((reference, generated), diffs) in rows {
            let diffs: Vec<String> = diffs.iter().map(|d| format!("{:+.1}", d.value)).collect();
            lines.push(format!(
                "    ref={}  gen={}  diff=[{}]",
                format_row(reference),
                format_row(generated),
                diffs.join(", "),
            ));
        }
        lines
    }
}

/// Report block for one generated sample.
fn sample_lines(sample: &SampleStats) -> Vec<String> {
    let plural = if sample.panels == 1 { "" } else { "s" };
    let edges = &sample.edges;
    let chains: Vec<String> = sample
        .chain_lengths
        .values()
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut lines = vec![
        format!("  \"{}\" ({} panel{plural})", sample.identifier, sample.panels),
        format!(
            "    Edges: H={} V={} Arc={} Diag={} Total={} ({:.1}% density)",
            edges.h_edges,
            edges.v_edges,
            edges.arcs,
            edges.diags,
            edges.total_edges,
            edges.edge_density,
        ),
        format!(
            "    Paths: {} chains, avg={:.1} max={} segments",
            sample.path_count, sample.avg_chain, sample.max_chain,
        ),
        format!("    Chain lengths: [{}]", chains.join(", ")),
    ];
    if sample.degenerate_paths > 0 {
        lines.push(format!(
            "    Degenerate paths: {} (no drawing segments)",
            sample.degenerate_paths
        ));
    }
    lines.push(format!(
        "    Pixel coverage: {:.2}%",
        sample.coverage.coverage_pct
    ));
    lines.push("    Quadrant coverage:".to_string());
    for row in sample.coverage.quadrant_coverage.row_slices() {
        lines.push(format!("      {}", format_row(row)));
    }
    lines
}

/// `[12.5, 0.0, 3.1]`
fn format_row(row: &[f64]) -> String {
    let cells: Vec<String> = row.iter().map(|v| format!("{v:.1}")).collect();
    format!("[{}]", cells.join(", "))
}
