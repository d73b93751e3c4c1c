//! strokecmp-bench: CLI tool comparing generated stroke drawings against references.
//!
//! Reads rendered screenshots of reference and generated drawings, plus
//! optional SVG markup and edge-grid panels for each generated sample,
//! and prints coverage, structure and comparison metrics. Useful for:
//!
//! - Checking whether generated output is denser or sparser than the art
//!   it imitates
//! - Spotting quadrants where ink is missing or piling up
//! - Tracking edge density and chain lengths across generator changes
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin strokecmp-bench -- \
//!     --reference ref1.png ref2.png \
//!     --generated hello.png world.png \
//!     --svg hello.svg world.svg \
//!     --edges hello.json world.json
//! ```
//!
//! Set `RUST_LOG=debug` to see per-image analysis logs on stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use strokecmp_metrics::{
    Comparison, CoverageConfig, EdgeGrid, EdgeGridData, GridTopology, MetricsConfig,
    NamedCoverage, RgbaImage, SampleInput, SampleStats,
};
use tracing_subscriber::EnvFilter;

/// Coverage and structure comparison for generated stroke drawings.
///
/// Measures every reference and generated screenshot, then reports how the
/// generated set differs from the reference set on average.
#[derive(Parser)]
#[command(name = "strokecmp-bench", version)]
struct Cli {
    /// Rendered reference drawings (PNG, JPEG, BMP, WebP).
    #[arg(long = "reference", num_args = 1.., required = true)]
    references: Vec<PathBuf>,

    /// Rendered generated drawings, one per sample. The file stem names
    /// the sample.
    #[arg(long = "generated", num_args = 1.., required = true)]
    generated: Vec<PathBuf>,

    /// SVG markup of each generated sample, matched by position.
    #[arg(long = "svg", num_args = 1..)]
    svgs: Vec<PathBuf>,

    /// Edge-grid panels of each generated sample as a JSON array,
    /// matched by position.
    #[arg(long = "edges", num_args = 1..)]
    edges: Vec<PathBuf>,

    /// Quadrant grid rows.
    #[arg(long, default_value_t = CoverageConfig::DEFAULT_QUADRANT_ROWS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    quadrant_rows: u32,

    /// Quadrant grid columns.
    #[arg(long, default_value_t = CoverageConfig::DEFAULT_QUADRANT_COLS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    quadrant_cols: u32,

    /// Brightness above which a pixel counts as white (0-255).
    #[arg(long, default_value_t = CoverageConfig::DEFAULT_BRIGHTNESS_THRESHOLD)]
    threshold: f64,

    /// Edge grid node rows.
    #[arg(long, default_value_t = GridTopology::DEFAULT_ROWS)]
    grid_rows: usize,

    /// Edge grid node columns.
    #[arg(long, default_value_t = GridTopology::DEFAULT_COLS)]
    grid_cols: usize,

    /// Diagonal edge slots per panel. Defaults to one per grid cell.
    #[arg(long)]
    diagonal_slots: Option<usize>,

    /// Output the comparison as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full metrics config as a JSON string.
    ///
    /// When provided, all other metric parameter flags are ignored.
    /// The JSON must be a valid `MetricsConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`MetricsConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<MetricsConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let mut topology = GridTopology::with_cell_diagonals(cli.grid_rows, cli.grid_cols);
    if let Some(slots) = cli.diagonal_slots {
        topology.diagonal_slots = slots;
    }

    Ok(MetricsConfig {
        coverage: CoverageConfig {
            quadrant_rows: cli.quadrant_rows,
            quadrant_cols: cli.quadrant_cols,
            brightness_threshold: cli.threshold,
        },
        topology,
    })
}

/// Check that per-sample side inputs line up with `--generated`.
fn check_side_inputs(cli: &Cli) -> Result<(), String> {
    for (flag, paths) in [("--svg", &cli.svgs), ("--edges", &cli.edges)] {
        if !paths.is_empty() && paths.len() != cli.generated.len() {
            return Err(format!(
                "{flag} was given {} files but --generated has {}",
                paths.len(),
                cli.generated.len()
            ));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(msg) = check_side_inputs(&cli) {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    eprintln!("References: {}", cli.references.len());
    eprintln!("Generated: {}", cli.generated.len());
    eprintln!("Config: {config:#?}");
    eprintln!();

    let comparison = match run(&cli, &config) {
        Ok(comparison) => comparison,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&comparison) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing comparison: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", comparison.report());
    }

    ExitCode::SUCCESS
}

/// Measure every input and compare the two sets.
fn run(cli: &Cli, config: &MetricsConfig) -> Result<Comparison, String> {
    let mut references = Vec::with_capacity(cli.references.len());
    for path in &cli.references {
        let image = load_image(path)?;
        let coverage = strokecmp_metrics::analyze_coverage(&image, &config.coverage)
            .map_err(|e| format!("Error analyzing {}: {e}", path.display()))?;
        references.push(NamedCoverage {
            name: display_name(path),
            coverage,
        });
    }

    let mut samples = Vec::with_capacity(cli.generated.len());
    for (idx, path) in cli.generated.iter().enumerate() {
        samples.push(analyze_generated(cli, config, idx, path)?);
    }

    strokecmp_metrics::compare(config, references, samples)
        .map_err(|e| format!("Comparison error: {e}"))
}

/// Analyze the generated sample at position `idx`.
fn analyze_generated(
    cli: &Cli,
    config: &MetricsConfig,
    idx: usize,
    path: &Path,
) -> Result<SampleStats, String> {
    let rendered = load_image(path)?;
    let panels = match cli.edges.get(idx) {
        Some(edges_path) => load_panels(edges_path, config.topology)?,
        None => Vec::new(),
    };
    let path_data = match cli.svgs.get(idx) {
        Some(svg_path) => load_path_data(svg_path)?,
        None => Vec::new(),
    };
    let identifier = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sample");

    strokecmp_metrics::analyze_sample(
        &SampleInput {
            identifier,
            panels: &panels,
            path_data: &path_data,
            rendered: &rendered,
        },
        config,
    )
    .map_err(|e| format!("Error analyzing {}: {e}", path.display()))
}

fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read image");
    strokecmp_metrics::decode_pixel_buffer(&bytes)
        .map_err(|e| format!("Error decoding {}: {e}", path.display()))
}

fn load_panels(path: &Path, topology: GridTopology) -> Result<Vec<EdgeGrid>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    parse_panels(&text, topology).map_err(|e| format!("Error in {}: {e}", path.display()))
}

/// Parse a JSON array of panels and validate each against `topology`.
fn parse_panels(json: &str, topology: GridTopology) -> Result<Vec<EdgeGrid>, String> {
    let data: Vec<EdgeGridData> = serde_json::from_str(json).map_err(|e| e.to_string())?;
    data.into_iter()
        .enumerate()
        .map(|(idx, panel)| {
            panel
                .into_grid(topology)
                .map_err(|e| format!("panel {idx}: {e}"))
        })
        .collect()
}

fn load_path_data(path: &Path) -> Result<Vec<String>, String> {
    let markup = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    strokecmp_svg::extract_path_data(&markup)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
