//! strokecmp-svg: SVG path-data extraction for strokecmp (sans-IO).
//!
//! Pulls the `d` attribute out of every `<path>` element of an SVG
//! document so the chain metrics in `strokecmp-metrics` can run on
//! rendered output. Takes markup as a `&str`; reading files is the
//! caller's job.

pub mod paths;

pub use paths::{SvgSourceError, analyze_svg_chains, extract_path_data};
