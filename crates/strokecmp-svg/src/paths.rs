//! `<path>` discovery using the [`svg`] crate's event parser.

use svg::node::element::tag::Type;
use svg::parser::Event;

use strokecmp_metrics::{ChainExtraction, extract_chains};

/// Errors that can occur while reading SVG markup.
#[derive(Debug, thiserror::Error)]
pub enum SvgSourceError {
    /// The markup could not be tokenized.
    #[error("malformed SVG markup: {0}")]
    Malformed(String),

    /// The parser could not be created.
    #[error("failed to read SVG markup: {0}")]
    Io(#[from] std::io::Error),
}

/// Collect the `d` attribute of every `<path>` element, in document order.
///
/// Both `<path ...>` and `<path .../>` are picked up. A path without a
/// `d` attribute yields an empty string so it still counts as a
/// (degenerate) path downstream.
///
/// # Examples
///
/// ```
/// use strokecmp_svg::extract_path_data;
///
/// let markup = r#"<svg><path d="M0 0H5"/><g><path d="M1 1V2"></path></g></svg>"#;
/// assert_eq!(extract_path_data(markup).unwrap(), vec!["M0 0H5", "M1 1V2"]);
/// ```
///
/// # Errors
///
/// Returns [`SvgSourceError::Malformed`] if the parser reports an error.
pub fn extract_path_data(markup: &str) -> Result<Vec<String>, SvgSourceError> {
    let mut paths = Vec::new();
    for event in svg::read(markup)? {
        match event {
            Event::Tag("path", Type::Start | Type::Empty, attributes) => {
                paths.push(
                    attributes
                        .get("d")
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                );
            }
            Event::Error(error) => return Err(SvgSourceError::Malformed(error.to_string())),
            _ => {}
        }
    }
    tracing::debug!(paths = paths.len(), "extracted path data");
    Ok(paths)
}

/// Extract every path from `markup` and measure its chain length.
///
/// # Errors
///
/// Propagates any error from [`extract_path_data`].
pub fn analyze_svg_chains(markup: &str) -> Result<ChainExtraction, SvgSourceError> {
    let paths = extract_path_data(markup)?;
    Ok(extract_chains(&paths))
}
