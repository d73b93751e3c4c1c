//! Pixel coverage analysis.
//!
//! Classifies every pixel of a rendered drawing as white or not by its
//! mean RGB brightness, then reports the white fraction over the whole
//! image and over each cell of a quadrant grid laid on top of it.
//!
//! Quadrant membership uses `floor(pos * divisions / extent)` clamped to
//! the last cell, so every pixel lands in exactly one cell even when the
//! image size is not a multiple of the grid size.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::types::{CoverageConfig, MetricsError, QuadrantGrid, RgbaImage, percentage, round_to};

/// Coverage of one rendered image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// `width * height`.
    pub total_pixels: u64,
    /// Pixels brighter than the threshold.
    pub white_pixels: u64,
    /// `white_pixels / total_pixels * 100`, two decimals.
    pub coverage_pct: f64,
    /// Per-cell white percentage, one decimal.
    pub quadrant_coverage: QuadrantGrid<f64>,
    /// Pixels assigned to each cell. Sums to `total_pixels`.
    pub quadrant_pixels: QuadrantGrid<u64>,
}

/// Measure white-pixel coverage of `buffer`, overall and per quadrant.
///
/// Scans the buffer once. Alpha is ignored.
///
/// # Examples
///
/// ```
/// use strokecmp_metrics::{CoverageConfig, RgbaImage, analyze_coverage};
///
/// let white = RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
/// let config = CoverageConfig { quadrant_rows: 1, quadrant_cols: 1, ..CoverageConfig::default() };
/// let report = analyze_coverage(&white, &config).unwrap();
/// assert_eq!(report.coverage_pct, 100.0);
/// assert_eq!(report.quadrant_coverage.get(0, 0), Some(100.0));
/// ```
///
/// # Errors
///
/// Returns [`MetricsError::InvalidBuffer`] if the buffer has a zero
/// dimension.
/// Returns [`MetricsError::InvalidConfig`] if the configuration fails
/// [`CoverageConfig::validate`].
pub fn analyze_coverage(
    buffer: &RgbaImage,
    config: &CoverageConfig,
) -> Result<CoverageReport, MetricsError> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(MetricsError::InvalidBuffer {
            width,
            height,
            reason: "width and height must be non-zero",
        });
    }
    config.validate()?;

    let rows = config.quadrant_rows as usize;
    let cols = config.quadrant_cols as usize;
    let mut white = vec![0_u64; rows * cols];
    let mut totals = vec![0_u64; rows * cols];
    let mut white_total = 0_u64;

    // Column assignment only depends on x, so compute it once per column.
    let col_of: Vec<usize> = (0..width)
        .map(|x| quadrant_index(x, width, config.quadrant_cols))
        .collect();

    for (y, row) in (0..height).zip(buffer.rows()) {
        let base = quadrant_index(y, height, config.quadrant_rows) * cols;
        for (pixel, &col) in row.zip(&col_of) {
            let cell = base + col;
            totals[cell] += 1;
            if is_white(*pixel, config.brightness_threshold) {
                white[cell] += 1;
                white_total += 1;
            }
        }
    }

    let total_pixels = u64::from(width) * u64::from(height);
    let quadrant_coverage = QuadrantGrid::from_fn(rows, cols, |r, c| {
        let cell = r * cols + c;
        round_to(percentage(white[cell], totals[cell]), 1)
    });
    let quadrant_pixels = QuadrantGrid::from_fn(rows, cols, |r, c| totals[r * cols + c]);

    let report = CoverageReport {
        width,
        height,
        total_pixels,
        white_pixels: white_total,
        coverage_pct: round_to(percentage(white_total, total_pixels), 2),
        quadrant_coverage,
        quadrant_pixels,
    };

    tracing::debug!(
        width,
        height,
        white_pixels = report.white_pixels,
        coverage_pct = report.coverage_pct,
        "analyzed pixel coverage"
    );

    Ok(report)
}

/// Whether a pixel's mean RGB brightness is strictly above `threshold`.
fn is_white(pixel: Rgba<u8>, threshold: f64) -> bool {
    let [r, g, b, _] = pixel.0;
    let sum = u16::from(r) + u16::from(g) + u16::from(b);
    f64::from(sum) / 3.0 > threshold
}

/// Cell index along one axis: `min(floor(pos * divisions / extent), divisions - 1)`.
///
/// Exact integer arithmetic; `extent` and `divisions` must be non-zero.
#[allow(clippy::cast_possible_truncation)]
fn quadrant_index(pos: u32, extent: u32, divisions: u32) -> usize {
    let idx = u64::from(pos) * u64::from(divisions) / u64::from(extent);
    idx.min(u64::from(divisions - 1)) as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn grid(rows: u32, cols: u32) -> CoverageConfig {
        CoverageConfig {
            quadrant_rows: rows,
            quadrant_cols: cols,
            ..CoverageConfig::default()
        }
    }

    #[test]
    fn all_white_single_quadrant() {
        let img = RgbaImage::from_pixel(2, 2, WHITE);
        let report = analyze_coverage(&img, &grid(1, 1)).unwrap();
        assert_eq!(report.total_pixels, 4);
        assert_eq!(report.white_pixels, 4);
        assert!((report.coverage_pct - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.quadrant_coverage.cells(), &[100.0]);
    }

    #[test]
    fn top_left_block_fills_one_quadrant() {
        let img = RgbaImage::from_fn(4, 4, |x, y| if x < 2 && y < 2 { WHITE } else { BLACK });
        let report = analyze_coverage(&img, &grid(2, 2)).unwrap();
        assert!((report.coverage_pct - 25.0).abs() < f64::EPSILON);
        let rows: Vec<&[f64]> = report.quadrant_coverage.row_slices().collect();
        assert_eq!(rows, vec![&[100.0, 0.0][..], &[0.0, 0.0][..]]);
    }

    #[test]
    fn threshold_is_strictly_greater() {
        // Mean brightness exactly 128 is not white.
        let img = RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255]));
        let report = analyze_coverage(&img, &grid(1, 1)).unwrap();
        assert_eq!(report.white_pixels, 0);

        let img = RgbaImage::from_pixel(1, 1, Rgba([129, 128, 128, 255]));
        let report = analyze_coverage(&img, &grid(1, 1)).unwrap();
        assert_eq!(report.white_pixels, 1);
    }

    #[test]
    fn alpha_channel_is_ignored() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 0]));
        let report = analyze_coverage(&img, &grid(1, 1)).unwrap();
        assert_eq!(report.white_pixels, 9);
    }

    #[test]
    fn brightness_is_channel_mean() {
        // (255 + 255 + 0) / 3 = 170 > 128, (255 + 0 + 0) / 3 = 85.
        let yellow = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 0, 255]));
        let red = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        assert_eq!(
            analyze_coverage(&yellow, &grid(1, 1)).unwrap().white_pixels,
            1
        );
        assert_eq!(analyze_coverage(&red, &grid(1, 1)).unwrap().white_pixels, 0);
    }

    #[test]
    fn uneven_division_still_partitions_every_pixel() {
        let img = RgbaImage::from_pixel(7, 5, WHITE);
        let report = analyze_coverage(&img, &grid(2, 4)).unwrap();
        let counted: u64 = report.quadrant_pixels.cells().iter().sum();
        assert_eq!(counted, 35);
        // Columns for 7 px over 4: x*4/7 -> 0,0,1,1,2,2,3 (widths 2,2,2,1).
        // Rows for 5 px over 2: y*2/5 -> 0,0,0,1,1 (heights 3,2).
        let rows: Vec<&[u64]> = report.quadrant_pixels.row_slices().collect();
        assert_eq!(rows, vec![&[6_u64, 6, 6, 3][..], &[4_u64, 4, 4, 2][..]]);
    }

    #[test]
    fn more_quadrants_than_pixels_yields_zero_cells() {
        let img = RgbaImage::from_pixel(2, 1, WHITE);
        let report = analyze_coverage(&img, &grid(3, 4)).unwrap();
        assert!((report.coverage_pct - 100.0).abs() < f64::EPSILON);
        // Only cells (0, 0) and (0, 2) receive pixels.
        assert_eq!(report.quadrant_pixels.get(0, 0), Some(1));
        assert_eq!(report.quadrant_pixels.get(0, 2), Some(1));
        assert_eq!(report.quadrant_coverage.get(2, 3), Some(0.0));
        assert_eq!(report.quadrant_coverage.get(0, 1), Some(0.0));
    }

    #[test]
    fn coverage_rounds_to_two_decimals_and_quadrants_to_one() {
        // 1 white pixel of 3.
        let img = RgbaImage::from_fn(3, 1, |x, _| if x == 0 { WHITE } else { BLACK });
        let report = analyze_coverage(&img, &grid(1, 1)).unwrap();
        assert!((report.coverage_pct - 33.33).abs() < 1e-9);
        assert_eq!(report.quadrant_coverage.get(0, 0), Some(33.3));
    }

    #[test]
    fn zero_sized_buffer_is_rejected() {
        let img = RgbaImage::new(0, 3);
        let result = analyze_coverage(&img, &CoverageConfig::default());
        assert!(matches!(
            result,
            Err(MetricsError::InvalidBuffer {
                width: 0,
                height: 3,
                ..
            })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_scanning() {
        let img = RgbaImage::from_pixel(2, 2, WHITE);
        let config = CoverageConfig {
            brightness_threshold: 300.0,
            ..CoverageConfig::default()
        };
        assert!(matches!(
            analyze_coverage(&img, &config),
            Err(MetricsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn default_grid_is_two_by_four() {
        let img = RgbaImage::from_pixel(8, 4, BLACK);
        let report = analyze_coverage(&img, &CoverageConfig::default()).unwrap();
        assert_eq!(report.quadrant_coverage.shape(), (2, 4));
        assert!(report.quadrant_pixels.cells().iter().all(|&n| n == 4));
    }

    #[test]
    fn quadrant_index_clamps_to_last_cell() {
        assert_eq!(quadrant_index(0, 10, 3), 0);
        assert_eq!(quadrant_index(9, 10, 3), 2);
        assert_eq!(quadrant_index(4, 10, 3), 1);
        assert_eq!(quadrant_index(0, 1, 5), 0);
    }
}
