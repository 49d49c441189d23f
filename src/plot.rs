//! Line charts of spectra, rendered to PNG files.

use std::ops::Range;
use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;

const SIZE: (u32, u32) = (1024, 768);
const PALETTE: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, BLACK];

/// One labelled curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn new(label: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            label: label.to_string(),
            x,
            y,
        }
    }

    /// Points with a finite ordinate. Samples on a singularity are dropped
    /// rather than stretching the axis.
    pub fn finite_points(&self) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(self.y.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (*x, *y))
            .collect()
    }
}

/// Draws every series on a shared pair of axes with a grid and a legend, and
/// writes the chart to `path`.
pub fn line_plot(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[Series],
) -> Result<()> {
    let (x_range, y_range) = axis_ranges(series)?;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 32).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    for (i, curve) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(curve.finite_points(), color.stroke_width(2)))?
            .label(curve.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    log::info!("plot written to {}", path.display());
    Ok(())
}

/// Axis extents covering the finite points of all series. The y axis always
/// includes zero and gets a little headroom above the peak.
pub fn axis_ranges(series: &[Series]) -> Result<(Range<f64>, Range<f64>)> {
    let points: Vec<(f64, f64)> = series.iter().flat_map(|s| s.finite_points()).collect();
    if points.is_empty() {
        bail!("nothing to plot: no finite samples");
    }

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (0.0_f64, f64::NEG_INFINITY);
    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let headroom = 0.05 * (y_max - y_min);
    Ok((x_min..x_max, y_min..y_max + headroom))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_finite_points() {
        let series = Series::new("s", vec![1.0, 2.0, 3.0], vec![0.5, f64::NAN, f64::INFINITY]);
        assert_eq!(series.finite_points(), vec![(1.0, 0.5)]);
    }

    #[test]
    fn ranges_span_all_series() {
        let a = Series::new("a", vec![250.0, 500.0], vec![0.2, 0.8]);
        let b = Series::new("b", vec![300.0, 850.0], vec![0.1, 1.0]);
        let (x, y) = axis_ranges(&[a, b]).unwrap();
        assert_eq!(x, 250.0..850.0);
        assert_eq!(y.start, 0.0);
        assert!((y.end - 1.05).abs() < 1e-12);
    }

    #[test]
    fn renders_several_series() {
        let dir = std::env::temp_dir().join(format!("morpho-line-plot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lines.png");

        let x: Vec<f64> = (0..50).map(|i| 400.0 + 4.0 * i as f64).collect();
        let rising = Series::new("rising", x.clone(), x.iter().map(|v| v / 600.0).collect());
        let with_gap = Series::new(
            "gap",
            x.clone(),
            x.iter()
                .enumerate()
                .map(|(i, _)| if i == 10 { f64::NAN } else { 0.5 })
                .collect(),
        );
        line_plot(&path, "Lines", "λ", "y", &[rising, with_gap]).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn nothing_finite_writes_nothing() {
        let path = std::env::temp_dir().join(format!("morpho-empty-{}.png", std::process::id()));
        let series = Series::new("nan", vec![1.0], vec![f64::NAN]);
        assert!(line_plot(&path, "Empty", "x", "y", &[series]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn empty_series_rejected() {
        let series = Series::new("nan", vec![1.0], vec![f64::NAN]);
        assert!(axis_ranges(&[series]).is_err());
    }
}
