//! Bragg grating model for periodic lamellar stacks.
//!
//! A stack of `m` lamellae with spacing `d`, illuminated at incidence angle
//! θ, reflects with an intensity given by the interference of `m` equally
//! spaced scatterers:
//!
//! ```text
//! I(λ) = sin²(½ k d ν m) / sin²(½ k d ν),   k = 2π/λ,   ν = 2 cos θ
//! ```
//!
//! The ratio peaks at `m²` whenever ½ k d ν is a multiple of π, the
//! diffraction orders of the grating. Exactly at those points the formula is
//! 0/0; the evaluation is left as is, so depending on rounding it lands near
//! the limit, on a very large value, or on NaN.

use std::path::Path;

use anyhow::Result;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use serde::Serialize;
use std::f64::consts::PI;

use crate::plot::{self, Series};
use crate::sweep::Sweep;

/// Closed-form diffraction model of a lamellar stack.
///
/// **Context**: The ridges of a Morpho wing scale carry a stack of thin,
/// evenly spaced lamellae. Each lamella scatters a small part of the incident
/// light, and the colour comes from the interference of those partial waves
/// rather than from a pigment.
///
/// **How it Works**: The lamellae are treated as `m` identical point
/// scatterers spaced by `d` along the stack normal. The path difference
/// between neighbours is `d ν` with `ν = 2 cos θ`, so the summed amplitude is
/// a geometric series whose squared modulus is the ratio of sines in the
/// module docs. `ν` is computed once in [`BraggModel::new`]; there is no
/// setter for `θ`, so the two cannot drift apart.
///
/// - `theta`: incidence angle in radians, measured from the stack normal
/// - `d`: lamella spacing, in the same length unit as the wavelengths
/// - `m`: number of lamellae
///
/// # Example
/// ```rust
/// use morpho::bragg::BraggModel;
///
/// let model = BraggModel::new(0.0, 550.0, 4);
/// // a single lamella is flat, four give peaks of height 16
/// let near_order = model.compute_single_intensity(551.0);
/// assert!(near_order > 15.0 && near_order <= 16.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BraggModel {
    theta: f64,
    d: f64,
    m: u32,
    nu: f64,
}

impl BraggModel {
    /// Creates a model for incidence angle `theta` (radians), lamella
    /// spacing `d` and `m` lamellae.
    ///
    /// No validation takes place: `d = 0` or `m = 0` give degenerate
    /// intensities rather than an error.
    pub fn new(theta: f64, d: f64, m: u32) -> Self {
        Self {
            theta,
            d,
            m,
            nu: 2.0 * theta.cos(),
        }
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn spacing(&self) -> f64 {
        self.d
    }

    pub fn lamellae(&self) -> u32 {
        self.m
    }

    /// Geometric factor `2 cos θ`.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// Intensity at a single wavelength.
    pub fn compute_single_intensity(&self, lambda: f64) -> f64 {
        let k = 2.0 * PI / lambda;
        let half_phase = 0.5 * k * self.d * self.nu;
        let ratio = (half_phase * self.m as f64).sin() / half_phase.sin();
        ratio.powi(2)
    }

    /// Wavelengths and intensities over `[lambda_min, lambda_max)`.
    ///
    /// The grid follows [`crate::sweep::half_open`]: `amount` samples with step
    /// `(lambda_max - lambda_min) / amount`, the upper bound excluded except
    /// when rounding of the step adds one last sample on it.
    ///
    /// # Panics
    /// Panics when `lambda_min == lambda_max`.
    pub fn compute_intensity_interval(
        &self,
        lambda_min: f64,
        lambda_max: f64,
        amount: usize,
    ) -> (Array1<f64>, Array1<f64>) {
        let wavelengths = Sweep::new(lambda_min, lambda_max, amount).wavelengths_half_open();
        let intensities = wavelengths.mapv(|lambda| self.compute_single_intensity(lambda));
        (wavelengths, intensities)
    }

    /// Computes the interval, normalizes it to its peak and writes a line
    /// plot to `path`.
    pub fn plot_intensity_interval(
        &self,
        lambda_min: f64,
        lambda_max: f64,
        amount: usize,
        path: &Path,
    ) -> Result<()> {
        let (wavelengths, intensities) =
            self.compute_intensity_interval(lambda_min, lambda_max, amount);
        let normalized = normalize_to_peak(&intensities);
        plot_normalized(self.m, &wavelengths, &normalized, path)
    }
}

/// Renders an already normalized Bragg spectrum.
pub fn plot_normalized(
    m: u32,
    wavelengths: &Array1<f64>,
    normalized: &Array1<f64>,
    path: &Path,
) -> Result<()> {
    let label = harmonic_label(m);
    plot::line_plot(
        path,
        "Bragg model",
        "λ",
        "I(λ)",
        &[Series::new(&label, wavelengths.to_vec(), normalized.to_vec())],
    )
}

/// Legend label naming the harmonic order.
pub fn harmonic_label(m: u32) -> String {
    format!("{}th harmonic", m)
}

/// Divides every value by the largest value of the sequence.
///
/// NaN entries are skipped when looking for the peak and stay NaN. A peak of
/// zero turns every entry into NaN.
pub fn normalize_to_peak(values: &Array1<f64>) -> Array1<f64> {
    let peak = *values.max_skipnan();
    values.mapv(|value| value / peak)
}
