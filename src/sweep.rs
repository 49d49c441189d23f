use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_AMOUNT, DEFAULT_LAMBDA_MAX, DEFAULT_LAMBDA_MIN};

/// A wavelength interval sampled with a fixed number of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub amount: usize,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            lambda_min: DEFAULT_LAMBDA_MIN,
            lambda_max: DEFAULT_LAMBDA_MAX,
            amount: DEFAULT_AMOUNT,
        }
    }
}

impl Sweep {
    pub fn new(lambda_min: f64, lambda_max: f64, amount: usize) -> Self {
        Self {
            lambda_min,
            lambda_max,
            amount,
        }
    }

    /// Grid of the Bragg model, see [`half_open`].
    pub fn wavelengths_half_open(&self) -> Array1<f64> {
        half_open(self.lambda_min, self.lambda_max, self.amount)
    }

    /// Grid of the transfer matrix model, see [`closed`].
    pub fn wavelengths_closed(&self) -> Array1<f64> {
        closed(self.lambda_min, self.lambda_max, self.amount)
    }
}

/// Samples `[lambda_min, lambda_max)` with step `(lambda_max - lambda_min) / amount`.
///
/// Sample `i` is `lambda_min + i * step` and there are
/// `ceil((lambda_max - lambda_min) / step)` of them. That is `amount` in
/// general, but when rounding of the step pushes the quotient just over an
/// integer one extra sample is produced and it can land exactly on
/// `lambda_max` (`half_open(250.0, 850.0, 7)` has 8 samples ending at 850).
///
/// # Panics
/// Panics when `lambda_min == lambda_max`: the step is then zero and the
/// sample count `0 / 0` is not a number.
pub fn half_open(lambda_min: f64, lambda_max: f64, amount: usize) -> Array1<f64> {
    let step = (lambda_max - lambda_min) / amount as f64;
    Array1::range(lambda_min, lambda_max, step)
}

/// Samples `[lambda_min, lambda_max]` with `amount` evenly spaced points,
/// both endpoints included exactly.
pub fn closed(lambda_min: f64, lambda_max: f64, amount: usize) -> Array1<f64> {
    let mut wavelengths = Array1::linspace(lambda_min, lambda_max, amount);
    if amount > 1 {
        wavelengths[amount - 1] = lambda_max;
    }
    wavelengths
}
