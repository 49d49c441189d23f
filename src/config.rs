use num_complex::Complex64;

pub const DEFAULT_LAMBDA_MIN: f64 = 250.0; // nm
pub const DEFAULT_LAMBDA_MAX: f64 = 850.0; // nm
pub const DEFAULT_AMOUNT: usize = 1000;
/// Interior layers with Im(kz * d) above this are treated as opaque.
pub const OPACITY_THRESHOLD: f64 = 35.0;
/// Tolerance used when deciding whether a complex quantity is real.
pub const REAL_TOLERANCE: f64 = 100.0 * f64::EPSILON;
pub const AIR: Complex64 = Complex64 {
    // vacuum-like surrounding medium
    re: 1.0,
    im: 0.0,
};
