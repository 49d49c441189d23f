//! Fresnel amplitude coefficients at a planar interface.
//!
//! Coefficients are computed for complex refractive indices and complex
//! angles, as produced by [`crate::snell`], so the same formulas cover
//! absorbing media and evanescent waves.
//!
//! Conventions follow the usual thin-film literature:
//! - s (TE): electric field perpendicular to the plane of incidence
//! - p (TM): electric field parallel to the plane of incidence
//! - amplitudes are referenced to the electric field

use num_complex::Complex64;

use crate::tmm::Polarization;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn normal_incidence_glass() {
        let zero = c(0.0);
        let r_s = interface_r(Polarization::S, c(1.0), c(1.5), zero, zero);
        let r_p = interface_r(Polarization::P, c(1.0), c(1.5), zero, zero);
        assert_relative_eq!(r_s.re, -0.2, epsilon = 1e-12);
        // p convention flips the sign at normal incidence
        assert_relative_eq!(r_p.re, 0.2, epsilon = 1e-12);

        let t_s = interface_t(Polarization::S, c(1.0), c(1.5), zero, zero);
        assert_relative_eq!(t_s.re, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn stokes_relation() {
        // t * t' - r * r' = 1 for a lossless interface
        let th_i = c(0.5);
        let th_t = crate::snell::snell(c(1.0), c(1.5), th_i).unwrap();
        for pol in [Polarization::S, Polarization::P] {
            let r = interface_r(pol, c(1.0), c(1.5), th_i, th_t);
            let t = interface_t(pol, c(1.0), c(1.5), th_i, th_t);
            let r_back = interface_r(pol, c(1.5), c(1.0), th_t, th_i);
            let t_back = interface_t(pol, c(1.5), c(1.0), th_t, th_i);
            let identity = t * t_back - r * r_back;
            assert_relative_eq!(identity.re, 1.0, epsilon = 1e-12);
            assert_relative_eq!(identity.im, 0.0, epsilon = 1e-12);
        }
    }
}

/// Reflection amplitude coefficient for a single polarization.
///
/// # Example
/// ```rust
/// use morpho::fresnel::interface_r;
/// use morpho::tmm::Polarization;
/// use num_complex::Complex64;
///
/// let zero = Complex64::new(0.0, 0.0);
/// let r = interface_r(Polarization::S, Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0), zero, zero);
/// assert!((r.re + 0.2).abs() < 1e-12);
/// ```
pub fn interface_r(
    pol: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> Complex64 {
    let cti = th_i.cos();
    let ctf = th_f.cos();
    match pol {
        Polarization::S => (n_i * cti - n_f * ctf) / (n_i * cti + n_f * ctf),
        Polarization::P => (n_f * cti - n_i * ctf) / (n_f * cti + n_i * ctf),
    }
}

/// Transmission amplitude coefficient for a single polarization.
pub fn interface_t(
    pol: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> Complex64 {
    let cti = th_i.cos();
    let ctf = th_f.cos();
    match pol {
        Polarization::S => 2.0 * n_i * cti / (n_i * cti + n_f * ctf),
        Polarization::P => 2.0 * n_i * cti / (n_f * cti + n_i * ctf),
    }
}
