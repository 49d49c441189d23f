//! Snell's law for complex refractive indices and complex angles.
//!
//! Angles in absorbing media are complex, so the usual arcsine has two
//! candidate branches. This module picks the branch that corresponds to a
//! wave travelling forward (into the stack), which is what the transfer
//! matrix method needs for every layer.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::config::REAL_TOLERANCE;
use crate::tmm::TmmError;

#[cfg(test)]
mod tests {

    use approx::assert_relative_eq;
    use num_complex::Complex64;

    use super::*;

    #[test]
    fn normal_incidence_same_media() {
        let n = Complex64::new(1.0, 0.0);
        let theta_t = snell(n, n, Complex64::new(0.0, 0.0)).unwrap();
        assert!(theta_t.norm() < f64::EPSILON);
    }

    #[test]
    fn angle30_incidence() {
        let theta_i = Complex64::new(30.0_f64.to_radians(), 0.0);
        let n1 = Complex64::new(1.0, 0.0);
        let n2 = Complex64::new(1.31, 0.0);
        let theta_t = snell(n1, n2, theta_i).unwrap();
        assert_relative_eq!(theta_t.re, 0.3916126, epsilon = 1e-6);
        assert!(theta_t.im.abs() < 1e-12);
    }

    #[test]
    fn total_internal_reflection_is_evanescent() {
        // glass to air beyond the critical angle
        let theta_i = Complex64::new(60.0_f64.to_radians(), 0.0);
        let n1 = Complex64::new(1.5, 0.0);
        let n2 = Complex64::new(1.0, 0.0);
        let theta_t = snell(n1, n2, theta_i).unwrap();
        let ncos = n2 * theta_t.cos();
        // decaying away from the interface
        assert!(ncos.im > 0.0);
        assert!(is_forward_angle(n2, theta_t).unwrap());
    }

    #[test]
    fn backward_angle_detected() {
        let n = Complex64::new(1.5, 0.0);
        let theta = Complex64::new(PI - 0.2, 0.0);
        assert!(!is_forward_angle(n, theta).unwrap());
        assert!(is_forward_angle(n, Complex64::new(0.2, 0.0)).unwrap());
    }

    #[test]
    fn gain_medium_rejected() {
        let n = Complex64::new(1.5, -0.1);
        assert!(is_forward_angle(n, Complex64::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn list_snell_conserves_invariant() {
        let n_list = [
            Complex64::new(1.0, 0.0),
            Complex64::new(1.5, 0.0),
            Complex64::new(2.0, 0.3),
            Complex64::new(1.0, 0.0),
        ];
        let th_0 = Complex64::new(0.4, 0.0);
        let angles = list_snell(&n_list, th_0).unwrap();
        let invariant = n_list[0] * th_0.sin();
        for (n, th) in n_list.iter().zip(angles.iter()) {
            let value = n * th.sin();
            assert_relative_eq!(value.re, invariant.re, epsilon = 1e-12);
            assert_relative_eq!(value.im, invariant.im, epsilon = 1e-12);
        }
        assert_relative_eq!(angles[3].re, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn list_snell_outer_media_are_forward() {
        // exit medium beyond the critical angle
        let n_list = [
            Complex64::new(1.5, 0.0),
            Complex64::new(1.2, 0.0),
            Complex64::new(1.0, 0.0),
        ];
        let th_0 = Complex64::new(60.0_f64.to_radians(), 0.0);
        let angles = list_snell(&n_list, th_0).unwrap();
        assert_eq!(angles[2], snell(n_list[0], n_list[2], th_0).unwrap());
        assert!(is_forward_angle(n_list[0], angles[0]).unwrap());
        assert!(is_forward_angle(n_list[2], angles[2]).unwrap());
        assert!((n_list[2] * angles[2].cos()).im > 0.0);
    }
}

/// Decides whether a wave at complex angle `theta` in a medium of index `n`
/// travels forward, ie. carries power into the stack or decays away from the
/// interface it came through.
///
/// For evanescent or lossy waves the sign of Im(n cos θ) decides; for
/// propagating waves in a lossless medium the sign of Re(n cos θ) decides.
pub fn is_forward_angle(n: Complex64, theta: Complex64) -> Result<bool, TmmError> {
    if n.re * n.im < 0.0 {
        return Err(TmmError::GainMedium { n });
    }
    let ncostheta = n * theta.cos();
    let answer = if ncostheta.im.abs() > REAL_TOLERANCE {
        ncostheta.im > 0.0
    } else {
        ncostheta.re > 0.0
    };
    Ok(answer)
}

/// Computes the forward-travelling transmitted angle for a wave crossing from
/// index `n1` to index `n2` at complex angle `theta1`.
pub fn snell(n1: Complex64, n2: Complex64, theta1: Complex64) -> Result<Complex64, TmmError> {
    let theta2_guess = (n1 * theta1.sin() / n2).asin();
    if is_forward_angle(n2, theta2_guess)? {
        Ok(theta2_guess)
    } else {
        Ok(Complex64::new(PI, 0.0) - theta2_guess)
    }
}

/// Computes the angle in every layer of a stack given the incident angle in
/// the first one.
///
/// Interior layers may legitimately hold either branch since both forward and
/// backward waves are present there; only the two semi-infinite media are
/// forced onto the forward branch.
pub fn list_snell(n_list: &[Complex64], th_0: Complex64) -> Result<Vec<Complex64>, TmmError> {
    let n_0 = n_list[0];
    let invariant = n_0 * th_0.sin();
    let mut angles: Vec<Complex64> = n_list.iter().map(|n| (invariant / n).asin()).collect();

    let last = angles.len() - 1;
    angles[0] = snell(n_0, n_0, th_0)?;
    angles[last] = snell(n_0, n_list[last], th_0)?;
    Ok(angles)
}
