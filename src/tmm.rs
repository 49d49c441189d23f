//! Coherent transfer matrix method for planar multilayer stacks.
//!
//! A stack is described by a list of refractive indices and a list of
//! thicknesses, one entry per layer, where the first and last layers are the
//! semi-infinite incident and exit media (thickness `f64::INFINITY`). Every
//! interior layer contributes a 2x2 matrix combining the phase accumulated
//! across the layer with the Fresnel coefficients of the interface that
//! follows it; the product of those matrices relates the incident, reflected
//! and transmitted amplitudes.
//!
//! The solver returns a [`CohTmmData`] record per wavelength with the complex
//! amplitudes, the derived power fractions and enough per-layer state to
//! evaluate the Poynting flux anywhere inside the stack.

use std::f64::consts::PI;
use std::sync::Once;

use clap::ValueEnum;
use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{OPACITY_THRESHOLD, REAL_TOLERANCE};
use crate::fresnel::{interface_r, interface_t};
use crate::snell::{is_forward_angle, list_snell};

static OPACITY_WARNING: Once = Once::new();

/// Polarization of the incident plane wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    /// Transverse electric.
    S,
    /// Transverse magnetic.
    P,
}

/// Errors raised when a stack cannot be solved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TmmError {
    #[error("thickness and index lists differ in length ({thicknesses} vs {indices})")]
    LengthMismatch { thicknesses: usize, indices: usize },

    #[error("a stack needs at least the two semi-infinite media, got {0} layer(s)")]
    TooFewLayers(usize),

    #[error("outer layers must be semi-infinite, got thicknesses {first} and {last}")]
    FiniteOuterLayer { first: f64, last: f64 },

    #[error("n0 * sin(th0) must be real, got {0}")]
    NonRealIncidence(Complex64),

    #[error("incident angle {0} is not forward-travelling")]
    NotForwardAngle(Complex64),

    #[error("refractive index {n} describes a medium with gain")]
    GainMedium { n: Complex64 },
}

/// Result of a coherent solve at a single vacuum wavelength.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohTmmData {
    /// Reflected amplitude.
    pub r: Complex64,
    /// Transmitted amplitude.
    pub t: Complex64,
    #[serde(rename = "R")]
    pub reflectance: f64,
    #[serde(rename = "T")]
    pub transmittance: f64,
    /// Power entering the first interior layer, as a fraction of incident power.
    pub power_entering: f64,
    /// Forward and backward amplitudes at the start of each layer.
    pub vw_list: Vec<[Complex64; 2]>,
    pub kz_list: Vec<Complex64>,
    pub th_list: Vec<Complex64>,
    pub pol: Polarization,
    pub n_list: Vec<Complex64>,
    pub d_list: Vec<f64>,
    pub th_0: Complex64,
    pub lam_vac: f64,
}

/// Solves a multilayer stack for one polarization, incident angle and vacuum
/// wavelength.
///
/// `n_list` and `d_list` must have the same length; the first and last
/// thicknesses must be infinite. The incident medium must be non-absorbing
/// at the given angle, ie. `n_list[0] * sin(th_0)` has to be real.
///
/// **Context**: Light arrives from the semi-infinite medium `n_list[0]`,
/// bounces back and forth between the interfaces of the interior layers and
/// leaves into `n_list[last]`. All those partial waves are coherent, so the
/// reflected and transmitted amplitudes follow from a product of 2x2
/// matrices rather than from a sum of intensities.
///
/// **How it Works**:
/// 1. [`list_snell`] gives the complex angle in every layer
/// 2. `kz = 2π n cos θ / λ` and the phase `δ = kz d` across each interior
///    layer; `Im δ` is capped at 35 for opaque layers
/// 3. every interior layer contributes
///    `(1 / t) · diag(e^{-iδ}, e^{iδ}) · [[1, r], [r, 1]]` with the Fresnel
///    coefficients of the interface that follows it
/// 4. the product, prefixed by the first interface, gives `r = M₁₀ / M₀₀`
///    and `t = 1 / M₀₀`
/// 5. the outgoing wave `(t, 0)` is propagated back through the layer
///    matrices to fill `vw_list`, with `vw_list[0] = (1, r)`
///
/// # Errors
/// Returns a [`TmmError`] for inconsistent lists, finite outer layers, a
/// complex Snell invariant, a backward incident angle or a gain medium.
///
/// # Example
/// ```rust
/// use morpho::tmm::{coh_tmm, Polarization};
/// use num_complex::Complex64;
///
/// let n_list = [Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0)];
/// let d_list = [f64::INFINITY, f64::INFINITY];
/// let data = coh_tmm(Polarization::S, &n_list, &d_list, Complex64::new(0.0, 0.0), 500.0).unwrap();
/// assert!((data.reflectance - 0.04).abs() < 1e-12);
/// ```
pub fn coh_tmm(
    pol: Polarization,
    n_list: &[Complex64],
    d_list: &[f64],
    th_0: Complex64,
    lam_vac: f64,
) -> Result<CohTmmData, TmmError> {
    if n_list.len() != d_list.len() {
        return Err(TmmError::LengthMismatch {
            thicknesses: d_list.len(),
            indices: n_list.len(),
        });
    }
    let num_layers = n_list.len();
    if num_layers < 2 {
        return Err(TmmError::TooFewLayers(num_layers));
    }
    let last = num_layers - 1;
    if d_list[0] != f64::INFINITY || d_list[last] != f64::INFINITY {
        return Err(TmmError::FiniteOuterLayer {
            first: d_list[0],
            last: d_list[last],
        });
    }
    let invariant = n_list[0] * th_0.sin();
    if invariant.im.abs() > REAL_TOLERANCE {
        return Err(TmmError::NonRealIncidence(invariant));
    }
    if !is_forward_angle(n_list[0], th_0)? {
        return Err(TmmError::NotForwardAngle(th_0));
    }

    let th_list = list_snell(n_list, th_0)?;

    // kz is the z-component of the wavevector in each layer
    let kz_list: Vec<Complex64> = n_list
        .iter()
        .zip(th_list.iter())
        .map(|(n, th)| 2.0 * PI * *n * th.cos() / lam_vac)
        .collect();

    // interface i sits between layer i and layer i + 1
    let r_list: Vec<Complex64> = (0..last)
        .map(|i| interface_r(pol, n_list[i], n_list[i + 1], th_list[i], th_list[i + 1]))
        .collect();
    let t_list: Vec<Complex64> = (0..last)
        .map(|i| interface_t(pol, n_list[i], n_list[i + 1], th_list[i], th_list[i + 1]))
        .collect();

    let j = Complex64::i();
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);

    // propagation + interface matrix for every interior layer
    let mut m_list: Vec<Matrix2<Complex64>> = Vec::with_capacity(num_layers.saturating_sub(2));
    let mut opaque = false;
    for i in 1..last {
        let mut delta = kz_list[i] * d_list[i];
        if delta.im > OPACITY_THRESHOLD {
            delta.im = OPACITY_THRESHOLD;
            opaque = true;
        }
        let phase = Matrix2::new((-j * delta).exp(), zero, zero, (j * delta).exp());
        let interface = Matrix2::new(one, r_list[i], r_list[i], one);
        let mut m = phase * interface;
        m /= t_list[i];
        m_list.push(m);
    }
    if opaque {
        OPACITY_WARNING.call_once(|| {
            log::warn!(
                "stack contains opaque layers; attenuation clamped to Im(kz d) = {} to avoid overflow",
                OPACITY_THRESHOLD
            );
        });
    }

    let mut m_tilde = Matrix2::<Complex64>::identity();
    for m in m_list.iter() {
        m_tilde = m_tilde * m;
    }
    let mut entry = Matrix2::new(one, r_list[0], r_list[0], one);
    entry /= t_list[0];
    let m_tilde = entry * m_tilde;

    let r = m_tilde[(1, 0)] / m_tilde[(0, 0)];
    let t = one / m_tilde[(0, 0)];

    // back-propagate the outgoing wave to get the amplitudes in every layer
    let mut vw_list = vec![[zero, zero]; num_layers];
    vw_list[0] = [one, r];
    vw_list[last] = [t, zero];
    let mut vw = Vector2::new(t, zero);
    for i in (1..last).rev() {
        vw = m_list[i - 1] * vw;
        vw_list[i] = [vw[0], vw[1]];
    }

    let reflectance = r_to_reflectance(r);
    let transmittance = t_to_transmittance(pol, t, n_list[0], n_list[last], th_0, th_list[last]);
    let power_entering = power_entering_from_r(pol, r, n_list[0], th_0);

    Ok(CohTmmData {
        r,
        t,
        reflectance,
        transmittance,
        power_entering,
        vw_list,
        kz_list,
        th_list,
        pol,
        n_list: n_list.to_vec(),
        d_list: d_list.to_vec(),
        th_0,
        lam_vac,
    })
}

/// Averages the s and p results for unpolarized incident light.
pub fn unpolarized_rt(
    n_list: &[Complex64],
    d_list: &[f64],
    th_0: Complex64,
    lam_vac: f64,
) -> Result<(f64, f64), TmmError> {
    let s = coh_tmm(Polarization::S, n_list, d_list, th_0, lam_vac)?;
    let p = coh_tmm(Polarization::P, n_list, d_list, th_0, lam_vac)?;
    Ok((
        (s.reflectance + p.reflectance) / 2.0,
        (s.transmittance + p.transmittance) / 2.0,
    ))
}

/// Fraction of power reflected, given the reflection amplitude.
pub fn r_to_reflectance(r: Complex64) -> f64 {
    r.norm_sqr()
}

/// Fraction of power transmitted, given the transmission amplitude.
///
/// The ratio of the normal components of the Poynting vector in the exit and
/// incident media converts the amplitude into a power fraction.
pub fn t_to_transmittance(
    pol: Polarization,
    t: Complex64,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> f64 {
    match pol {
        Polarization::S => t.norm_sqr() * (n_f * th_f.cos()).re / (n_i * th_i.cos()).re,
        Polarization::P => {
            t.norm_sqr() * (n_f * th_f.cos().conj()).re / (n_i * th_i.cos().conj()).re
        }
    }
}

/// Fraction of incident power that crosses the first interface.
///
/// Equals `1 - R` when the incident medium is lossless.
pub fn power_entering_from_r(pol: Polarization, r: Complex64, n_i: Complex64, th_i: Complex64) -> f64 {
    let one = Complex64::new(1.0, 0.0);
    match pol {
        Polarization::S => {
            (n_i * th_i.cos() * (one + r.conj()) * (one - r)).re / (n_i * th_i.cos()).re
        }
        Polarization::P => {
            (n_i * th_i.cos().conj() * (one + r) * (one - r.conj())).re
                / (n_i * th_i.cos().conj()).re
        }
    }
}

impl CohTmmData {
    /// Normal component of the Poynting vector at depth `dist` inside
    /// `layer`, normalized to the incident power.
    ///
    /// Depths are measured from the start of the layer. Layer 0 is measured
    /// backward from the first interface.
    ///
    /// # Panics
    /// Panics when `layer` is not smaller than the number of layers.
    pub fn poynting_at(&self, layer: usize, dist: f64) -> f64 {
        let [v, w] = self.vw_list[layer];
        let kz = self.kz_list[layer];
        let th = self.th_list[layer];
        let n = self.n_list[layer];
        let n_0 = self.n_list[0];
        let j = Complex64::i();

        let ef = v * (j * kz * dist).exp();
        let eb = w * (-j * kz * dist).exp();
        match self.pol {
            Polarization::S => {
                (n * th.cos() * (ef + eb).conj() * (ef - eb)).re / (n_0 * self.th_0.cos()).re
            }
            Polarization::P => {
                (n * th.cos().conj() * (ef + eb) * (ef - eb).conj()).re
                    / (n_0 * self.th_0.cos().conj()).re
            }
        }
    }

    /// Fraction of the incident power absorbed in each layer.
    ///
    /// The first entry is the reflected power and the last the transmitted
    /// power, so the entries sum to one.
    pub fn absorption_per_layer(&self) -> Vec<f64> {
        let num_layers = self.d_list.len();
        let last = num_layers - 1;

        let mut entering = vec![0.0; num_layers];
        entering[0] = 1.0;
        if num_layers > 2 {
            entering[1] = self.power_entering;
        }
        for (i, value) in entering.iter_mut().enumerate().take(last).skip(2) {
            *value = self.poynting_at(i, 0.0);
        }
        entering[last] = self.transmittance;

        let mut absorbed: Vec<f64> = entering.windows(2).map(|w| w[0] - w[1]).collect();
        absorbed.push(entering[last]);
        absorbed
    }
}
