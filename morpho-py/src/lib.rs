use morpho::{bragg, multilayer, tmm};
use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_polarization(pol: &str) -> PyResult<tmm::Polarization> {
    match pol {
        "s" | "S" => Ok(tmm::Polarization::S),
        "p" | "P" => Ok(tmm::Polarization::P),
        other => Err(PyValueError::new_err(format!(
            "polarization must be 's' or 'p', got {other:?}"
        ))),
    }
}

/// Closed-form Bragg grating model of a lamellar stack.
#[pyclass(name = "BraggModel")]
#[derive(Debug, Clone)]
pub struct PyBraggModel {
    inner: bragg::BraggModel,
}

#[pymethods]
impl PyBraggModel {
    #[new]
    #[pyo3(signature = (theta, d, m))]
    fn py_new(theta: f64, d: f64, m: u32) -> Self {
        Self {
            inner: bragg::BraggModel::new(theta, d, m),
        }
    }

    #[getter]
    fn get_nu(&self) -> f64 {
        self.inner.nu()
    }

    fn compute_single_intensity(&self, lam: f64) -> f64 {
        self.inner.compute_single_intensity(lam)
    }

    /// Returns `(wavelengths, intensities)` over `[lmin, lmax)`.
    #[pyo3(signature = (lmin = 250.0, lmax = 850.0, amount = 1000))]
    fn compute_intensity_interval(
        &self,
        lmin: f64,
        lmax: f64,
        amount: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let (wavelengths, intensities) = self.inner.compute_intensity_interval(lmin, lmax, amount);
        (wavelengths.to_vec(), intensities.to_vec())
    }

    /// Writes the normalized spectrum as a PNG chart to `path`.
    #[pyo3(signature = (path, lmin = 250.0, lmax = 850.0, amount = 1000))]
    fn plot_intensity_interval(
        &self,
        path: std::path::PathBuf,
        lmin: f64,
        lmax: f64,
        amount: usize,
    ) -> PyResult<()> {
        self.inner
            .plot_intensity_interval(lmin, lmax, amount, &path)
            .map_err(to_py_err)
    }
}

/// Coherent transfer matrix model of a planar multilayer stack.
#[pyclass(name = "TMMModel")]
#[derive(Debug, Clone)]
pub struct PyTmmModel {
    inner: multilayer::TmmModel,
}

#[pymethods]
impl PyTmmModel {
    #[new]
    #[pyo3(signature = (d_list, n_list, theta = 0.0, pol = "s"))]
    fn py_new(d_list: Vec<f64>, n_list: Vec<Complex64>, theta: f64, pol: &str) -> PyResult<Self> {
        let pol = parse_polarization(pol)?;
        Ok(Self {
            inner: multilayer::TmmModel::new(d_list, n_list, theta).with_polarization(pol),
        })
    }

    /// Returns `(wavelengths, R, T)` over `[lmin, lmax]`.
    #[pyo3(signature = (lmin = 250.0, lmax = 850.0, amount = 1000))]
    fn calculate_tmm(
        &self,
        lmin: f64,
        lmax: f64,
        amount: usize,
    ) -> PyResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let records = self
            .inner
            .calculate_tmm(lmin, lmax, amount)
            .map_err(to_py_err)?;
        Ok((
            records.iter().map(|r| r.lam_vac).collect(),
            records.iter().map(|r| r.reflectance).collect(),
            records.iter().map(|r| r.transmittance).collect(),
        ))
    }

    /// Writes `reflection.png` and `transmission.png` into `directory`.
    #[pyo3(signature = (directory, lmin = 250.0, lmax = 850.0, amount = 1000))]
    fn plot_reflection_and_transmission_amplitude(
        &self,
        directory: std::path::PathBuf,
        lmin: f64,
        lmax: f64,
        amount: usize,
    ) -> PyResult<Vec<std::path::PathBuf>> {
        self.inner
            .plot_reflection_and_transmission_amplitude(lmin, lmax, amount, &directory)
            .map_err(to_py_err)
    }
}

/// Solves one stack at one wavelength. Returns `(r, t, R, T)`.
#[pyfunction]
#[pyo3(signature = (pol, n_list, d_list, th_0, lam_vac))]
fn coh_tmm(
    pol: &str,
    n_list: Vec<Complex64>,
    d_list: Vec<f64>,
    th_0: Complex64,
    lam_vac: f64,
) -> PyResult<(Complex64, Complex64, f64, f64)> {
    let data = tmm::coh_tmm(parse_polarization(pol)?, &n_list, &d_list, th_0, lam_vac)
        .map_err(to_py_err)?;
    Ok((data.r, data.t, data.reflectance, data.transmittance))
}

#[pymodule]
fn _morpho_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(coh_tmm, m)?)?;
    m.add_class::<PyBraggModel>()?;
    m.add_class::<PyTmmModel>()?;
    Ok(())
}
