use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use ndarray::Array1;

use crate::settings::Settings;
use crate::tmm::CohTmmData;

/// Creates the output directory if it does not exist yet.
pub fn prepare_directory(directory: &Path) -> Result<()> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {:?}", directory))
}

/// Writes the Bragg intensities against wavelength, with the raw and the
/// peak-normalized value on each row.
pub fn write_intensity(
    directory: &Path,
    wavelengths: &Array1<f64>,
    intensities: &Array1<f64>,
    normalized: &Array1<f64>,
) -> Result<PathBuf> {
    ensure!(
        wavelengths.len() == intensities.len() && wavelengths.len() == normalized.len(),
        "Spectrum columns must have the same length. Got {}, {} and {}",
        wavelengths.len(),
        intensities.len(),
        normalized.len()
    );

    let path = directory.join("bragg_intensity.dat");
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# lambda intensity normalized")?;
    for ((lambda, intensity), value) in wavelengths
        .iter()
        .zip(intensities.iter())
        .zip(normalized.iter())
    {
        writeln!(writer, "{} {} {}", lambda, intensity, value)?;
    }
    writer.flush()?;

    log::info!("intensity written to {}", path.display());
    Ok(path)
}

/// Writes reflectance, transmittance and the remaining absorbed fraction
/// against wavelength.
pub fn write_tmm(directory: &Path, records: &[CohTmmData]) -> Result<PathBuf> {
    let path = directory.join("tmm_spectrum.dat");
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# lambda R T A")?;
    for record in records {
        let row = [
            record.lam_vac,
            record.reflectance,
            record.transmittance,
            1.0 - record.reflectance - record.transmittance,
        ];
        writeln!(writer, "{}", row.iter().join(" "))?;
    }
    writer.flush()?;

    log::info!("spectrum written to {}", path.display());
    Ok(path)
}

/// Writes the full solver records as JSON.
pub fn write_tmm_json(directory: &Path, records: &[CohTmmData]) -> Result<PathBuf> {
    let path = directory.join("tmm_spectrum.json");
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, records).context("Failed to serialize solver records")?;

    log::info!("records written to {}", path.display());
    Ok(path)
}

/// Writes the settings of the run next to its results.
pub fn write_settings(directory: &Path, settings: &Settings) -> Result<PathBuf> {
    let path = directory.join("settings.toml");
    let text = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}
