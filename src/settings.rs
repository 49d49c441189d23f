use anyhow::{anyhow, ensure, Context, Result};
use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::bragg::BraggModel;
use crate::multilayer::{periodic_stack, TmmModel};
use crate::sweep::Sweep;
use crate::tmm::Polarization;

/// Which of the two optical models the driver evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Closed-form Bragg grating intensity.
    Bragg,
    /// Coherent transfer matrix reflection and transmission.
    Tmm,
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub model: Model,
    pub directory: PathBuf,
    #[serde(default = "default_plot")]
    pub plot: bool,
    pub bragg: BraggSettings,
    pub tmm: TmmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BraggSettings {
    pub theta: f64,
    pub spacing: f64,
    pub lamellae: u32,
    pub sweep: Sweep,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmmSettings {
    pub theta: f64,
    #[serde(default = "default_polarization")]
    pub polarization: Polarization,
    pub incident_index: Complex64,
    pub exit_index: Complex64,
    pub periods: usize,
    pub sweep: Sweep,
    /// Unit cell of the stack, repeated `periods` times.
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    pub thickness: f64,
    pub refr_index: Complex64,
}

fn default_plot() -> bool {
    true
}

fn default_polarization() -> Polarization {
    Polarization::S
}

impl Settings {
    pub fn bragg_model(&self) -> BraggModel {
        BraggModel::new(self.bragg.theta, self.bragg.spacing, self.bragg.lamellae)
    }

    pub fn tmm_model(&self) -> TmmModel {
        let cell: Vec<(f64, Complex64)> = self
            .tmm
            .layers
            .iter()
            .map(|layer| (layer.thickness, layer.refr_index))
            .collect();
        let (d_list, n_list) = periodic_stack(
            self.tmm.incident_index,
            &cell,
            self.tmm.periods,
            self.tmm.exit_index,
        );
        TmmModel::new(d_list, n_list, self.tmm.theta).with_polarization(self.tmm.polarization)
    }

    /// Sweep of the selected model.
    pub fn sweep(&self) -> Sweep {
        match self.model {
            Model::Bragg => self.bragg.sweep,
            Model::Tmm => self.tmm.sweep,
        }
    }

    fn sweep_mut(&mut self) -> &mut Sweep {
        match self.model {
            Model::Bragg => &mut self.bragg.sweep,
            Model::Tmm => &mut self.tmm.sweep,
        }
    }
}

/// Loads `config/default.toml` only, ignoring local overrides, the
/// environment and the command line.
pub fn load_default_config() -> Result<Settings> {
    let morpho_dir = retrieve_project_root()?;
    let default_config_file = morpho_dir.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration file, then applies `MORPHO_*` environment
/// variables and finally the command-line overrides in `args`.
pub fn load_config(args: &CliArgs) -> Result<Settings> {
    let morpho_dir = retrieve_project_root()?;

    let default_config_file = morpho_dir.join("config/default.toml");
    let local_config = morpho_dir.join("config/local.toml");

    // Check if local config exists, if not use default
    let config_file = if local_config.exists() {
        log::info!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        log::info!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(
            Environment::with_prefix("morpho")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    apply_args(&mut config, args);
    validate_config(&config)?;

    log::debug!("{:#?}", config);

    Ok(config)
}

/// Overrides configuration values with the ones given on the command line.
///
/// Sweep and angle overrides apply to the selected model.
pub fn apply_args(config: &mut Settings, args: &CliArgs) {
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(dir) = &args.dir {
        config.directory = dir.clone();
    }
    if args.no_plot {
        config.plot = false;
    }

    let sweep = config.sweep_mut();
    if let Some(lmin) = args.lmin {
        sweep.lambda_min = lmin;
    }
    if let Some(lmax) = args.lmax {
        sweep.lambda_max = lmax;
    }
    if let Some(amount) = args.amount {
        sweep.amount = amount;
    }

    if let Some(theta) = args.theta {
        match config.model {
            Model::Bragg => config.bragg.theta = theta,
            Model::Tmm => config.tmm.theta = theta,
        }
    }
    if let Some(pol) = args.pol {
        config.tmm.polarization = pol;
    }
    if let Some(spacing) = args.spacing {
        config.bragg.spacing = spacing;
    }
    if let Some(lamellae) = args.lamellae {
        config.bragg.lamellae = lamellae;
    }
    if let Some(periods) = args.periods {
        config.tmm.periods = periods;
    }
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the MORPHO_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("MORPHO_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    // Fallback: walk upward from the executable looking for a "config" subdirectory
    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

pub fn validate_config(config: &Settings) -> Result<()> {
    for (name, sweep) in [("bragg", &config.bragg.sweep), ("tmm", &config.tmm.sweep)] {
        ensure!(sweep.amount > 0, "{name}: sweep needs at least one sample");
        ensure!(
            sweep.lambda_min > 0.0,
            "{name}: wavelengths must be positive, got {}",
            sweep.lambda_min
        );
        ensure!(
            sweep.lambda_max > sweep.lambda_min,
            "{name}: lambda_max ({}) must exceed lambda_min ({})",
            sweep.lambda_max,
            sweep.lambda_min
        );
    }
    ensure!(config.bragg.lamellae > 0, "bragg: at least one lamella is required");
    ensure!(config.bragg.spacing > 0.0, "bragg: lamella spacing must be positive");
    ensure!(
        config.tmm.layers.iter().all(|layer| layer.thickness >= 0.0 && layer.thickness.is_finite()),
        "tmm: interior layer thicknesses must be finite and non-negative"
    );
    Ok(())
}

#[derive(Parser, Debug, Default)]
#[command(version, about = "Morpho - structural colour spectra of lamellar stacks")]
pub struct CliArgs {
    /// Optical model to evaluate.
    #[arg(short, long, value_enum)]
    pub model: Option<Model>,

    /// Lower bound of the wavelength sweep, in nm.
    #[arg(long)]
    pub lmin: Option<f64>,

    /// Upper bound of the wavelength sweep, in nm. Excluded by the Bragg
    /// model, included by the transfer matrix model.
    #[arg(long)]
    pub lmax: Option<f64>,

    /// Number of wavelengths in the sweep.
    #[arg(short = 'n', long)]
    pub amount: Option<usize>,

    /// Incidence angle in radians.
    #[arg(long, allow_negative_numbers = true)]
    pub theta: Option<f64>,

    /// Polarization used by the transfer matrix model.
    #[arg(long, value_enum)]
    pub pol: Option<Polarization>,

    /// Lamella spacing of the Bragg model, in nm.
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Number of lamellae in the Bragg model.
    #[arg(long)]
    pub lamellae: Option<u32>,

    /// Number of unit cell repetitions in the multilayer stack.
    #[arg(long)]
    pub periods: Option<usize>,

    /// Output directory for spectra and plots.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Write the spectra but skip the plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Log at debug level. RUST_LOG takes precedence when set.
    #[arg(short, long)]
    pub verbose: bool,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sweep = self.sweep();
        match self.model {
            Model::Bragg => write!(
                f,
                "Settings:
  - Model: Bragg
  - Incidence Angle: {:.6} rad
  - Lamella Spacing: {:.3} nm
  - Lamellae: {}
  - Sweep: [{}, {}) nm, {} samples
  ",
                self.bragg.theta,
                self.bragg.spacing,
                self.bragg.lamellae,
                sweep.lambda_min,
                sweep.lambda_max,
                sweep.amount,
            ),
            Model::Tmm => write!(
                f,
                "Settings:
  - Model: TMM
  - Incidence Angle: {:.6} rad
  - Polarization: {:?}
  - Incident / Exit Index: {} / {}
  - Unit Cell: {:?}
  - Periods: {}
  - Sweep: [{}, {}] nm, {} samples
  ",
                self.tmm.theta,
                self.tmm.polarization,
                self.tmm.incident_index,
                self.tmm.exit_index,
                self.tmm
                    .layers
                    .iter()
                    .map(|layer| (layer.thickness, layer.refr_index.re, layer.refr_index.im))
                    .collect::<Vec<_>>(),
                self.tmm.periods,
                sweep.lambda_min,
                sweep.lambda_max,
                sweep.amount,
            ),
        }
    }
}
