use anyhow::Result;
use clap::Parser;
use morpho::bragg::{self, normalize_to_peak};
use morpho::multilayer::{self, reflectance_peak};
use morpho::output;
use morpho::settings::{self, CliArgs, Model, Settings};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = settings::load_config(&args)?;
    println!("{}", settings);

    output::prepare_directory(&settings.directory)?;
    log::info!("running {:?} model into {}", settings.model, settings.directory.display());
    match settings.model {
        Model::Bragg => run_bragg(&settings)?,
        Model::Tmm => run_tmm(&settings)?,
    }
    output::write_settings(&settings.directory, &settings)?;

    Ok(())
}

fn run_bragg(settings: &Settings) -> Result<()> {
    let model = settings.bragg_model();
    let sweep = settings.bragg.sweep;
    let (wavelengths, intensities) =
        model.compute_intensity_interval(sweep.lambda_min, sweep.lambda_max, sweep.amount);
    // same steps as BraggModel::plot_intensity_interval, split so the
    // normalized spectrum is written to disk as well as plotted
    let normalized = normalize_to_peak(&intensities);

    output::write_intensity(&settings.directory, &wavelengths, &intensities, &normalized)?;
    if settings.plot {
        let path = settings.directory.join("bragg.png");
        bragg::plot_normalized(model.lamellae(), &wavelengths, &normalized, &path)?;
    }

    let peak = wavelengths
        .iter()
        .zip(intensities.iter())
        .filter(|(_, value)| value.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1));
    if let Some((lambda, value)) = peak {
        println!("Peak intensity {:.4} at {:.2} nm", value, lambda);
    }
    Ok(())
}

fn run_tmm(settings: &Settings) -> Result<()> {
    let model = settings.tmm_model();
    let sweep = settings.tmm.sweep;
    let records = model.calculate_tmm(sweep.lambda_min, sweep.lambda_max, sweep.amount)?;

    output::write_tmm(&settings.directory, &records)?;
    output::write_tmm_json(&settings.directory, &records)?;
    if settings.plot {
        multilayer::plot_records(&records, &settings.directory)?;
    }

    if let Some(peak) = reflectance_peak(&records) {
        println!(
            "Peak reflectance {:.4} at {:.2} nm",
            peak.reflectance, peak.lam_vac
        );
    }
    Ok(())
}
