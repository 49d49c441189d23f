use std::path::Path;

use morpho::multilayer::{periodic_stack, reflectance_peak, TmmModel};
use morpho::tmm::Polarization;
use num_complex::Complex64;

fn main() {
    env_logger::init();

    let dir = Path::new("output/quarter-wave");
    morpho::output::prepare_directory(dir).unwrap();

    // quarter-wave layers for 550 nm
    let high = Complex64::new(1.5, 0.0);
    let low = Complex64::new(1.0, 0.0);
    let cell = [(550.0 / 4.0 / 1.5, high), (550.0 / 4.0, low)];

    for periods in [2, 4, 8] {
        let (d_list, n_list) = periodic_stack(low, &cell, periods, low);
        let model = TmmModel::new(d_list, n_list, 0.0);
        let records = model.calculate_tmm(250.0, 2000.0, 1000).unwrap();
        let peak = reflectance_peak(&records).unwrap();
        println!(
            "{} periods: R = {:.4} at {:.1} nm",
            periods, peak.reflectance, peak.lam_vac
        );
    }

    let (d_list, n_list) = periodic_stack(low, &cell, 4, low);
    let oblique = TmmModel::new(d_list, n_list, 0.4).with_polarization(Polarization::P);
    let written = oblique
        .plot_reflection_and_transmission_amplitude(250.0, 2000.0, 1000, dir)
        .unwrap();
    for path in written {
        println!("wrote {}", path.display());
    }
}
