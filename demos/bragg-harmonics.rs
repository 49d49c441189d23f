use std::path::Path;

use morpho::bragg::{self, harmonic_label, normalize_to_peak, BraggModel};
use morpho::output;
use morpho::plot::{self, Series};

fn main() {
    let dir = Path::new("output/bragg-harmonics");
    output::prepare_directory(dir).unwrap();

    // same spacing, growing lamella count sharpens the orders
    let series: Vec<Series> = (1..=5)
        .map(|m| {
            let model = BraggModel::new(0.0, 550.0, m);
            let (wavelengths, intensities) = model.compute_intensity_interval(200.0, 800.0, 1000);
            let normalized = normalize_to_peak(&intensities);
            Series::new(&harmonic_label(m), wavelengths.to_vec(), normalized.to_vec())
        })
        .collect();

    plot::line_plot(
        &dir.join("harmonics.png"),
        "Bragg model",
        "λ",
        "I(λ)",
        &series,
    )
    .unwrap();

    BraggModel::new(0.0, 550.0, 4)
        .plot_intensity_interval(200.0, 800.0, 1000, &dir.join("bragg.png"))
        .unwrap();

    let oblique = BraggModel::new(0.5, 550.0, 4);
    let (wavelengths, intensities) = oblique.compute_intensity_interval(200.0, 800.0, 1000);
    bragg::plot_normalized(
        4,
        &wavelengths,
        &normalize_to_peak(&intensities),
        &dir.join("oblique.png"),
    )
    .unwrap();
}
