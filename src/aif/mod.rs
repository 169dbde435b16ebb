pub mod aggregate;
pub mod concentration;
pub mod extraction;
pub mod fit;
pub mod model;

use serde::Serialize;

pub use aggregate::{aggregate_aifs, PatientAif, PopulationAif};
pub use concentration::{signal_to_concentration, RelaxationParams};
pub use extraction::{extract_aif, AifEstimator, DceMetadata, DceSeries, Estimator};
pub use fit::{fit_aif, FitOptions, FitReport};
pub use model::{fit_fun, AifParams};

/// Everything the AIF pipeline computes, from the common grid to the
/// fitted model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AifFit {
    pub patients: Vec<String>,
    pub grid: Vec<f64>,
    pub population_signal: Vec<f64>,
    pub concentration: Vec<f64>,
    pub relaxation: RelaxationParams,
    pub fit: FitReport,
}

/// Aggregation, conversion and fitting over already-extracted patient AIFs.
pub fn fit_population(
    patients: &std::collections::BTreeMap<String, PatientAif>,
    relaxation: &RelaxationParams,
    start_enh: usize,
    options: &FitOptions,
) -> crate::error::DceResult<AifFit> {
    let population = aggregate_aifs(patients)?;
    let concentration = signal_to_concentration(&population.signal, relaxation, start_enh)?;
    let fit = fit_aif(&population.grid, &concentration, options)?;

    Ok(AifFit {
        patients: patients.keys().cloned().collect(),
        grid: population.grid,
        population_signal: population.signal,
        concentration,
        relaxation: *relaxation,
        fit,
    })
}
