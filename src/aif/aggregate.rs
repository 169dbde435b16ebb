use std::collections::BTreeMap;

use crate::error::{DceError, DceResult};
use crate::utils::numeric::{column_reduce, interp, mean, median};

/// AIF samples of one patient on that patient's own time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientAif {
    pub time: Vec<f64>,
    pub signal: Vec<f64>,
}

impl PatientAif {
    pub fn new(time: Vec<f64>, signal: Vec<f64>) -> DceResult<Self> {
        if time.len() != signal.len() {
            return Err(DceError::ShapeMismatch {
                what: "patient AIF samples vs. time axis".to_string(),
                expected: time.len(),
                found: signal.len(),
            });
        }
        Ok(Self { time, signal })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationAif {
    /// Element-wise median of the patient time axes.
    pub grid: Vec<f64>,
    /// Mean of the patient AIFs resampled onto `grid`.
    pub signal: Vec<f64>,
}

/// Element-wise median of equal-length time axes.
pub fn median_time_grid<T: AsRef<[f64]>>(axes: &[T]) -> DceResult<Vec<f64>> {
    column_reduce(axes, "patient time axis", median)
}

/// Resamples every patient AIF onto the median grid and averages them.
pub fn aggregate_aifs(patients: &BTreeMap<String, PatientAif>) -> DceResult<PopulationAif> {
    if patients.is_empty() {
        return Err(DceError::EmptyInput);
    }

    let axes: Vec<&[f64]> = patients.values().map(|p| p.time.as_slice()).collect();
    let grid = median_time_grid(&axes)?;

    let resampled = patients
        .values()
        .map(|p| interp(&grid, &p.time, &p.signal))
        .collect::<DceResult<Vec<_>>>()?;

    let signal = column_reduce(&resampled, "resampled AIF", mean)?;

    Ok(PopulationAif { grid, signal })
}
