use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::classes::{PyFitResult, PyRocSummary};
use crate::aif::{self, AifParams, FitOptions, PatientAif, RelaxationParams};
use crate::config::load_config;
use crate::entry;
use crate::error::DceError;
use crate::roc::{self, RocCurve};

fn value_error(e: DceError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn runtime_error(e: anyhow::Error) -> PyErr {
    PyRuntimeError::new_err(format!("{:#}", e))
}

/// Evaluates the bi-exponential AIF model at the time points ``t``.
///
/// Arguments:
///
/// - ``t`` – Time points
/// - ``params`` – A1, A2, T1, T2, sigma1, sigma2, alpha, beta, s, tau, delay
#[pyfunction]
pub fn fit_fun(t: Vec<f64>, params: Vec<f64>) -> PyResult<Vec<f64>> {
    let params = AifParams::from_slice(&params).map_err(value_error)?;
    Ok(aif::fit_fun(&t, &params))
}

/// Resamples per-patient AIFs onto the median time grid and averages them.
///
/// Arguments:
///
/// - ``patients`` – Mapping of patient id to ``(time, signal)``
///
/// Returns:
///
/// ``(grid, signal)``
#[pyfunction]
pub fn aggregate_aifs(
    patients: HashMap<String, (Vec<f64>, Vec<f64>)>,
) -> PyResult<(Vec<f64>, Vec<f64>)> {
    let patients = patients
        .into_iter()
        .map(|(id, (time, signal))| PatientAif::new(time, signal).map(|aif| (id, aif)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map_err(value_error)?;
    let population = aif::aggregate_aifs(&patients).map_err(value_error)?;
    Ok((population.grid, population.signal))
}

#[pyfunction]
#[pyo3(signature = (signal, flip_angle, tr, t10 = 1.6f64, r1 = 3.5f64, start_enh = 3usize))]
pub fn signal_to_concentration(
    signal: Vec<f64>,
    flip_angle: f64,
    tr: f64,
    t10: f64,
    r1: f64,
    start_enh: usize,
) -> PyResult<Vec<f64>> {
    let params = RelaxationParams {
        flip_angle,
        tr,
        t10,
        r1,
    };
    aif::signal_to_concentration(&signal, &params, start_enh).map_err(value_error)
}

/// Bounded least-squares fit of the AIF model to a concentration curve.
///
/// Arguments:
///
/// - ``t`` – Time grid
/// - ``concentration`` – Observed concentration
/// - ``initial_guess`` (default: literature values, delay = ``start_enh``)
/// - ``lower`` / ``upper`` (default: 0 / +inf)
/// - ``start_enh`` (default: 3)
/// - ``patience`` (default: 100) – Evaluation budget factor
#[pyfunction]
#[pyo3(signature = (
    t,
    concentration,
    initial_guess = None,
    lower = None,
    upper = None,
    start_enh = 3usize,
    patience = 100usize
))]
pub fn fit_aif(
    t: Vec<f64>,
    concentration: Vec<f64>,
    initial_guess: Option<Vec<f64>>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
    start_enh: usize,
    patience: usize,
) -> PyResult<PyFitResult> {
    let mut options = FitOptions::with_baseline(start_enh);
    options.patience = patience;
    if let Some(values) = initial_guess {
        options.initial_guess = AifParams::from_slice(&values)
            .map_err(value_error)?
            .to_array();
    }
    if let Some(values) = lower {
        options.lower = AifParams::from_slice(&values)
            .map_err(value_error)?
            .to_array();
    }
    if let Some(values) = upper {
        options.upper = AifParams::from_slice(&values)
            .map_err(value_error)?
            .to_array();
    }

    let report = aif::fit_aif(&t, &concentration, &options).map_err(value_error)?;
    Ok(PyFitResult::from(&report))
}

/// Averages per-fold ROC curves on a common FPR grid.
///
/// Arguments:
///
/// - ``fprs`` / ``tprs`` – One list per fold
/// - ``n_points`` (default: 30)
#[pyfunction]
#[pyo3(signature = (fprs, tprs, n_points = 30usize))]
pub fn mean_roc(fprs: Vec<Vec<f64>>, tprs: Vec<Vec<f64>>, n_points: usize) -> PyResult<PyRocSummary> {
    if fprs.len() != tprs.len() {
        return Err(PyValueError::new_err(format!(
            "{} FPR curves but {} TPR curves",
            fprs.len(),
            tprs.len()
        )));
    }
    let folds: Vec<RocCurve> = fprs
        .into_iter()
        .zip(tprs)
        .map(|(fpr, tpr)| RocCurve { fpr, tpr })
        .collect();
    let summary = roc::mean_roc(&folds, n_points).map_err(value_error)?;
    Ok(PyRocSummary::from(&summary))
}

/// Runs the population AIF pipeline described by a TOML config.
///
/// Example:
///
/// .. code-block:: python
///
///    import dcekit
///    result = dcekit.run_aif_pipeline("dcekit.toml")
///    print(result.params)
#[pyfunction]
#[pyo3(signature = (config_path, output_path = None))]
pub fn run_aif_pipeline(config_path: &str, output_path: Option<&str>) -> PyResult<PyFitResult> {
    let mut config = load_config(Path::new(config_path)).map_err(runtime_error)?;
    if let Some(output) = output_path {
        config.aif.output = Some(PathBuf::from(output));
    }
    let fit = entry::run_aif_pipeline(&config.aif).map_err(runtime_error)?;
    Ok(PyFitResult::from(&fit))
}

/// Runs the ROC comparison described by a TOML config.
///
/// Returns:
///
/// One list per classifier configuration of ``(label, PyRocSummary)``.
#[pyfunction]
pub fn run_roc_pipeline(config_path: &str) -> PyResult<Vec<Vec<(String, PyRocSummary)>>> {
    let config = load_config(Path::new(config_path)).map_err(runtime_error)?;
    let comparisons = entry::run_roc_pipeline(&config.roc).map_err(runtime_error)?;
    Ok(comparisons
        .iter()
        .map(|c| {
            c.methods
                .iter()
                .map(|(label, summary)| (label.clone(), PyRocSummary::from(summary)))
                .collect()
        })
        .collect())
}
