use pyo3::prelude::*;

use crate::aif::model::PARAM_NAMES;
use crate::aif::{fit_fun, AifFit, AifParams, FitReport};
use crate::roc::MeanRoc;

/// Python representation of a fitted AIF model
///
/// Attributes:
///     params ([float]): A1, A2, T1, T2, sigma1, sigma2, alpha, beta, s, tau, delay
///     cost (float): Sum of squared residuals at the solution
///     evaluations (int): Number of model evaluations
///     termination (str): Solver termination reason
///     grid ([float]): Common time grid (empty for a bare fit)
///     concentration ([float]): Concentration curve that was fitted
///
/// Example:
///     >>> result = dcekit.fit_aif(t, conc)
///     >>> result.param("tau")
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyFitResult {
    #[pyo3(get)]
    pub params: Vec<f64>,
    #[pyo3(get)]
    pub cost: f64,
    #[pyo3(get)]
    pub evaluations: usize,
    #[pyo3(get)]
    pub termination: String,
    #[pyo3(get)]
    pub grid: Vec<f64>,
    #[pyo3(get)]
    pub concentration: Vec<f64>,
}

#[pymethods]
impl PyFitResult {
    #[getter]
    fn param_names(&self) -> Vec<&'static str> {
        PARAM_NAMES.to_vec()
    }

    /// Value of one named parameter.
    fn param(&self, name: &str) -> PyResult<f64> {
        PARAM_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.params[i])
            .ok_or_else(|| {
                pyo3::exceptions::PyKeyError::new_err(format!("unknown parameter '{}'", name))
            })
    }

    /// Evaluates the fitted model on `t`.
    fn evaluate(&self, t: Vec<f64>) -> PyResult<Vec<f64>> {
        let params = AifParams::from_slice(&self.params)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(fit_fun(&t, &params))
    }

    fn __repr__(&self) -> String {
        format!(
            "FitResult(cost={:.4e}, evaluations={}, termination={:?})",
            self.cost, self.evaluations, self.termination
        )
    }
}

impl From<&FitReport> for PyFitResult {
    fn from(report: &FitReport) -> Self {
        Self {
            params: report.params.to_array().to_vec(),
            cost: report.cost,
            evaluations: report.evaluations,
            termination: report.termination.clone(),
            grid: Vec::new(),
            concentration: Vec::new(),
        }
    }
}

impl From<&AifFit> for PyFitResult {
    fn from(fit: &AifFit) -> Self {
        Self {
            grid: fit.grid.clone(),
            concentration: fit.concentration.clone(),
            ..Self::from(&fit.fit)
        }
    }
}

/// Python representation of a fold-averaged ROC curve
///
/// Attributes:
///     fpr ([float]): Common false positive rate grid
///     mean_tpr ([float]): Mean true positive rate per grid point
///     std_tpr ([float]): Population standard deviation of the TPR
///     auc (float): Area under the mean curve
///     auc_std (float): Standard deviation of the per-fold AUCs
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyRocSummary {
    #[pyo3(get)]
    pub fpr: Vec<f64>,
    #[pyo3(get)]
    pub mean_tpr: Vec<f64>,
    #[pyo3(get)]
    pub std_tpr: Vec<f64>,
    #[pyo3(get)]
    pub auc: f64,
    #[pyo3(get)]
    pub auc_std: f64,
    #[pyo3(get)]
    pub fold_aucs: Vec<f64>,
}

#[pymethods]
impl PyRocSummary {
    fn __repr__(&self) -> String {
        format!(
            "RocSummary(auc={:.3}, auc_std={:.3}, folds={})",
            self.auc,
            self.auc_std,
            self.fold_aucs.len()
        )
    }
}

impl From<&MeanRoc> for PyRocSummary {
    fn from(summary: &MeanRoc) -> Self {
        Self {
            fpr: summary.fpr.clone(),
            mean_tpr: summary.mean_tpr.clone(),
            std_tpr: summary.std_tpr.clone(),
            auc: summary.auc,
            auc_std: summary.auc_std,
            fold_aucs: summary.fold_aucs.clone(),
        }
    }
}
