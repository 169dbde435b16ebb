pub mod aif;
pub mod binding;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod io;
pub mod roc;
mod utils;

use binding::{
    aggregate_aifs, fit_aif, fit_fun, mean_roc, run_aif_pipeline, run_roc_pipeline,
    signal_to_concentration, PyFitResult, PyRocSummary,
};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

#[pymodule]
fn dcekit(_py: Python, m: pyo3::prelude::Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(fit_fun, m.clone())?)?;
    m.add_function(wrap_pyfunction!(aggregate_aifs, m.clone())?)?;
    m.add_function(wrap_pyfunction!(signal_to_concentration, m.clone())?)?;
    m.add_function(wrap_pyfunction!(fit_aif, m.clone())?)?;
    m.add_function(wrap_pyfunction!(mean_roc, m.clone())?)?;
    m.add_function(wrap_pyfunction!(run_aif_pipeline, m.clone())?)?;
    m.add_function(wrap_pyfunction!(run_roc_pipeline, m.clone())?)?;

    m.add_class::<PyFitResult>()?;
    m.add_class::<PyRocSummary>()?;
    Ok(())
}
