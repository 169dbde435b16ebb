pub mod classes;
pub mod entry;

pub use classes::{PyFitResult, PyRocSummary};
pub use entry::{
    aggregate_aifs, fit_aif, fit_fun, mean_roc, run_aif_pipeline, run_roc_pipeline,
    signal_to_concentration,
};
