use thiserror::Error;

/// Failures of the numeric core. I/O and pipeline glue wrap these in
/// `anyhow::Error` with context.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DceError {
    #[error("no input curves were provided")]
    EmptyInput,

    #[error("shape mismatch for {what}: expected length {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("baseline window of {start_enh} samples is invalid for a curve of length {len}")]
    InvalidBaseline { start_enh: usize, len: usize },

    #[error("a false-positive-rate grid needs at least 2 points, got {0}")]
    InvalidGrid(usize),

    #[error("expected {expected} model parameters, found {found}")]
    ParameterCount { expected: usize, found: usize },

    #[error("initial guess for '{name}' ({value}) lies outside [{lower}, {upper}]")]
    InfeasibleInitialGuess {
        name: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("curve fit did not converge: {0}")]
    FitFailed(String),
}

pub type DceResult<T> = Result<T, DceError>;
