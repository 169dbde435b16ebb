use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{DVector, Dyn, OMatrix, Owned, SVector, U11};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{fit_fun, AifParams, N_PARAMS, PARAM_NAMES};
use crate::error::{DceError, DceResult};

type Params = SVector<f64, N_PARAMS>;

/// Initial guess, box constraints and solver tolerances for the AIF fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub initial_guess: [f64; N_PARAMS],
    pub lower: [f64; N_PARAMS],
    pub upper: [f64; N_PARAMS],
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
    /// Evaluation budget, in multiples of (parameters + 1).
    pub patience: usize,
}

impl FitOptions {
    /// Defaults with the delay guess set to the baseline window length.
    pub fn with_baseline(start_enh: usize) -> Self {
        let mut options = Self::default();
        options.initial_guess[10] = start_enh as f64;
        options
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial_guess: [
                48.54, 19.8, 10.2276, 21.9, 3.378, 7.92, 1.050, 0.0028083, 0.63463, 28.98, 3.0,
            ],
            lower: [0.0; N_PARAMS],
            upper: [f64::INFINITY; N_PARAMS],
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
            patience: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub params: AifParams,
    /// Sum of squared residuals at the solution.
    pub cost: f64,
    pub evaluations: usize,
    pub termination: String,
}

/// Maps an unconstrained coordinate into `[lower, upper]` by reflection at
/// the finite bounds. Identity inside the box.
fn reflect_into(q: f64, lower: f64, upper: f64) -> f64 {
    match (lower.is_finite(), upper.is_finite()) {
        (false, false) => q,
        (true, false) => lower + (q - lower).abs(),
        (false, true) => upper - (upper - q).abs(),
        (true, true) => {
            let width = upper - lower;
            if width <= 0.0 {
                return lower;
            }
            let r = (q - lower).rem_euclid(2.0 * width);
            lower + if r <= width { r } else { 2.0 * width - r }
        }
    }
}

struct AifFitProblem<'a> {
    t: &'a [f64],
    target: &'a [f64],
    lower: [f64; N_PARAMS],
    upper: [f64; N_PARAMS],
    q: Params,
}

impl AifFitProblem<'_> {
    fn bounded(&self, q: &Params) -> [f64; N_PARAMS] {
        let mut p = [0.0; N_PARAMS];
        for (i, value) in p.iter_mut().enumerate() {
            *value = reflect_into(q[i], self.lower[i], self.upper[i]);
        }
        p
    }

    fn residuals_at(&self, q: &Params) -> Option<DVector<f64>> {
        let params = AifParams::from_slice(&self.bounded(q)).ok()?;
        let model = fit_fun(self.t, &params);
        let r = DVector::from_iterator(
            self.t.len(),
            model.iter().zip(self.target).map(|(m, y)| m - y),
        );
        r.iter().all(|v| v.is_finite()).then_some(r)
    }
}

impl LeastSquaresProblem<f64, Dyn, U11> for AifFitProblem<'_> {
    type ParameterStorage = Owned<f64, U11>;
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U11>;

    fn set_params(&mut self, q: &Params) {
        self.q.copy_from(q);
    }

    fn params(&self) -> Params {
        self.q
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_at(&self.q)
    }

    // Forward differences with a relative step. The delay column is zero
    // unless a step crosses an integer.
    fn jacobian(&self) -> Option<OMatrix<f64, Dyn, U11>> {
        let base = self.residuals_at(&self.q)?;
        let rel_step = f64::EPSILON.sqrt();
        let mut jac = OMatrix::<f64, Dyn, U11>::zeros(self.t.len());

        for col in 0..N_PARAMS {
            let x0 = self.q[col];
            let sign = if x0 >= 0.0 { 1.0 } else { -1.0 };
            let h = rel_step * sign * x0.abs().max(1.0);
            let mut shifted = self.q;
            shifted[col] = x0 + h;
            let h = shifted[col] - x0;
            let r = self.residuals_at(&shifted)?;
            for row in 0..self.t.len() {
                jac[(row, col)] = (r[row] - base[row]) / h;
            }
        }
        Some(jac)
    }
}

/// Least-squares fit of the composite AIF model to `concentration` sampled
/// at `t`, constrained to the options' bounds box.
pub fn fit_aif(t: &[f64], concentration: &[f64], options: &FitOptions) -> DceResult<FitReport> {
    if t.len() != concentration.len() {
        return Err(DceError::ShapeMismatch {
            what: "concentration curve vs. time grid".to_string(),
            expected: t.len(),
            found: concentration.len(),
        });
    }
    if t.is_empty() {
        return Err(DceError::EmptyInput);
    }
    if !t.iter().chain(concentration).all(|v| v.is_finite()) {
        return Err(DceError::FitFailed(
            "time grid or concentration curve contains non-finite values".to_string(),
        ));
    }
    for i in 0..N_PARAMS {
        let value = options.initial_guess[i];
        if !(options.lower[i]..=options.upper[i]).contains(&value) {
            return Err(DceError::InfeasibleInitialGuess {
                name: PARAM_NAMES[i],
                value,
                lower: options.lower[i],
                upper: options.upper[i],
            });
        }
    }

    let problem = AifFitProblem {
        t,
        target: concentration,
        lower: options.lower,
        upper: options.upper,
        q: Params::from_row_slice(&options.initial_guess),
    };

    let solver = LevenbergMarquardt::new()
        .with_ftol(options.ftol)
        .with_xtol(options.xtol)
        .with_gtol(options.gtol)
        .with_patience(options.patience);
    let (solved, report) = solver.minimize(problem);

    debug!(termination = ?report.termination, evaluations = report.number_of_evaluations, "solver finished");

    let cost = 2.0 * report.objective_function;
    if !report.termination.was_successful() || !cost.is_finite() {
        return Err(DceError::FitFailed(format!("{:?}", report.termination)));
    }

    let params = AifParams::from_slice(&solved.bounded(&solved.q))?;
    info!(cost, evaluations = report.number_of_evaluations, "AIF model fitted");

    Ok(FitReport {
        params,
        cost,
        evaluations: report.number_of_evaluations,
        termination: format!("{:?}", report.termination),
    })
}

#[cfg(test)]
mod fit_tests {
    use super::*;
    use crate::utils::test_utils::{add_noise, reference_params};
    use approx::assert_relative_eq;

    #[test]
    fn test_reflect_into_bounds() {
        assert_relative_eq!(reflect_into(-2.0, 0.0, f64::INFINITY), 2.0);
        assert_relative_eq!(reflect_into(3.0, 0.0, f64::INFINITY), 3.0);
        assert_relative_eq!(reflect_into(5.0, f64::NEG_INFINITY, 4.0), 3.0);
        assert_relative_eq!(reflect_into(1.5, 0.0, 1.0), 0.5);
        assert_relative_eq!(reflect_into(-0.25, 0.0, 1.0), 0.25);
        assert_relative_eq!(reflect_into(7.0, f64::NEG_INFINITY, f64::INFINITY), 7.0);
    }

    #[test]
    fn test_recovers_noise_free_curve() {
        let truth = reference_params();
        let t: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let y = fit_fun(&t, &truth);

        let mut options = FitOptions::default();
        options.initial_guess = truth.to_array();
        options.initial_guess[0] *= 1.05;
        options.initial_guess[2] += 0.3;

        let report = fit_aif(&t, &y, &options).unwrap();

        assert!(report.cost < 1e-6, "cost too high: {}", report.cost);
        assert_relative_eq!(report.params.a1, truth.a1, max_relative = 1e-2);
        assert_relative_eq!(report.params.t1, truth.t1, max_relative = 1e-2);
        assert_eq!(report.params.delay_samples(), truth.delay_samples());
    }

    #[test]
    fn test_noisy_fit_respects_bounds() {
        let truth = reference_params();
        let t: Vec<f64> = (0..40).map(|i| i as f64 * 1.5).collect();
        let y = add_noise(&fit_fun(&t, &truth), 0.05, 7);

        let report = fit_aif(&t, &y, &FitOptions::with_baseline(3)).unwrap();

        assert!(report.params.to_array().iter().all(|&p| p >= 0.0));
        assert!(report.cost.is_finite());
    }

    #[test]
    fn test_initial_guess_outside_bounds() {
        let t = [0.0, 1.0, 2.0];
        let y = [0.0, 1.0, 0.0];
        let mut options = FitOptions::default();
        options.initial_guess[4] = -1.0;

        let err = fit_aif(&t, &y, &options).unwrap_err();
        assert!(matches!(
            err,
            DceError::InfeasibleInitialGuess { name: "sigma1", .. }
        ));
    }

    #[test]
    fn test_non_finite_target_is_rejected() {
        let t = [0.0, 1.0, 2.0];
        let y = [0.0, f64::NAN, 0.0];
        let err = fit_aif(&t, &y, &FitOptions::default()).unwrap_err();
        assert!(matches!(err, DceError::FitFailed(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = fit_aif(&[0.0, 1.0], &[0.0], &FitOptions::default()).unwrap_err();
        assert!(matches!(err, DceError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_with_baseline_sets_delay_guess() {
        let options = FitOptions::with_baseline(5);
        assert_eq!(options.initial_guess[10], 5.0);
        assert_eq!(options.initial_guess[0], 48.54);
    }
}
