use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{DceError, DceResult};

pub const N_PARAMS: usize = 11;

pub const PARAM_NAMES: [&str; N_PARAMS] = [
    "A1", "A2", "T1", "T2", "sigma1", "sigma2", "alpha", "beta", "s", "tau", "delay",
];

/// Parameters of the bi-Gaussian plus sigmoid-modulated exponential AIF model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AifParams {
    pub a1: f64,
    pub a2: f64,
    pub t1: f64,
    pub t2: f64,
    pub sigma1: f64,
    pub sigma2: f64,
    pub alpha: f64,
    pub beta: f64,
    pub s: f64,
    pub tau: f64,
    /// Bolus arrival delay in samples; truncated toward zero when evaluated.
    pub delay: f64,
}

impl AifParams {
    pub fn from_slice(values: &[f64]) -> DceResult<Self> {
        if values.len() != N_PARAMS {
            return Err(DceError::ParameterCount {
                expected: N_PARAMS,
                found: values.len(),
            });
        }
        Ok(Self {
            a1: values[0],
            a2: values[1],
            t1: values[2],
            t2: values[3],
            sigma1: values[4],
            sigma2: values[5],
            alpha: values[6],
            beta: values[7],
            s: values[8],
            tau: values[9],
            delay: values[10],
        })
    }

    pub fn to_array(&self) -> [f64; N_PARAMS] {
        [
            self.a1,
            self.a2,
            self.t1,
            self.t2,
            self.sigma1,
            self.sigma2,
            self.alpha,
            self.beta,
            self.s,
            self.tau,
            self.delay,
        ]
    }

    /// Integer shift actually applied by the model.
    pub fn delay_samples(&self) -> i64 {
        self.delay as i64
    }
}

fn gaussian_bolus(t: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    (amplitude / (sigma * (2.0 * PI).sqrt())) * (-((t - center).powi(2)) / (2.0 * sigma.powi(2))).exp()
}

fn recirculation_tail(t: f64, p: &AifParams) -> f64 {
    p.alpha * (-p.beta * t).exp() / (1.0 + (-p.s * (t - p.tau)).exp())
}

/// Raw model values before the arrival delay is applied.
///
/// Each bolus term carries its own copy of the tail, so the tail
/// contributes twice to every sample.
pub fn model_signal(t: &[f64], p: &AifParams) -> Vec<f64> {
    t.iter()
        .map(|&ti| {
            let tail = recirculation_tail(ti, p);
            gaussian_bolus(ti, p.a1, p.t1, p.sigma1)
                + tail
                + gaussian_bolus(ti, p.a2, p.t2, p.sigma2)
                + tail
        })
        .collect()
}

/// Rotates `values` right by `delay` positions and zeroes the first `delay`
/// entries. A delay at or beyond the length clears the whole curve.
/// A negative delay rotates left and clears nothing.
pub fn apply_delay(values: &mut [f64], delay: i64) {
    let n = values.len();
    if n == 0 || delay == 0 {
        return;
    }
    let k = delay.unsigned_abs() as usize % n;
    if delay > 0 {
        values.rotate_right(k);
        let cut = (delay as usize).min(n);
        values[..cut].iter_mut().for_each(|v| *v = 0.0);
    } else {
        values.rotate_left(k);
    }
}

/// Evaluates the delayed composite AIF model on `t`.
pub fn fit_fun(t: &[f64], p: &AifParams) -> Vec<f64> {
    let mut values = model_signal(t, p);
    apply_delay(&mut values, p.delay_samples());
    values
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gaussian_only(sigma1: f64, t1: f64) -> AifParams {
        AifParams {
            a1: 1.0,
            a2: 0.0,
            t1,
            t2: 0.0,
            sigma1,
            sigma2: 1.0,
            alpha: 0.0,
            beta: 0.0,
            s: 0.0,
            tau: 0.0,
            delay: 0.0,
        }
    }

    #[test]
    fn test_peak_of_unit_gaussian() {
        let p = gaussian_only(2.0, 0.0);
        let out = fit_fun(&[0.0, 1.0, 2.0], &p);
        assert_relative_eq!(out[0], 1.0 / (2.0 * (2.0 * PI).sqrt()), epsilon = 1e-12);
        assert!(out[1] < out[0]);
    }

    #[test]
    fn test_tail_counted_twice() {
        let p = AifParams {
            a1: 0.0,
            a2: 0.0,
            alpha: 2.0,
            beta: 0.0,
            s: 1.0,
            tau: 0.0,
            ..gaussian_only(1.0, 0.0)
        };
        // sigmoid at t = tau is 1/2, so each tail copy is alpha / 2
        let out = fit_fun(&[0.0], &p);
        assert_relative_eq!(out[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_delay_shifts_and_zeroes_prefix() {
        let t: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let mut p = gaussian_only(1.5, 3.0);
        let raw = fit_fun(&t, &p);

        for d in 0..8usize {
            p.delay = d as f64 + 0.7;
            let shifted = fit_fun(&t, &p);
            assert!(shifted[..d].iter().all(|&v| v == 0.0));
            for k in 0..(t.len() - d) {
                assert_eq!(shifted[d + k], raw[k]);
            }
        }
    }

    #[test]
    fn test_delay_beyond_length_clears_curve() {
        let t = [0.0, 1.0, 2.0];
        let mut p = gaussian_only(1.0, 1.0);
        p.delay = 3.0;
        assert!(fit_fun(&t, &p).iter().all(|&v| v == 0.0));
        p.delay = 10.0;
        assert!(fit_fun(&t, &p).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_negative_delay_rotates_left() {
        let mut values = vec![1.0, 2.0, 3.0, 4.0];
        apply_delay(&mut values, -1);
        assert_eq!(values, vec![2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_fractional_delay_truncates() {
        let p = AifParams {
            delay: 2.99,
            ..gaussian_only(1.0, 0.0)
        };
        assert_eq!(p.delay_samples(), 2);
    }

    #[test]
    fn test_from_slice_requires_eleven_values() {
        let err = AifParams::from_slice(&[1.0; 10]).unwrap_err();
        assert_eq!(
            err,
            DceError::ParameterCount {
                expected: 11,
                found: 10
            }
        );
        let p = AifParams::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0])
            .unwrap();
        assert_eq!(p.tau, 10.0);
        assert_eq!(p.to_array()[10], 11.0);
    }
}
