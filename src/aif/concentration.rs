use serde::{Deserialize, Serialize};

use crate::error::{DceError, DceResult};

/// Spoiled gradient-echo acquisition and tissue constants used to turn
/// signal enhancement into gadolinium concentration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxationParams {
    /// Flip angle in degrees.
    pub flip_angle: f64,
    /// Repetition time.
    pub tr: f64,
    /// Pre-contrast longitudinal relaxation time.
    pub t10: f64,
    /// Contrast agent relaxivity.
    pub r1: f64,
}

/// Signal relative to the pre-contrast baseline, taken as the minimum of
/// the first `start_enh` samples. A NaN in the window makes the baseline NaN.
pub fn relative_enhancement(signal: &[f64], start_enh: usize) -> DceResult<Vec<f64>> {
    if start_enh == 0 || start_enh > signal.len() {
        return Err(DceError::InvalidBaseline {
            start_enh,
            len: signal.len(),
        });
    }
    let baseline = signal[..start_enh]
        .iter()
        .copied()
        .fold(f64::INFINITY, |acc, v| {
            if acc.is_nan() || v.is_nan() {
                f64::NAN
            } else {
                acc.min(v)
            }
        });
    Ok(signal.iter().map(|s| s / baseline).collect())
}

/// Concentration for one relative enhancement value.
///
/// Zero denominators and zero log arguments are left to IEEE arithmetic.
pub fn enhancement_to_concentration(s_rel: f64, p: &RelaxationParams) -> f64 {
    let cos_theta = p.flip_angle.to_radians().cos();
    let e1 = (-p.tr / p.t10).exp();
    let e1_sq = (-2.0 * p.tr / p.t10).exp();

    let numerator = e1_sq * cos_theta * (1.0 - s_rel) + e1 * (s_rel * cos_theta - 1.0);
    let denominator = e1 * (cos_theta - s_rel) + s_rel - 1.0;

    ((1.0 / (p.tr * p.r1)) * (numerator / denominator).abs().ln()).abs()
}

pub fn signal_to_concentration(
    signal: &[f64],
    params: &RelaxationParams,
    start_enh: usize,
) -> DceResult<Vec<f64>> {
    let s_rel = relative_enhancement(signal, start_enh)?;
    Ok(s_rel
        .iter()
        .map(|&s| enhancement_to_concentration(s, params))
        .collect())
}

#[cfg(test)]
mod concentration_tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> RelaxationParams {
        RelaxationParams {
            flip_angle: 10.0,
            tr: 0.0049,
            t10: 1.6,
            r1: 3.5,
        }
    }

    #[test]
    fn test_baseline_uses_minimum_not_mean() {
        let s_rel = relative_enhancement(&[4.0, 2.0, 3.0, 8.0], 3).unwrap();
        assert_eq!(s_rel, vec![2.0, 1.0, 1.5, 4.0]);
    }

    #[test]
    fn test_nan_in_baseline_window_propagates() {
        let s_rel = relative_enhancement(&[4.0, f64::NAN, 3.0, 8.0], 3).unwrap();
        assert!(s_rel.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_no_enhancement_gives_zero_concentration() {
        let c = enhancement_to_concentration(1.0, &params());
        assert_relative_eq!(c, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_curve_is_zero_everywhere() {
        let c = signal_to_concentration(&[100.0; 6], &params(), 3).unwrap();
        assert!(c.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_enhancement_increases_concentration() {
        let c = signal_to_concentration(&[100.0, 100.0, 100.0, 120.0, 150.0], &params(), 3)
            .unwrap();
        assert!(c[3] > 0.0);
        assert!(c[4] > c[3]);
        assert!(c.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_zero_baseline_propagates_non_finite_values() {
        let c = signal_to_concentration(&[0.0, 1.0, 2.0, 3.0], &params(), 1).unwrap();
        assert!(c.iter().all(|v| !v.is_finite()));
    }

    #[test]
    fn test_invalid_baseline_window() {
        assert_eq!(
            relative_enhancement(&[1.0, 2.0], 0).unwrap_err(),
            DceError::InvalidBaseline { start_enh: 0, len: 2 }
        );
        assert!(relative_enhancement(&[1.0, 2.0], 3).is_err());
    }
}
