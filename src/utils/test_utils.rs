use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::aif::{AifParams, DceMetadata, DceSeries, FitOptions, PatientAif};

/// Keys the curves as `patient_00`, `patient_01`, ... in input order.
pub fn patients_from_curves(curves: &[(Vec<f64>, Vec<f64>)]) -> BTreeMap<String, PatientAif> {
    curves
        .iter()
        .enumerate()
        .map(|(i, (time, signal))| {
            (
                format!("patient_{:02}", i),
                PatientAif::new(time.clone(), signal.clone()).unwrap(),
            )
        })
        .collect()
}

/// Literature parameter set with a three-sample delay.
pub fn reference_params() -> AifParams {
    AifParams::from_slice(&FitOptions::with_baseline(3).initial_guess).unwrap()
}

/// Adds uniform noise in `[-sigma, sigma]`, reproducible per seed.
pub fn add_noise(values: &[f64], sigma: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    values
        .iter()
        .map(|v| v + rng.random_range(-sigma..=sigma))
        .collect()
}

pub fn dummy_series(time: &[f64], frames: &[Vec<f64>]) -> DceSeries {
    DceSeries {
        time: time.to_vec(),
        frames: frames.to_vec(),
        metadata: DceMetadata {
            flip_angle: 10.0,
            tr: 0.0049,
        },
    }
}
