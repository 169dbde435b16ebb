use serde::{Deserialize, Serialize};

use super::aggregate::PatientAif;
use crate::error::{DceError, DceResult};
use crate::utils::numeric::{mean, median};

/// Acquisition metadata stored next to each DCE series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DceMetadata {
    /// Flip angle in degrees.
    pub flip_angle: f64,
    /// Repetition time.
    pub tr: f64,
}

/// A DCE acquisition restricted to the arterial voxels: one row of voxel
/// intensities per timepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DceSeries {
    pub time: Vec<f64>,
    pub frames: Vec<Vec<f64>>,
    pub metadata: DceMetadata,
}

impl DceSeries {
    pub fn n_timepoints(&self) -> usize {
        self.time.len()
    }

    /// Adds `shift[i]` to every voxel of timepoint `i`, undoing the
    /// per-timepoint offset removed during intensity normalization.
    pub fn apply_shift(&mut self, shift: &[f64]) -> DceResult<()> {
        if shift.len() < self.frames.len() {
            return Err(DceError::ShapeMismatch {
                what: "intensity shift vector".to_string(),
                expected: self.frames.len(),
                found: shift.len(),
            });
        }
        for (frame, offset) in self.frames.iter_mut().zip(shift) {
            frame.iter_mut().for_each(|v| *v += offset);
        }
        Ok(())
    }
}

/// Collapses the voxels of one timepoint into a single AIF sample.
pub trait AifEstimator {
    fn estimate(&self, voxels: &[f64]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    #[default]
    Median,
    Mean,
}

impl AifEstimator for Estimator {
    fn estimate(&self, voxels: &[f64]) -> f64 {
        match self {
            Estimator::Median => median(voxels),
            Estimator::Mean => mean(voxels),
        }
    }
}

/// Per-patient AIF: one estimate per timepoint over the arterial voxels.
pub fn extract_aif(series: &DceSeries, estimator: &dyn AifEstimator) -> DceResult<PatientAif> {
    if series.frames.is_empty() {
        return Err(DceError::EmptyInput);
    }
    let signal = series
        .frames
        .iter()
        .map(|frame| estimator.estimate(frame))
        .collect();
    PatientAif::new(series.time.clone(), signal)
}
