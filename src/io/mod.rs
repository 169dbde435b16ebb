pub mod input;
pub mod output;

use anyhow::{anyhow, Context};
use std::path::Path;

use crate::aif::{extract_aif, AifEstimator, DceMetadata, PatientAif};
use crate::roc::patient_labels;
use input::{read_dce_series, read_ground_truth};

/// Reads one patient's DCE series, restores the normalization shift and
/// extracts the AIF.
pub fn load_patient_aif(
    patient_dir: &Path,
    dce_dir: &str,
    shift: &[f64],
    estimator: &dyn AifEstimator,
) -> anyhow::Result<(PatientAif, DceMetadata)> {
    let series_dir = patient_dir.join(dce_dir);
    let mut series = read_dce_series(&series_dir)
        .with_context(|| format!("failed to load DCE series from {}", series_dir.display()))?;

    series
        .apply_shift(shift)
        .with_context(|| format!("shift correction failed for {}", series_dir.display()))?;

    let aif = extract_aif(&series, estimator)
        .with_context(|| format!("AIF extraction failed for {}", series_dir.display()))?;

    Ok((aif, series.metadata))
}

/// Binary test labels of one patient: the target label inside the ROI.
pub fn load_patient_labels(
    patient_dir: &Path,
    gt_dirs: &[String],
    gt_labels: &[String],
    roi_label: &str,
    target_label: &str,
    positive_class: f64,
) -> anyhow::Result<Vec<bool>> {
    let volumes = read_ground_truth(patient_dir, gt_dirs, gt_labels)?;

    let roi = volumes
        .get(roi_label)
        .ok_or_else(|| anyhow!("ground truth has no '{}' label", roi_label))?;
    let target = volumes
        .get(target_label)
        .ok_or_else(|| anyhow!("ground truth has no '{}' label", target_label))?;

    Ok(patient_labels(roi, target, positive_class)?)
}
