use crate::error::{DceError, DceResult};

/// Flattened indices of the voxels inside a region-of-interest mask.
pub fn roi_indices(roi: &[f64]) -> Vec<usize> {
    roi.iter()
        .enumerate()
        .filter_map(|(i, &v)| (v != 0.0).then_some(i))
        .collect()
}

/// Values of `volume` at the voxels of `roi`. Both volumes must cover the
/// same voxel grid.
pub fn restrict_to_roi(volume: &[f64], roi: &[f64]) -> DceResult<Vec<f64>> {
    if volume.len() != roi.len() {
        return Err(DceError::ShapeMismatch {
            what: "label volume vs. region of interest".to_string(),
            expected: roi.len(),
            found: volume.len(),
        });
    }
    Ok(roi_indices(roi).into_iter().map(|i| volume[i]).collect())
}

/// One-vs-rest binarization against the positive class; any other value,
/// including unseen classes, is negative.
pub fn binarize(values: &[f64], positive_class: f64) -> Vec<bool> {
    values.iter().map(|&v| v == positive_class).collect()
}

/// Binary test labels of one patient: the target label restricted to the
/// ROI and binarized.
pub fn patient_labels(roi: &[f64], target: &[f64], positive_class: f64) -> DceResult<Vec<bool>> {
    Ok(binarize(&restrict_to_roi(target, roi)?, positive_class))
}

#[cfg(test)]
mod labels_tests {
    use super::*;

    #[test]
    fn test_roi_restriction_and_binarization() {
        let roi = [0.0, 255.0, 255.0, 0.0, 1.0];
        let cap = [255.0, 255.0, 0.0, 255.0, 7.0];
        let labels = patient_labels(&roi, &cap, 255.0).unwrap();
        assert_eq!(labels, vec![true, false, false]);
    }

    #[test]
    fn test_roi_indices() {
        assert_eq!(roi_indices(&[0.0, 1.0, 0.0, 3.0]), vec![1, 3]);
        assert!(roi_indices(&[0.0; 4]).is_empty());
    }

    #[test]
    fn test_volume_size_mismatch() {
        let err = restrict_to_roi(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, DceError::ShapeMismatch { expected: 1, found: 2, .. }));
    }
}
