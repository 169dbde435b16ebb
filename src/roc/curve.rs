use serde::{Deserialize, Serialize};

use crate::error::{DceError, DceResult};
use crate::utils::numeric::trapezoid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
}

impl RocCurve {
    pub fn auc(&self) -> f64 {
        trapezoid(&self.fpr, &self.tpr)
    }
}

/// ROC curve of `scores` against binary `labels`, one point per distinct
/// score threshold (highest first) plus the leading `(0, 0)` point.
///
/// A fold without positives or negatives yields NaN rates.
pub fn roc_curve(labels: &[bool], scores: &[f64]) -> DceResult<RocCurve> {
    if labels.len() != scores.len() {
        return Err(DceError::ShapeMismatch {
            what: "classifier scores vs. labels".to_string(),
            expected: labels.len(),
            found: scores.len(),
        });
    }
    if labels.is_empty() {
        return Err(DceError::EmptyInput);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tps = vec![0.0];
    let mut fps = vec![0.0];
    let (mut tp, mut fp) = (0.0, 0.0);
    for (rank, &i) in order.iter().enumerate() {
        if labels[i] {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_threshold = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_threshold {
            tps.push(tp);
            fps.push(fp);
        }
    }

    let (total_tp, total_fp) = (tp, fp);
    Ok(RocCurve {
        fpr: fps.iter().map(|v| v / total_fp).collect(),
        tpr: tps.iter().map(|v| v / total_tp).collect(),
    })
}

#[cfg(test)]
mod curve_tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_classifier() {
        let labels = [true, true, false, false];
        let scores = [0.9, 0.8, 0.2, 0.1];
        let roc = roc_curve(&labels, &scores).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.0, 0.5, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0, 1.0, 1.0]);
        assert_relative_eq!(roc.auc(), 1.0);
    }

    #[test]
    fn test_tied_scores_share_a_threshold() {
        let labels = [true, false, true, false];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let roc = roc_curve(&labels, &scores).unwrap();
        assert_eq!(roc.fpr, vec![0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 1.0]);
        assert_relative_eq!(roc.auc(), 0.5);
    }

    #[test]
    fn test_mixed_ranking_auc() {
        // one inversion out of four positive/negative pairs
        let labels = [true, false, true, false];
        let scores = [0.9, 0.8, 0.7, 0.1];
        let roc = roc_curve(&labels, &scores).unwrap();
        assert_relative_eq!(roc.auc(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_no_positive_labels_gives_nan_tpr() {
        let roc = roc_curve(&[false, false], &[0.1, 0.2]).unwrap();
        assert!(roc.tpr.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_no_negative_labels_gives_nan_fpr() {
        let roc = roc_curve(&[true, true, true], &[0.9, 0.4, 0.1]).unwrap();
        assert_eq!(roc.fpr.len(), 4);
        assert!(roc.fpr.iter().all(|v| v.is_nan()));
        assert_relative_eq!(roc.tpr[3], 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(roc_curve(&[true], &[0.1, 0.2]).is_err());
        assert_eq!(roc_curve(&[], &[]).unwrap_err(), DceError::EmptyInput);
    }
}
