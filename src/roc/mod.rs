pub mod curve;
pub mod labels;
pub mod plot;
pub mod summary;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use curve::{roc_curve, RocCurve};
pub use labels::patient_labels;
pub use summary::{mean_roc, MeanRoc};

/// Outcome of one LOPO fold: either a ready ROC curve or the classifier
/// scores of the held-out patient's voxels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FoldResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roc: Option<RocCurve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
}

impl FoldResult {
    pub fn to_roc(&self, labels: Option<&[bool]>) -> anyhow::Result<RocCurve> {
        match (&self.roc, &self.scores) {
            (Some(roc), _) => Ok(roc.clone()),
            (None, Some(scores)) => {
                let labels = labels.ok_or_else(|| anyhow!("fold has scores but no test labels"))?;
                Ok(roc_curve(labels, scores)?)
            }
            (None, None) => Err(anyhow!("fold holds neither an ROC curve nor scores")),
        }
    }
}

/// Results of one experiment: configurations, each a list of LOPO folds.
pub type ExperimentResults = Vec<Vec<FoldResult>>;

/// Mean ROC per configuration of one experiment. `fold_labels[i]` are the
/// test labels of the patient held out in fold `i`.
pub fn summarize_experiment(
    results: &ExperimentResults,
    fold_labels: &[Vec<bool>],
    n_points: usize,
) -> anyhow::Result<Vec<MeanRoc>> {
    results
        .iter()
        .enumerate()
        .map(|(config_idx, folds)| {
            let rocs = folds
                .iter()
                .enumerate()
                .map(|(fold_idx, fold)| {
                    fold.to_roc(fold_labels.get(fold_idx).map(Vec::as_slice))
                        .with_context(|| format!("configuration {} fold {}", config_idx, fold_idx + 1))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            let summary = mean_roc(&rocs, n_points)
                .with_context(|| format!("averaging ROC curves of configuration {}", config_idx))?;
            info!(
                configuration = config_idx,
                folds = rocs.len(),
                auc = summary.auc,
                auc_std = summary.auc_std,
                "mean ROC computed"
            );
            Ok(summary)
        })
        .collect()
}

#[cfg(test)]
mod roc_tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scores_are_scored_against_fold_labels() {
        let results: ExperimentResults = vec![vec![
            FoldResult {
                roc: None,
                scores: Some(vec![0.9, 0.1]),
            },
            FoldResult {
                roc: Some(RocCurve {
                    fpr: vec![0.0, 1.0],
                    tpr: vec![0.0, 1.0],
                }),
                scores: None,
            },
        ]];
        let labels = vec![vec![true, false], vec![]];

        let summaries = summarize_experiment(&results, &labels, 30).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].fold_aucs.len(), 2);
        assert!(summaries[0].fold_aucs[0] > summaries[0].fold_aucs[1]);
        assert_relative_eq!(summaries[0].fold_aucs[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_scores_without_labels_fail() {
        let results: ExperimentResults = vec![vec![FoldResult {
            roc: None,
            scores: Some(vec![0.5]),
        }]];
        assert!(summarize_experiment(&results, &[], 30).is_err());
    }

    #[test]
    fn test_empty_fold_fails() {
        assert!(FoldResult::default().to_roc(None).is_err());
    }

    #[test]
    fn test_single_class_folds_summarize_to_nan() {
        let results: ExperimentResults = vec![vec![
            FoldResult {
                roc: None,
                scores: Some(vec![0.9, 0.4, 0.1]),
            },
            FoldResult {
                roc: None,
                scores: Some(vec![0.3, 0.2]),
            },
        ]];
        let labels = vec![vec![true, true, true], vec![false, false]];

        let summaries = summarize_experiment(&results, &labels, 30).unwrap();

        assert!(summaries[0].fold_aucs.iter().all(|v| v.is_nan()));
        assert!(summaries[0].auc.is_nan());
    }

    #[test]
    fn test_fold_result_json_shape() {
        let json = r#"[[{"roc": {"fpr": [0.0, 1.0], "tpr": [0.0, 1.0]}}, {"scores": [0.2, 0.4]}]]"#;
        let parsed: ExperimentResults = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].len(), 2);
        assert!(parsed[0][0].roc.is_some());
        assert_eq!(parsed[0][1].scores.as_deref(), Some(&[0.2, 0.4][..]));
    }
}
