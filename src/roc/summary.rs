use serde::Serialize;
use tracing::debug;

use super::curve::RocCurve;
use crate::error::{DceError, DceResult};
use crate::utils::numeric::{column_reduce, interp, linspace, mean, std_dev, trapezoid};

/// Cross-validation average of per-fold ROC curves on a fixed FPR grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRoc {
    pub fpr: Vec<f64>,
    pub mean_tpr: Vec<f64>,
    pub std_tpr: Vec<f64>,
    /// AUC of the mean curve.
    pub auc: f64,
    /// Spread of the per-fold AUCs.
    pub auc_std: f64,
    pub fold_aucs: Vec<f64>,
}

/// TPR of `roc` on `grid`, pinned to 0 at the first grid point.
pub fn resample_tpr(roc: &RocCurve, grid: &[f64]) -> DceResult<Vec<f64>> {
    let mut tpr = interp(grid, &roc.fpr, &roc.tpr)?;
    if let Some(first) = tpr.first_mut() {
        *first = 0.0;
    }
    Ok(tpr)
}

pub fn mean_roc(folds: &[RocCurve], n_points: usize) -> DceResult<MeanRoc> {
    if n_points < 2 {
        return Err(DceError::InvalidGrid(n_points));
    }
    if folds.is_empty() {
        return Err(DceError::EmptyInput);
    }

    let grid = linspace(0.0, 1.0, n_points);
    let resampled = folds
        .iter()
        .map(|roc| resample_tpr(roc, &grid))
        .collect::<DceResult<Vec<_>>>()?;

    let fold_aucs: Vec<f64> = resampled.iter().map(|tpr| trapezoid(&grid, tpr)).collect();
    for (i, auc) in fold_aucs.iter().enumerate() {
        debug!(fold = i + 1, auc, "fold AUC");
    }

    let mut mean_tpr = column_reduce(&resampled, "resampled TPR", mean)?;
    let std_tpr = column_reduce(&resampled, "resampled TPR", std_dev)?;
    mean_tpr[n_points - 1] = 1.0;

    let auc = trapezoid(&grid, &mean_tpr);
    let auc_std = std_dev(&fold_aucs);

    Ok(MeanRoc {
        fpr: grid,
        mean_tpr,
        std_tpr,
        auc,
        auc_std,
        fold_aucs,
    })
}
