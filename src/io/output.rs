use anyhow::{bail, Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::aif::model::PARAM_NAMES;
use crate::aif::{AifFit, AifParams};
use crate::roc::MeanRoc;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Full pipeline result as pretty JSON.
pub fn write_fit_json(path: &Path, fit: &AifFit) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), fit)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Parameter vector as a two-row CSV: names, then values.
pub fn write_params_csv(path: &Path, params: &AifParams) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(PARAM_NAMES)?;
    wtr.write_record(params.to_array().iter().map(|v| v.to_string()))?;
    wtr.flush()?;
    Ok(())
}

/// Writes the fit next to its format: CSV for `.csv`, JSON otherwise.
pub fn write_fit(path: &Path, fit: &AifFit) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_params_csv(path, &fit.fit.params),
        _ => write_fit_json(path, fit),
    }
}

/// One row per FPR grid point, with mean and std TPR columns per method,
/// followed by per-method AUC rows.
pub fn write_roc_summary_csv(path: &Path, curves: &[(String, &MeanRoc)]) -> Result<()> {
    let Some((_, first)) = curves.first() else {
        bail!("no ROC curves to write to {}", path.display());
    };
    ensure_parent(path)?;
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["fpr".to_string()];
    for (label, _) in curves {
        let label = label.trim();
        header.push(format!("{} mean_tpr", label));
        header.push(format!("{} std_tpr", label));
    }
    wtr.write_record(&header)?;

    for (i, fpr) in first.fpr.iter().enumerate() {
        let mut record = vec![fpr.to_string()];
        for (_, summary) in curves {
            record.push(summary.mean_tpr[i].to_string());
            record.push(summary.std_tpr[i].to_string());
        }
        wtr.write_record(&record)?;
    }

    for (label, summary) in curves {
        let mut record = vec![format!("auc {}", label.trim())];
        record.push(summary.auc.to_string());
        record.push(summary.auc_std.to_string());
        record.resize(header.len(), String::new());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
