use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::aif::{fit_population, AifFit, DceMetadata, RelaxationParams};
use crate::config::{render_template, AifConfig, RocConfig};
use crate::io::input::{list_patients, read_experiment_results};
use crate::io::output::{write_fit, write_roc_summary_csv};
use crate::io::{load_patient_aif, load_patient_labels};
use crate::roc::plot::plot_mean_rocs;
use crate::roc::{summarize_experiment, MeanRoc};

/// Population AIF and its fitted model for every patient under the data
/// root.
pub fn run_aif_pipeline(config: &AifConfig) -> Result<AifFit> {
    let patients = list_patients(&config.data_root)?;
    info!(count = patients.len(), root = %config.data_root.display(), "found patients");

    // per-patient loading is independent, results keep patient order
    let loaded = patients
        .par_iter()
        .map(|id| {
            info!(patient = %id, "processing");
            load_patient_aif(
                &config.data_root.join(id),
                &config.dce_dir,
                &config.shift,
                &config.estimator,
            )
            .with_context(|| format!("patient '{}' failed", id))
        })
        .collect::<Result<Vec<_>>>()?;

    let metadata = acquisition_metadata(&patients, loaded.iter().map(|(_, m)| *m))?;
    let relaxation = RelaxationParams {
        flip_angle: metadata.flip_angle,
        tr: metadata.tr,
        t10: config.t10,
        r1: config.r1,
    };

    let aifs: BTreeMap<String, _> = patients
        .into_iter()
        .zip(loaded.into_iter().map(|(aif, _)| aif))
        .collect();

    let fit = fit_population(&aifs, &relaxation, config.start_enh, &config.fit_options())
        .context("population AIF fit failed")?;

    if let Some(output) = &config.output {
        write_fit(output, &fit)?;
        info!(path = %output.display(), "fit written");
    }

    Ok(fit)
}

/// Acquisition settings of the last patient; patients that disagree are
/// reported.
fn acquisition_metadata(
    patients: &[String],
    metadata: impl Iterator<Item = DceMetadata>,
) -> Result<DceMetadata> {
    let all: Vec<DceMetadata> = metadata.collect();
    let Some(chosen) = all.last().copied() else {
        bail!("no DCE metadata available");
    };
    for (id, m) in patients.iter().zip(&all) {
        if *m != chosen {
            warn!(
                patient = %id,
                flip_angle = m.flip_angle,
                tr = m.tr,
                "acquisition metadata differs from the last patient"
            );
        }
    }
    Ok(chosen)
}

/// Mean ROC curves of every experiment for one classifier configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RocComparison {
    pub index: usize,
    pub configuration: String,
    pub methods: Vec<(String, MeanRoc)>,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

pub fn run_roc_pipeline(config: &RocConfig) -> Result<Vec<RocComparison>> {
    if config.results.is_empty() {
        bail!("no result files configured");
    }

    let patients = list_patients(&config.data_root)?;
    info!(count = patients.len(), "reading ground truth");

    // fold i holds out patient i
    let fold_labels = patients
        .par_iter()
        .map(|id| {
            load_patient_labels(
                &config.data_root.join(id),
                &config.gt_dirs,
                &config.gt_labels,
                &config.roi_label,
                &config.target_label,
                config.positive_class,
            )
            .with_context(|| format!("ground truth of patient '{}' failed", id))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut per_method: Vec<Vec<MeanRoc>> = Vec::with_capacity(config.results.len());
    for source in &config.results {
        info!(path = %source.path.display(), "loading results");
        let results = read_experiment_results(&source.path)?;
        let summaries = summarize_experiment(&results, &fold_labels, config.n_points)
            .with_context(|| format!("evaluating {}", source.path.display()))?;
        per_method.push(summaries);
    }

    let n_configs = per_method[0].len();
    if let Some(bad) = per_method.iter().position(|s| s.len() != n_configs) {
        bail!(
            "{} has {} configurations, expected {}",
            config.results[bad].path.display(),
            per_method[bad].len(),
            n_configs
        );
    }

    let mut comparisons = Vec::with_capacity(n_configs);
    for j in 0..n_configs {
        let configuration = config
            .configurations
            .get(j)
            .cloned()
            .unwrap_or_else(|| format!("configuration-{}", j));
        info!(configuration = %configuration, "comparing experiments");

        let methods: Vec<(String, MeanRoc)> = config
            .results
            .iter()
            .zip(&per_method)
            .map(|(source, summaries)| (source.label.clone(), summaries[j].clone()))
            .collect();
        let curves: Vec<(String, &MeanRoc)> =
            methods.iter().map(|(label, s)| (label.clone(), s)).collect();

        let summary_path = render_template(&config.summary_template, j);
        write_roc_summary_csv(&summary_path, &curves)?;

        let plot_path = if config.plot {
            let path = render_template(&config.plot_template, j);
            plot_mean_rocs(&path, &curves)?;
            info!(path = %path.display(), "ROC plot written");
            Some(path)
        } else {
            None
        };

        comparisons.push(RocComparison {
            index: j,
            configuration,
            methods,
            summary_path,
            plot_path,
        });
    }

    Ok(comparisons)
}

#[cfg(test)]
mod entry_tests {
    use super::*;

    #[test]
    fn test_last_patient_metadata_wins() {
        let patients = vec!["a".to_string(), "b".to_string()];
        let metadata = vec![
            DceMetadata {
                flip_angle: 10.0,
                tr: 0.005,
            },
            DceMetadata {
                flip_angle: 12.0,
                tr: 0.004,
            },
        ];
        let chosen = acquisition_metadata(&patients, metadata.into_iter()).unwrap();
        assert_eq!(chosen.flip_angle, 12.0);
        assert!(acquisition_metadata(&[], std::iter::empty()).is_err());
    }
}
