use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::aif::{Estimator, FitOptions};

/// Offsets removed from each DCE timepoint by the intensity normalization;
/// added back before extracting the AIF.
pub const DEFAULT_SHIFT: [f64; 40] = [
    233.33757962, 239.33121019, 242.32802548, 243.32696391, 247.32271762, 296.5, 376.66851169,
    443.50369004, 468.44218942, 476.42250923, 487.39544895, 501.36100861, 510.33886839,
    517.32164822, 522.30934809, 533.28228782, 539.26752768, 539.26752768, 539.26752768,
    540.26506765, 550.2404674, 557.22324723, 557.22324723, 556.22570726, 556.22570726,
    555.22816728, 556.99363057, 556.99363057, 556.99363057, 556.99363057, 556.99363057,
    556.99363057, 556.99363057, 556.99363057, 556.99363057, 557.992569, 558.99150743,
    558.99150743, 557.992569, 556.99363057,
];

const DEFAULT_DATA_ROOT: &str = "/data/prostate/experiments";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aif: AifConfig,
    pub roc: RocConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AifConfig {
    /// Directory whose subdirectories are patient ids.
    pub data_root: PathBuf,
    /// DCE series directory inside each patient directory.
    pub dce_dir: String,
    pub shift: Vec<f64>,
    pub estimator: Estimator,
    pub t10: f64,
    pub r1: f64,
    /// Number of pre-contrast samples used for the baseline.
    pub start_enh: usize,
    /// Solver setup; defaults to the literature guess with the delay set
    /// to `start_enh`.
    pub fit: Option<FitOptions>,
    /// Where to write the fitted model as JSON (CSV when the extension is
    /// `.csv`).
    pub output: Option<PathBuf>,
}

impl AifConfig {
    pub fn fit_options(&self) -> FitOptions {
        self.fit
            .clone()
            .unwrap_or_else(|| FitOptions::with_baseline(self.start_enh))
    }
}

impl Default for AifConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            dce_dir: "DCE_reg_bspline".to_string(),
            shift: DEFAULT_SHIFT.to_vec(),
            estimator: Estimator::Median,
            t10: 1.6,
            r1: 3.5,
            start_enh: 3,
            fit: None,
            output: None,
        }
    }
}

/// One pre-computed experiment to compare, with its legend prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSource {
    pub path: PathBuf,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocConfig {
    pub data_root: PathBuf,
    /// Ground-truth directories inside each patient directory, paired with
    /// `gt_labels`.
    pub gt_dirs: Vec<String>,
    pub gt_labels: Vec<String>,
    /// Label whose non-zero voxels form the region of interest.
    pub roi_label: String,
    /// Label that is binarized into the test labels.
    pub target_label: String,
    pub positive_class: f64,
    pub results: Vec<ResultSource>,
    /// Names of the classifier configurations, in result-file order.
    pub configurations: Vec<String>,
    pub n_points: usize,
    /// Render the SVG comparison plots.
    pub plot: bool,
    /// `{}` is replaced by the configuration index.
    pub plot_template: String,
    pub summary_template: String,
}

impl Default for RocConfig {
    fn default() -> Self {
        let results_root = Path::new("/data/prostate/results/lemaitre-2016-nov");
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            gt_dirs: ["GT_inv/prostate", "GT_inv/pz", "GT_inv/cg", "GT_inv/cap"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            gt_labels: ["prostate", "pz", "cg", "cap"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            roi_label: "prostate".to_string(),
            target_label: "cap".to_string(),
            positive_class: 255.0,
            results: vec![
                ResultSource {
                    path: results_root.join("no-balancing/results_normalized_ese.json"),
                    label: "Normalized data ".to_string(),
                },
                ResultSource {
                    path: results_root
                        .join("unormalised-no-balancing/results_unormalized_ese.json"),
                    label: "Unnormalized data ".to_string(),
                },
            ],
            configurations: vec!["random-forest".to_string()],
            n_points: 30,
            plot: true,
            plot_template: "results/full_signal_{}.svg".to_string(),
            summary_template: "results/full_signal_{}.csv".to_string(),
        }
    }
}

pub fn render_template(template: &str, index: usize) -> PathBuf {
    PathBuf::from(template.replacen("{}", &index.to_string(), 1))
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
