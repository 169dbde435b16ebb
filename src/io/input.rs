use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::aif::{DceMetadata, DceSeries};
use crate::roc::ExperimentResults;

pub const SERIES_FILE: &str = "series.csv";
pub const METADATA_FILE: &str = "metadata.json";
pub const LABELS_FILE: &str = "labels.csv";

/// Tab when the first line has more tabs than commas, comma otherwise.
fn detect_delimiter<P: AsRef<Path>>(path: P) -> Result<u8> {
    let file = File::open(&path).with_context(|| {
        format!(
            "failed to open file for delimiter sniffing: {:?}",
            path.as_ref()
        )
    })?;
    let mut reader = BufReader::new(file);
    let mut first_line = String::new();
    reader
        .read_line(&mut first_line)
        .with_context(|| "failed to read first line for delimiter detection")?;

    let tabs = first_line.matches('\t').count();
    let commas = first_line.matches(',').count();

    if tabs > commas {
        Ok(b'\t')
    } else {
        Ok(b',')
    }
}

fn parse_row(record: &StringRecord, path: &Path, line: usize) -> Result<Vec<f64>> {
    record
        .iter()
        .filter(|field| !field.is_empty())
        .map(|field| {
            field.parse::<f64>().with_context(|| {
                format!("invalid number '{}' in {} line {}", field, path.display(), line)
            })
        })
        .collect()
}

fn read_rows(path: &Path, has_headers: bool) -> Result<Vec<Vec<f64>>> {
    let delimiter = detect_delimiter(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed row in {}", path.display()))?;
        let line = i + 1 + usize::from(has_headers);
        let row = parse_row(&record, path, line)?;
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Sorted names of the patient directories under `root`.
pub fn list_patients(root: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("failed to list patient directory {}", root.display()))?;

    let mut patients = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            patients.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    patients.sort();

    if patients.is_empty() {
        bail!("no patient directories found in {}", root.display());
    }
    Ok(patients)
}

/// Reads `series.csv` (header, then `time, voxel...` per timepoint) and
/// `metadata.json` from a DCE series directory.
pub fn read_dce_series(dir: &Path) -> Result<DceSeries> {
    let series_path = dir.join(SERIES_FILE);
    let rows = read_rows(&series_path, true)?;
    if rows.is_empty() {
        bail!("DCE series {} has no timepoints", series_path.display());
    }

    let n_voxels = rows[0].len().saturating_sub(1);
    if n_voxels == 0 {
        bail!("DCE series {} has no voxel columns", series_path.display());
    }

    let mut time = Vec::with_capacity(rows.len());
    let mut frames = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != n_voxels + 1 {
            bail!(
                "timepoint {} of {} has {} voxels, expected {}",
                i,
                series_path.display(),
                row.len().saturating_sub(1),
                n_voxels
            );
        }
        time.push(row[0]);
        frames.push(row[1..].to_vec());
    }

    let metadata = read_metadata(&dir.join(METADATA_FILE))?;

    Ok(DceSeries {
        time,
        frames,
        metadata,
    })
}

pub fn read_metadata(path: &Path) -> Result<DceMetadata> {
    let file = File::open(path)
        .with_context(|| format!("failed to open DCE metadata {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse DCE metadata {}", path.display()))
}

/// Flattened label volume: every value of `labels.csv` in row-major order.
pub fn read_label_volume(dir: &Path) -> Result<Vec<f64>> {
    let path = dir.join(LABELS_FILE);
    let rows = read_rows(&path, false)?;
    Ok(rows.into_iter().flatten().collect())
}

/// Loads every ground-truth volume of one patient, keyed by label name.
pub fn read_ground_truth(
    patient_dir: &Path,
    gt_dirs: &[String],
    gt_labels: &[String],
) -> Result<HashMap<String, Vec<f64>>> {
    if gt_dirs.len() != gt_labels.len() {
        bail!(
            "{} ground-truth directories but {} labels",
            gt_dirs.len(),
            gt_labels.len()
        );
    }

    let mut volumes = HashMap::new();
    let mut expected_len = None;
    for (dir, label) in gt_dirs.iter().zip(gt_labels) {
        let volume = read_label_volume(&patient_dir.join(dir))
            .with_context(|| format!("failed to read ground truth '{}'", label))?;
        match expected_len {
            None => expected_len = Some(volume.len()),
            Some(n) if n != volume.len() => {
                return Err(anyhow!(
                    "ground truth '{}' has {} voxels, expected {}",
                    label,
                    volume.len(),
                    n
                ))
            }
            Some(_) => {}
        }
        volumes.insert(label.clone(), volume);
    }
    Ok(volumes)
}

pub fn read_experiment_results(path: &Path) -> Result<ExperimentResults> {
    let file = File::open(path)
        .with_context(|| format!("failed to open result file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse result file {}", path.display()))
}
