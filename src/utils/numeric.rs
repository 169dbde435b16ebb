//! Small 1-D numeric helpers shared by the AIF and ROC pipelines.

use crate::error::{DceError, DceResult};

/// Piecewise-linear interpolation of `(xp, fp)` at every point of `x`.
///
/// `xp` must be non-decreasing. Queries left of `xp[0]` return `fp[0]`,
/// queries right of the last sample return the last value. For repeated
/// abscissae the right-most sample wins, which keeps step-shaped ROC
/// curves on their upper branch.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> DceResult<Vec<f64>> {
    if xp.len() != fp.len() {
        return Err(DceError::ShapeMismatch {
            what: "interpolation samples".to_string(),
            expected: xp.len(),
            found: fp.len(),
        });
    }
    if xp.is_empty() {
        return Err(DceError::EmptyInput);
    }

    let last = xp.len() - 1;
    let values = x
        .iter()
        .map(|&q| {
            if q < xp[0] {
                return fp[0];
            }
            if q >= xp[last] {
                return fp[last];
            }
            // NaN in the query or the abscissae leaves no bracketing pair
            match xp.partition_point(|&v| v <= q).checked_sub(1) {
                Some(j) if j < last => {
                    let slope = (fp[j + 1] - fp[j]) / (xp[j + 1] - xp[j]);
                    fp[j] + slope * (q - xp[j])
                }
                _ => f64::NAN,
            }
        })
        .collect();

    Ok(values)
}

/// `n` evenly spaced samples over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = stop;
            out
        }
    }
}

/// Median of a slice; the mean of the two middle values for even lengths.
/// NaN for an empty slice or one containing NaN.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Trapezoidal integral of `y` over `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) * 0.5)
        .sum()
}

/// Checks that all rows share one length and returns it.
pub fn common_length<T: AsRef<[f64]>>(rows: &[T], what: &str) -> DceResult<usize> {
    let first = rows.first().ok_or(DceError::EmptyInput)?.as_ref().len();
    for row in rows.iter().skip(1) {
        let len = row.as_ref().len();
        if len != first {
            return Err(DceError::ShapeMismatch {
                what: what.to_string(),
                expected: first,
                found: len,
            });
        }
    }
    Ok(first)
}

/// Applies `reduce` down each column of equal-length rows.
pub fn column_reduce<T, F>(rows: &[T], what: &str, reduce: F) -> DceResult<Vec<f64>>
where
    T: AsRef<[f64]>,
    F: Fn(&[f64]) -> f64,
{
    let n = common_length(rows, what)?;
    let mut column = Vec::with_capacity(rows.len());
    let out = (0..n)
        .map(|i| {
            column.clear();
            column.extend(rows.iter().map(|r| r.as_ref()[i]));
            reduce(&column)
        })
        .collect();
    Ok(out)
}
