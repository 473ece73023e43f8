use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Method selection
// ---------------------------------------------------------------------------

/// Default cut-off used by the catalog pipeline.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// The caller named a detection method that does not exist.  No partial
/// result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid outlier method '{0}': choose 'zscore' or 'iqr'")]
pub struct InvalidMethod(pub String);

/// Outlier detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierMethod {
    /// Standard deviations from the column mean (population std).
    ZScore,
    /// Tukey-style interquartile-range fences.
    Iqr,
}

impl FromStr for OutlierMethod {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, InvalidMethod> {
        match s {
            "zscore" => Ok(OutlierMethod::ZScore),
            "iqr" => Ok(OutlierMethod::Iqr),
            other => Err(InvalidMethod(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Flag outliers in a numeric column.
///
/// Returns one flag per value, index-aligned with the input:
/// * `"zscore"` – `|x − mean| / std` exceeds `threshold`
/// * `"iqr"`    – outside `[Q1 − threshold·IQR, Q3 + threshold·IQR]`
///
/// A degenerate column (zero spread) flags nothing.
pub fn detect_outliers(
    column: &[f64],
    method: &str,
    threshold: f64,
) -> Result<Vec<bool>, InvalidMethod> {
    match method.parse::<OutlierMethod>()? {
        OutlierMethod::ZScore => Ok(zscore_flags(column, threshold)),
        OutlierMethod::Iqr => Ok(iqr_flags(column, threshold)),
    }
}

fn zscore_flags(column: &[f64], threshold: f64) -> Vec<bool> {
    let std = std_dev(column);
    if !(std > 0.0) {
        // Zero or non-finite spread: no value stands out.
        return vec![false; column.len()];
    }
    let mean = mean(column);
    column
        .iter()
        .map(|&x| ((x - mean) / std).abs() > threshold)
        .collect()
}

fn iqr_flags(column: &[f64], threshold: f64) -> Vec<bool> {
    let (Some(q1), Some(q3)) = (quantile(column, 0.25), quantile(column, 0.75)) else {
        return Vec::new();
    };
    let iqr = q3 - q1;
    let lo = q1 - threshold * iqr;
    let hi = q3 + threshold * iqr;
    column.iter().map(|&x| x < lo || x > hi).collect()
}

// ---------------------------------------------------------------------------
// Column statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean.  0.0 for an empty column.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (the whole column is the population).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Quantile with linear interpolation between closest ranks, the same
/// convention Pandas uses.  `None` on an empty column.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_method_is_an_invalid_argument() {
        let err = detect_outliers(&[1.0, 2.0], "median", 3.0).unwrap_err();
        assert_eq!(err, InvalidMethod("median".to_string()));
    }

    #[test]
    fn zscore_flags_a_planted_extreme() {
        // Eleven identical values and one far away: the extreme sits at
        // |z| = sqrt(11) ≈ 3.32 over the population std.
        let mut column = vec![10.0; 11];
        column.push(1_000.0);

        let flags = detect_outliers(&column, "zscore", 3.0).unwrap();
        assert_eq!(flags.len(), column.len());
        assert!(flags[11]);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
    }

    #[test]
    fn zscore_on_constant_column_flags_nothing() {
        let flags = detect_outliers(&[4.5; 20], "zscore", 3.0).unwrap();
        assert!(flags.iter().all(|&f| !f));
    }

    #[test]
    fn iqr_fences_use_interpolated_quartiles() {
        // 1..=10 plus 100: Q1 = 3.5, Q3 = 8.5, IQR = 5.  With threshold 1.5
        // the upper fence is 16.0, so only 100 is flagged.
        let mut column: Vec<f64> = (1..=10).map(f64::from).collect();
        column.push(100.0);

        let flags = detect_outliers(&column, "iqr", 1.5).unwrap();
        assert!(flags[10]);
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.75), Some(3.25));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));

        // Input order does not matter.
        assert_eq!(quantile(&[4.0, 1.0, 3.0, 2.0], 0.75), Some(3.25));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn population_std_matches_hand_computation() {
        // Values 2, 4, 4, 4, 5, 5, 7, 9: mean 5, population variance 4.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(std_dev(&values), 2.0);
    }
}
