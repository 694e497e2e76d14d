//! Summary statistics for numeric columns.
//!
//! Conventions follow the usual data-frame summaries: sample standard
//! deviation (`n − 1`), bias-corrected skewness and excess kurtosis, median
//! as the linearly interpolated 0.5 quantile.
//!
//! Small samples never produce NaN. Measures whose estimator is undefined
//! for the sample size report `0.0`: std below 2 values, skew below 3,
//! kurtosis below 4, and cv / Gini when the mean (or shifted sum) is zero.

use serde::Serialize;
use std::collections::BTreeMap;

use super::quantile::quantile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean: f64,
    pub std: f64,
    /// Coefficient of variation (std / mean)
    pub cv: f64,
    pub gini: f64,
    pub skew: f64,
    pub kurtosis: f64,
}

/// Summarize one column.
pub fn describe(values: &[f64]) -> DescriptiveStats {
    let count = values.len();
    if count == 0 {
        return DescriptiveStats::default();
    }

    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let median = quantile(values, 0.5).unwrap_or(mean);

    let central = |p: i32| values.iter().map(|v| (v - mean).powi(p)).sum::<f64>() / n;
    let m2 = central(2);

    let std = if count < 2 {
        0.0
    } else {
        (m2 * n / (n - 1.0)).sqrt()
    };
    let cv = if mean == 0.0 { 0.0 } else { std / mean };

    let skew = if count < 3 || m2 == 0.0 {
        0.0
    } else {
        let g1 = central(3) / m2.powf(1.5);
        g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
    };

    let kurtosis = if count < 4 || m2 == 0.0 {
        0.0
    } else {
        let g2 = central(4) / (m2 * m2) - 3.0;
        ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
    };

    DescriptiveStats {
        count,
        min,
        max,
        median,
        mean,
        std,
        cv,
        gini: gini(values),
        skew,
        kurtosis,
    }
}

/// Gini coefficient after shifting the values to start at zero.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut shifted: Vec<f64> = values.iter().map(|v| v - min).collect();
    shifted.sort_by(f64::total_cmp);

    let total: f64 = shifted.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let weighted: f64 = shifted
        .iter()
        .enumerate()
        .map(|(i, x)| (i + 1) as f64 * x)
        .sum();
    let n = n as f64;
    2.0 * weighted / (n * total) - (n + 1.0) / n
}

pub struct DescriptiveStatsEngine;

impl DescriptiveStatsEngine {
    /// Summarize every named column.
    pub fn describe_columns<'a, I>(columns: I) -> BTreeMap<String, DescriptiveStats>
    where
        I: IntoIterator<Item = (&'a str, Vec<f64>)>,
    {
        columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), describe(&values)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_uniform_distribution_gini_is_exactly_zero() {
        assert_eq!(gini(&[4.0; 7]), 0.0);
        assert_eq!(describe(&[0.25; 3]).gini, 0.0);
    }

    #[test]
    fn test_gini_maximal_inequality() {
        // One holder out of n: (n - 1) / n
        let g = gini(&[0.0, 0.0, 0.0, 8.0]);
        assert!(close(g, 0.75), "got {}", g);
    }

    #[test]
    fn test_gini_shifts_negative_values() {
        assert!(close(gini(&[-1.0, 1.0]), gini(&[0.0, 2.0])));
    }

    #[test]
    fn test_describe_basic_moments() {
        let s = describe(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert_eq!((s.min, s.max), (1.0, 4.0));
        assert!(close(s.median, 2.5));
        assert!(close(s.mean, 2.5));
        // Sample variance 5/3
        assert!(close(s.std, (5.0f64 / 3.0).sqrt()));
        assert!(close(s.cv, s.std / 2.5));
        assert!(close(s.skew, 0.0));
        assert!(close(s.kurtosis, -1.2));
    }

    #[test]
    fn test_skew_sign_follows_tail() {
        let right = describe(&[1.0, 1.0, 1.0, 2.0, 10.0]);
        assert!(right.skew > 0.0);
        let left = describe(&[-10.0, -2.0, -1.0, -1.0, -1.0]);
        assert!(close(left.skew, -right.skew));
    }

    #[test]
    fn test_small_samples_report_zero() {
        let one = describe(&[5.0]);
        assert_eq!((one.std, one.skew, one.kurtosis), (0.0, 0.0, 0.0));
        let empty = describe(&[]);
        assert_eq!(empty, DescriptiveStats::default());
        let centered = describe(&[-1.0, 1.0]);
        assert_eq!(centered.cv, 0.0);
    }

    #[test]
    fn test_describe_columns_keyed_by_name() {
        let table = DescriptiveStatsEngine::describe_columns([
            ("katz", vec![0.1, 0.2]),
            ("hub", vec![1.0]),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table["hub"].count, 1);
    }
}
