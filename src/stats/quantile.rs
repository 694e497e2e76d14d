//! Percentiles and adaptive quantile threshold selection.

use serde::Serialize;

/// Candidate (low, high) quantile pairs, tested in order.
pub const QUANTILE_PAIRS: [(f64, f64); 5] = [
    (0.25, 0.75),
    (0.20, 0.80),
    (0.15, 0.85),
    (0.10, 0.90),
    (0.05, 0.95),
];

/// Absorbs binary rounding of tail shares at the edge of the acceptance band.
const BAND_EPSILON: f64 = 1e-9;

/// Quantile with linear interpolation between closest ranks.
///
/// Returns `None` for an empty distribution.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// The thresholds chosen for one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileSelection {
    pub low_q: f64,
    pub high_q: f64,
    pub low: f64,
    pub high: f64,
    /// True when no pair matched and the last pair was used
    pub fell_back: bool,
}

impl QuantileSelection {
    /// Thresholds of one candidate pair, plus the share of values strictly
    /// below `low` and strictly above `high`.
    fn evaluate(values: &[f64], low_q: f64, high_q: f64) -> (Self, f64, f64) {
        let low = quantile(values, low_q).unwrap_or(0.0);
        let high = quantile(values, high_q).unwrap_or(0.0);
        let n = values.len().max(1) as f64;
        let below = values.iter().filter(|&&v| v < low).count() as f64 / n;
        let above = values.iter().filter(|&&v| v > high).count() as f64 / n;
        (
            Self {
                low_q,
                high_q,
                low,
                high,
                fell_back: false,
            },
            below,
            above,
        )
    }
}

/// Pick the first quantile pair whose actual tail shares are within
/// `tolerance` of the theoretical ones; otherwise use the last pair.
pub fn select_adaptive_quantiles(values: &[f64], tolerance: f64) -> QuantileSelection {
    select_from_pairs(values, &QUANTILE_PAIRS, tolerance)
}

pub fn select_from_pairs(
    values: &[f64],
    pairs: &[(f64, f64)],
    tolerance: f64,
) -> QuantileSelection {
    let mut last: Option<QuantileSelection> = None;

    for &(low_q, high_q) in pairs {
        let (selection, below, above) = QuantileSelection::evaluate(values, low_q, high_q);
        let low_ok = (below - low_q).abs() <= tolerance + BAND_EPSILON;
        let high_ok = (above - (1.0 - high_q)).abs() <= tolerance + BAND_EPSILON;
        if low_ok && high_ok {
            return selection;
        }
        last = Some(selection);
    }

    match last {
        Some(selection) => QuantileSelection {
            fell_back: true,
            ..selection
        },
        None => QuantileSelection {
            low_q: 0.0,
            high_q: 1.0,
            low: 0.0,
            high: 0.0,
            fell_back: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert!((quantile(&v, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_first_pair_accepted_on_spread_distribution() {
        // 1..=20: q25 = 5.75 (5 below), q75 = 15.25 (5 above)
        let s = select_adaptive_quantiles(&range(20), 0.05);
        assert_eq!((s.low_q, s.high_q), (0.25, 0.75));
        assert!((s.low - 5.75).abs() < 1e-12);
        assert!((s.high - 15.25).abs() < 1e-12);
        assert!(!s.fell_back);
    }

    /// `t` spread values at each end of a flat plateau of 100 − 2t values.
    fn tails(t: usize) -> Vec<f64> {
        let mut v: Vec<f64> = (0..t).map(|i| i as f64).collect();
        v.extend(std::iter::repeat(50.0).take(100 - 2 * t));
        v.extend((0..t).map(|i| 100.0 + i as f64));
        v
    }

    #[test]
    fn test_full_search_reaches_every_pair() {
        // Inner pairs land on the plateau and see only the t% tails, too far
        // from their targets, until a pair within the band comes up.
        let cases = [
            (range(20), (0.25, 0.75)),
            (tails(17), (0.20, 0.80)),
            (tails(12), (0.15, 0.85)),
            (tails(7), (0.10, 0.90)),
            (tails(4), (0.05, 0.95)),
        ];
        for (values, expected) in cases {
            let s = select_adaptive_quantiles(&values, 0.05);
            assert_eq!((s.low_q, s.high_q), expected);
            assert!(!s.fell_back, "{:?} should be accepted", expected);
        }
        assert_eq!(QUANTILE_PAIRS.len(), 5);
    }

    #[test]
    fn test_fallback_to_last_pair() {
        // Constant distribution: nothing is ever strictly below/above.
        let s = select_adaptive_quantiles(&[3.0; 12], 0.05);
        assert!(s.fell_back);
        assert_eq!((s.low_q, s.high_q), (0.05, 0.95));
        assert_eq!((s.low, s.high), (3.0, 3.0));
    }

    #[test]
    fn test_empty_distribution_falls_back() {
        let s = select_adaptive_quantiles(&[], 0.05);
        assert!(s.fell_back);
    }
}
