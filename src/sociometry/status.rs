//! Sociometric status classification.
//!
//! Impact (`im`) and absolute balance (`|bl|`) are each cut into three
//! bands by an adaptive quantile pair. Status rules then run as an ordered
//! overwrite over every member:
//!
//! 1. seed by the sign of `bl` (so that every member has a status)
//! 2. marginal, popular, appreciated, rejected, disliked, ambitendent,
//!    controversial, each overwriting earlier assignments
//! 3. isolated, applied last so it can never be overwritten
//!
//! Threshold comparisons are strict: a value equal to a threshold falls in
//! the middle band.

use serde::{Deserialize, Serialize};

use crate::stats::{select_adaptive_quantiles, QuantileSelection};

use super::indices::Indices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SociometricStatus {
    Popular,
    Appreciated,
    Controversial,
    Ambitendent,
    Disliked,
    Rejected,
    Marginal,
    Isolated,
}

impl SociometricStatus {
    /// Best to worst. There is no placeholder category between marginal
    /// and isolated.
    pub const DESIRABILITY: [SociometricStatus; 8] = [
        Self::Popular,
        Self::Appreciated,
        Self::Controversial,
        Self::Ambitendent,
        Self::Disliked,
        Self::Rejected,
        Self::Marginal,
        Self::Isolated,
    ];

    /// Position in [`Self::DESIRABILITY`], 1 = most desirable.
    pub fn ordinal(self) -> usize {
        Self::DESIRABILITY
            .iter()
            .position(|&s| s == self)
            .map(|p| p + 1)
            .unwrap_or(Self::DESIRABILITY.len())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Appreciated => "appreciated",
            Self::Controversial => "controversial",
            Self::Ambitendent => "ambitendent",
            Self::Disliked => "disliked",
            Self::Rejected => "rejected",
            Self::Marginal => "marginal",
            Self::Isolated => "isolated",
        }
    }
}

impl std::fmt::Display for SociometricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Median,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
    Neutral,
    PrevalentPositive,
    PrevalentNegative,
    DominantPositive,
    DominantNegative,
}

/// The quantile selections used to band impact and balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusThresholds {
    pub impact: QuantileSelection,
    pub balance: QuantileSelection,
}

impl StatusThresholds {
    pub fn select(indices: &[Indices], tolerance: f64) -> Self {
        let impact: Vec<f64> = indices.iter().map(|i| i.im as f64).collect();
        let balance: Vec<f64> = indices.iter().map(|i| i.bl.abs() as f64).collect();
        Self {
            impact: select_adaptive_quantiles(&impact, tolerance),
            balance: select_adaptive_quantiles(&balance, tolerance),
        }
    }

    pub fn impact_of(&self, im: i64) -> Impact {
        let im = im as f64;
        if im < self.impact.low {
            Impact::Low
        } else if im > self.impact.high {
            Impact::High
        } else {
            Impact::Median
        }
    }

    pub fn balance_of(&self, bl: i64) -> Balance {
        let magnitude = bl.abs() as f64;
        if bl == 0 || magnitude < self.balance.low {
            Balance::Neutral
        } else if magnitude > self.balance.high {
            if bl > 0 {
                Balance::DominantPositive
            } else {
                Balance::DominantNegative
            }
        } else if bl > 0 {
            Balance::PrevalentPositive
        } else {
            Balance::PrevalentNegative
        }
    }
}

/// Apply the status rules to one member.
pub fn classify(indices: &Indices, impact: Impact, balance: Balance) -> SociometricStatus {
    use SociometricStatus::*;

    let seen = matches!(impact, Impact::High | Impact::Median);
    let both_valences = indices.rp * indices.rr > 0;
    let balanced = |wanted: Impact| {
        impact == wanted
            && (indices.bl == 0 || (both_valences && balance == Balance::Neutral))
    };

    let mut status = match indices.bl.signum() {
        1 => Appreciated,
        -1 => Disliked,
        _ => Ambitendent,
    };

    if impact == Impact::Low {
        status = Marginal;
    }
    if balance == Balance::DominantPositive && seen {
        status = Popular;
    }
    if balance == Balance::PrevalentPositive && seen {
        status = Appreciated;
    }
    if balance == Balance::DominantNegative && seen {
        status = Rejected;
    }
    if balance == Balance::PrevalentNegative && seen {
        status = Disliked;
    }
    if balanced(Impact::Median) {
        status = Ambitendent;
    }
    if balanced(Impact::High) {
        status = Controversial;
    }
    if indices.is_isolated() {
        status = Isolated;
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(rp: i64, rr: i64, gp: i64, gr: i64) -> Indices {
        Indices::from_counts(rp, rr, gp, gr, 0, 0)
    }

    fn thresholds(impact: (f64, f64), balance: (f64, f64)) -> StatusThresholds {
        let sel = |(low, high): (f64, f64)| QuantileSelection {
            low_q: 0.25,
            high_q: 0.75,
            low,
            high,
            fell_back: false,
        };
        StatusThresholds {
            impact: sel(impact),
            balance: sel(balance),
        }
    }

    #[test]
    fn test_desirability_list_has_no_placeholder() {
        // The eight statuses are ranked best to worst with no gap between
        // marginal and isolated.
        assert_eq!(SociometricStatus::DESIRABILITY.len(), 8);
        assert_eq!(SociometricStatus::Popular.ordinal(), 1);
        assert_eq!(SociometricStatus::Marginal.ordinal(), 7);
        assert_eq!(SociometricStatus::Isolated.ordinal(), 8);
    }

    #[test]
    fn test_bands_are_strict() {
        let t = thresholds((2.0, 6.0), (1.0, 3.0));
        assert_eq!(t.impact_of(1), Impact::Low);
        assert_eq!(t.impact_of(2), Impact::Median);
        assert_eq!(t.impact_of(6), Impact::Median);
        assert_eq!(t.impact_of(7), Impact::High);

        assert_eq!(t.balance_of(0), Balance::Neutral);
        assert_eq!(t.balance_of(1), Balance::PrevalentPositive);
        assert_eq!(t.balance_of(-3), Balance::PrevalentNegative);
        assert_eq!(t.balance_of(4), Balance::DominantPositive);
        assert_eq!(t.balance_of(-4), Balance::DominantNegative);
    }

    #[test]
    fn test_isolated_wins_over_every_rule() {
        let isolated = idx(0, 0, 0, 0);
        for impact in [Impact::Low, Impact::Median, Impact::High] {
            assert_eq!(
                classify(&isolated, impact, Balance::Neutral),
                SociometricStatus::Isolated
            );
        }
    }

    #[test]
    fn test_rule_order() {
        use SociometricStatus::*;
        let cases = [
            // Low impact only reaches marginal.
            (idx(1, 0, 1, 0), Impact::Low, Balance::DominantPositive, Marginal),
            (idx(5, 0, 1, 0), Impact::High, Balance::DominantPositive, Popular),
            (idx(3, 1, 1, 0), Impact::Median, Balance::PrevalentPositive, Appreciated),
            (idx(0, 5, 1, 0), Impact::High, Balance::DominantNegative, Rejected),
            (idx(1, 3, 1, 0), Impact::Median, Balance::PrevalentNegative, Disliked),
            (idx(2, 2, 1, 1), Impact::Median, Balance::Neutral, Ambitendent),
            (idx(4, 4, 1, 1), Impact::High, Balance::Neutral, Controversial),
            // Small non-zero balance on both valences still counts as balanced.
            (idx(5, 4, 1, 1), Impact::High, Balance::Neutral, Controversial),
        ];
        for (indices, impact, balance, expected) in cases {
            assert_eq!(classify(&indices, impact, balance), expected, "{:?}", indices);
        }
    }

    #[test]
    fn test_unmatched_member_keeps_sign_seed() {
        use SociometricStatus::*;
        // Neutral balance, positive-only nominations: no rule matches.
        assert_eq!(classify(&idx(1, 0, 0, 0), Impact::Median, Balance::Neutral), Appreciated);
        assert_eq!(classify(&idx(0, 1, 0, 0), Impact::High, Balance::Neutral), Disliked);
    }
}
