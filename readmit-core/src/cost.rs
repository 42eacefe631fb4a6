//! Cost-exposure model
//!
//! Maps a risk score to a modeled dollar range of avoidable readmission cost
//! using fixed benchmark constants. Strictly proportional: `score/100` times
//! each base.
//!
//! Global invariants enforced:
//! - Monotonic non-decreasing in the risk score
//! - `low <= mid <= high` whenever the bases are ordered
//! - Deterministic, allocation-free per-record computation

use crate::record::RiskRecord;
use serde::{Deserialize, Serialize};

/// Benchmark cost bases in dollars: the range of a full-certainty (score
/// 100) readmission. Industry benchmarks put one avoidable readmission at
/// $10K-$25K, with $15K as the commonly cited midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CostBases {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl Default for CostBases {
    fn default() -> Self {
        CostBases {
            low: 10_000.0,
            mid: 15_000.0,
            high: 25_000.0,
        }
    }
}

/// Modeled cost range for one record or a whole cohort. Derived, never
/// stored: recomputed on demand from risk scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CostRange {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Clamp a risk score into [0, 100].
///
/// Scores arrive pre-clamped from the upstream pipeline; anything outside
/// the range is a caller bug, so development builds fail loudly while
/// release builds clamp defensively (display-only logic, no safety
/// implication). Non-finite input clamps to 0.
pub fn clamp_score(score: f64) -> f64 {
    debug_assert!(
        (0.0..=100.0).contains(&score),
        "risk score out of range: {score}"
    );
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Cost range for a single risk score.
///
/// `cost_range(0.0, ..)` is exactly zero; `cost_range(100.0, ..)` returns
/// the bases themselves.
pub fn cost_range(risk_score: f64, bases: &CostBases) -> CostRange {
    let factor = clamp_score(risk_score) / 100.0;
    CostRange {
        low: factor * bases.low,
        mid: factor * bases.mid,
        high: factor * bases.high,
    }
}

/// Element-wise sum of per-record cost ranges over a cohort.
///
/// Exactly equal to summing `cost_range` per record; no shortcut through an
/// average score.
pub fn total_cost_range(records: &[RiskRecord], bases: &CostBases) -> CostRange {
    records.iter().fold(CostRange::default(), |acc, record| {
        let range = cost_range(record.risk_score, bases);
        CostRange {
            low: acc.low + range.low,
            mid: acc.mid + range.mid,
            high: acc.high + range.high,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, score: f64) -> RiskRecord {
        RiskRecord {
            patient_id: id,
            hadm_id: None,
            age: 60,
            risk_score: score,
            readmitted_30day: None,
            uci: None,
            mimic: None,
        }
    }

    #[test]
    fn test_zero_score_yields_zero_range() {
        let range = cost_range(0.0, &CostBases::default());
        assert_eq!(range, CostRange::default());
    }

    #[test]
    fn test_full_score_yields_bases() {
        let range = cost_range(100.0, &CostBases::default());
        assert_eq!(range.low, 10_000.0);
        assert_eq!(range.mid, 15_000.0);
        assert_eq!(range.high, 25_000.0);
    }

    #[test]
    fn test_components_ordered_across_range() {
        let bases = CostBases::default();
        for tenths in 0..=1000 {
            let score = f64::from(tenths) / 10.0;
            let range = cost_range(score, &bases);
            assert!(
                range.low <= range.mid && range.mid <= range.high,
                "unordered range at score {score}: {range:?}"
            );
        }
    }

    #[test]
    fn test_monotonic_in_score() {
        let bases = CostBases::default();
        let mut previous = cost_range(0.0, &bases);
        for step in 1..=100 {
            let current = cost_range(f64::from(step), &bases);
            assert!(current.low >= previous.low);
            assert!(current.mid >= previous.mid);
            assert!(current.high >= previous.high);
            previous = current;
        }
    }

    #[test]
    fn test_total_equals_element_wise_sum() {
        // Scores 40 and 80 against the default bases.
        let records = vec![record(1, 40.0), record(2, 80.0)];
        let total = total_cost_range(&records, &CostBases::default());
        assert_eq!(total.low, 12_000.0);
        assert_eq!(total.mid, 18_000.0);
        assert_eq!(total.high, 30_000.0);
    }

    #[test]
    fn test_empty_cohort_is_zero() {
        let total = total_cost_range(&[], &CostBases::default());
        assert_eq!(total, CostRange::default());
    }

    #[test]
    fn test_custom_bases() {
        let bases = CostBases {
            low: 1_000.0,
            mid: 2_000.0,
            high: 4_000.0,
        };
        let range = cost_range(50.0, &bases);
        assert_eq!(range.low, 500.0);
        assert_eq!(range.mid, 1_000.0);
        assert_eq!(range.high, 2_000.0);
    }
}
