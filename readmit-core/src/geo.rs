//! Geographic and hospital benchmark data
//!
//! State-level readmission rates with CMS penalty estimates, plus
//! per-hospital metrics. Everything here is derived display data: the
//! national rollup is a strict reduce over the state rows and an empty
//! input yields a defined zero result.

use crate::aggregate::SummaryAggregate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One state row from the geographic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StateData {
    /// Two-letter postal code.
    pub state: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub hospital_count: u64,
    /// Mean 30-day readmission rate across the state's hospitals, percent.
    pub avg_readmission_rate: f64,
    /// Mean CMS readmission penalty, percent of Medicare payments.
    pub avg_penalty_pct: f64,
    /// Estimated total penalty dollars across the state's hospitals.
    pub total_penalty_estimate: f64,
}

/// One facility row from the hospital metrics file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Hospital {
    pub name: String,
    pub state: String,
    pub city: String,
    pub readmission_rate: f64,
    pub penalty_pct: f64,
}

/// The two benchmark files, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Geography {
    pub states: Vec<StateData>,
    pub hospitals: Vec<Hospital>,
}

/// National rollup over the state rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NationalSummary {
    pub state_count: u64,
    pub total_hospitals: u64,
    /// Unweighted mean of the per-state rates; 0 when no states loaded.
    pub avg_readmission_rate: f64,
    pub total_penalty_estimate: f64,
}

pub fn national_summary(states: &[StateData]) -> NationalSummary {
    let avg_readmission_rate = if states.is_empty() {
        0.0
    } else {
        states.iter().map(|s| s.avg_readmission_rate).sum::<f64>() / states.len() as f64
    };
    NationalSummary {
        state_count: states.len() as u64,
        total_hospitals: states.iter().map(|s| s.hospital_count).sum(),
        avg_readmission_rate,
        total_penalty_estimate: states.iter().map(|s| s.total_penalty_estimate).sum(),
    }
}

/// Sort key for the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSort {
    #[default]
    Rate,
    Penalty,
}

/// States sorted descending by the chosen key, postal code as tie-break.
pub fn sorted_states(states: &[StateData], sort: StateSort) -> Vec<&StateData> {
    let mut rows: Vec<&StateData> = states.iter().collect();
    rows.sort_by(|a, b| {
        let ordering = match sort {
            StateSort::Rate => b
                .avg_readmission_rate
                .partial_cmp(&a.avg_readmission_rate),
            StateSort::Penalty => b
                .total_penalty_estimate
                .partial_cmp(&a.total_penalty_estimate),
        };
        ordering
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.state.cmp(&b.state))
    });
    rows
}

/// The worst-performing facilities: readmission rate descending, then
/// state/city/name for a total order.
pub fn top_hospitals(hospitals: &[Hospital], count: usize) -> Vec<&Hospital> {
    let mut rows: Vec<&Hospital> = hospitals.iter().collect();
    rows.sort_by(|a, b| {
        b.readmission_rate
            .partial_cmp(&a.readmission_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.state.cmp(&b.state))
            .then_with(|| a.city.cmp(&b.city))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows.truncate(count);
    rows
}

/// Relative heat of one state's rate within the loaded range, in five
/// steps. None when the rate is unusable or the range is degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatLevel {
    Minimal,
    Low,
    Moderate,
    Elevated,
    Severe,
}

impl HeatLevel {
    pub fn of(rate: f64, min_rate: f64, max_rate: f64) -> Option<HeatLevel> {
        if !rate.is_finite() || rate <= 0.0 || max_rate <= min_rate {
            return None;
        }
        let normalized = (rate - min_rate) / (max_rate - min_rate);
        Some(if normalized > 0.8 {
            HeatLevel::Severe
        } else if normalized > 0.6 {
            HeatLevel::Elevated
        } else if normalized > 0.4 {
            HeatLevel::Moderate
        } else if normalized > 0.2 {
            HeatLevel::Low
        } else {
            HeatLevel::Minimal
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatLevel::Minimal => "minimal",
            HeatLevel::Low => "low",
            HeatLevel::Moderate => "moderate",
            HeatLevel::Elevated => "elevated",
            HeatLevel::Severe => "severe",
        }
    }
}

/// Smallest and largest state rate, for heat normalization. (0, 0) when no
/// states are loaded.
pub fn rate_bounds(states: &[StateData]) -> (f64, f64) {
    if states.is_empty() {
        return (0.0, 0.0);
    }
    states.iter().fold((f64::MAX, f64::MIN), |(min, max), s| {
        (
            min.min(s.avg_readmission_rate),
            max.max(s.avg_readmission_rate),
        )
    })
}

/// CMS national reference points (HRRP program data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalBenchmarks {
    /// National average 30-day readmission rate, percent.
    pub readmission_rate: f64,
    /// Typical high-risk share of a managed population, percent.
    pub high_risk_percentage: f64,
    pub avg_cost_per_readmission: f64,
    pub top_quartile_rate: f64,
    pub bottom_quartile_rate: f64,
}

impl Default for NationalBenchmarks {
    fn default() -> Self {
        NationalBenchmarks {
            readmission_rate: 15.5,
            high_risk_percentage: 9.2,
            avg_cost_per_readmission: 15_000.0,
            top_quartile_rate: 12.8,
            bottom_quartile_rate: 18.2,
        }
    }
}

/// Performance grade against a reference value (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Performance {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl Performance {
    /// Grade by relative distance below the benchmark: more than 15%
    /// under is excellent, anything under is good, within 15% over is
    /// average.
    pub fn versus(value: f64, benchmark: f64) -> Performance {
        if benchmark <= 0.0 {
            return Performance::Average;
        }
        let pct_diff = (benchmark - value) / benchmark * 100.0;
        if pct_diff > 15.0 {
            Performance::Excellent
        } else if pct_diff > 0.0 {
            Performance::Good
        } else if pct_diff > -15.0 {
            Performance::Average
        } else {
            Performance::NeedsImprovement
        }
    }

    /// Grade a single facility's readmission rate against the fixed HRRP
    /// cutoffs.
    pub fn of_rate(rate: f64) -> Performance {
        if rate < 14.0 {
            Performance::Excellent
        } else if rate < 15.5 {
            Performance::Good
        } else if rate < 17.0 {
            Performance::Average
        } else {
            Performance::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Performance::Excellent => "excellent",
            Performance::Good => "good",
            Performance::Average => "average",
            Performance::NeedsImprovement => "needs-improvement",
        }
    }
}

/// One cohort metric lined up against its national reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BenchmarkComparison {
    pub label: &'static str,
    pub value: f64,
    pub benchmark: f64,
    pub performance: Performance,
}

/// Compare a cohort summary against the national reference points.
pub fn benchmark_summary(
    summary: &SummaryAggregate,
    benchmarks: &NationalBenchmarks,
) -> Vec<BenchmarkComparison> {
    let high_risk_pct = if summary.total_patients == 0 {
        0.0
    } else {
        summary.high_risk_count as f64 / summary.total_patients as f64 * 100.0
    };
    vec![
        BenchmarkComparison {
            label: "30-day readmission rate",
            value: summary.readmission_rate_overall,
            benchmark: benchmarks.readmission_rate,
            performance: Performance::versus(
                summary.readmission_rate_overall,
                benchmarks.readmission_rate,
            ),
        },
        BenchmarkComparison {
            label: "High-risk population share",
            value: high_risk_pct,
            benchmark: benchmarks.high_risk_percentage,
            performance: Performance::versus(high_risk_pct, benchmarks.high_risk_percentage),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(code: &str, hospitals: u64, rate: f64, penalty: f64) -> StateData {
        StateData {
            state: code.to_string(),
            name: code.to_string(),
            lat: 0.0,
            lng: 0.0,
            hospital_count: hospitals,
            avg_readmission_rate: rate,
            avg_penalty_pct: 1.0,
            total_penalty_estimate: penalty,
        }
    }

    fn hospital(name: &str, state: &str, rate: f64) -> Hospital {
        Hospital {
            name: name.to_string(),
            state: state.to_string(),
            city: "City".to_string(),
            readmission_rate: rate,
            penalty_pct: 0.5,
        }
    }

    #[test]
    fn test_national_summary_reduces_state_rows() {
        let states = vec![
            state("TX", 100, 16.0, 2_000_000.0),
            state("VT", 20, 12.0, 100_000.0),
        ];
        let national = national_summary(&states);
        assert_eq!(national.state_count, 2);
        assert_eq!(national.total_hospitals, 120);
        assert_eq!(national.avg_readmission_rate, 14.0);
        assert_eq!(national.total_penalty_estimate, 2_100_000.0);
    }

    #[test]
    fn test_national_summary_empty_is_zero() {
        assert_eq!(national_summary(&[]), NationalSummary::default());
    }

    #[test]
    fn test_states_sort_by_rate_or_penalty() {
        let states = vec![
            state("AL", 10, 14.0, 900_000.0),
            state("WV", 10, 17.2, 300_000.0),
            state("CA", 10, 14.0, 100_000.0),
        ];
        let by_rate: Vec<&str> = sorted_states(&states, StateSort::Rate)
            .iter()
            .map(|s| s.state.as_str())
            .collect();
        // Equal rates fall back to postal code.
        assert_eq!(by_rate, vec!["WV", "AL", "CA"]);

        let by_penalty: Vec<&str> = sorted_states(&states, StateSort::Penalty)
            .iter()
            .map(|s| s.state.as_str())
            .collect();
        assert_eq!(by_penalty, vec!["AL", "WV", "CA"]);
    }

    #[test]
    fn test_top_hospitals_orders_and_truncates() {
        let hospitals = vec![
            hospital("Community Hospital", "OH", 15.1),
            hospital("Memorial Hospital", "TX", 18.4),
            hospital("Regional Medical Center", "AK", 18.4),
            hospital("General Hospital", "WY", 12.9),
        ];
        let names: Vec<&str> = top_hospitals(&hospitals, 3)
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Regional Medical Center", "Memorial Hospital", "Community Hospital"]
        );
    }

    #[test]
    fn test_heat_levels_cover_the_normalized_range() {
        assert_eq!(HeatLevel::of(12.0, 12.0, 18.0), Some(HeatLevel::Minimal));
        assert_eq!(HeatLevel::of(15.0, 12.0, 18.0), Some(HeatLevel::Moderate));
        assert_eq!(HeatLevel::of(18.0, 12.0, 18.0), Some(HeatLevel::Severe));
        // Degenerate range or unusable rate has no heat.
        assert_eq!(HeatLevel::of(15.0, 15.0, 15.0), None);
        assert_eq!(HeatLevel::of(0.0, 12.0, 18.0), None);
    }

    #[test]
    fn test_performance_grades_around_the_benchmark() {
        let benchmark = 15.5;
        assert_eq!(Performance::versus(12.0, benchmark), Performance::Excellent);
        assert_eq!(Performance::versus(15.0, benchmark), Performance::Good);
        assert_eq!(Performance::versus(16.5, benchmark), Performance::Average);
        assert_eq!(
            Performance::versus(19.0, benchmark),
            Performance::NeedsImprovement
        );
    }

    #[test]
    fn test_facility_rate_cutoffs() {
        assert_eq!(Performance::of_rate(13.9), Performance::Excellent);
        assert_eq!(Performance::of_rate(14.0), Performance::Good);
        assert_eq!(Performance::of_rate(16.0), Performance::Average);
        assert_eq!(Performance::of_rate(17.0), Performance::NeedsImprovement);
    }
}
