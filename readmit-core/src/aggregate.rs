//! Cohort summary aggregation
//!
//! Reduces a record collection into the summary statistics every chart and
//! table reads. Aggregates are strictly derived (never stored, always
//! recomputed) and an empty cohort yields a defined zero result, never a
//! division fault.

use crate::cost::{cost_range, total_cost_range, CostBases, CostRange};
use crate::record::{ModelArtifact, RiskFactor, RiskRecord};
use crate::tier::{AgeBand, DistributionBand, HighRiskBand, TierThresholds, WorklistTier};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-worklist-tier record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TierCounts {
    pub routine: u64,
    pub high: u64,
    pub very_high: u64,
    pub critical: u64,
}

impl TierCounts {
    pub fn of<'a, I>(records: I) -> TierCounts
    where
        I: IntoIterator<Item = &'a RiskRecord>,
    {
        let mut counts = TierCounts::default();
        for record in records {
            match WorklistTier::of(record.risk_score) {
                WorklistTier::Routine => counts.routine += 1,
                WorklistTier::High => counts.high += 1,
                WorklistTier::VeryHigh => counts.very_high += 1,
                WorklistTier::Critical => counts.critical += 1,
            }
        }
        counts
    }

    /// Tiers are exhaustive and non-overlapping, so this equals the number
    /// of records counted.
    pub fn total(&self) -> u64 {
        self.routine + self.high + self.very_high + self.critical
    }
}

/// Cost-impact row for one outreach tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TierCostImpact {
    pub tier: String,
    pub count: u64,
    pub total_cost: f64,
    pub avg_cost: f64,
    pub avg_risk: f64,
}

/// Summary statistics over one record collection.
///
/// Computed fields come from the records; `model_auc`,
/// `readmission_rate_overall`, and `risk_factors` pass through from the
/// upstream model artifact untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryAggregate {
    pub total_patients: u64,
    /// Records at or above the high-risk floor (score >= 60).
    pub high_risk_count: u64,
    pub critical_count: u64,
    pub very_high_count: u64,
    pub high_count: u64,
    /// Mean risk score over the high-risk cohort; 0 when it is empty.
    pub avg_risk_score: f64,
    /// Median risk score over the high-risk cohort; 0 when it is empty.
    pub median_risk_score: f64,
    /// 20-point population histogram, keyed by band label.
    pub risk_distribution: BTreeMap<&'static str, u64>,
    /// 10-point histogram over the high-risk cohort.
    pub high_risk_distribution: BTreeMap<&'static str, u64>,
    /// Mean risk score per age band; bands with no records are omitted.
    pub avg_risk_by_age: BTreeMap<&'static str, f64>,
    pub total_cost_exposure: CostRange,
    /// Per-record mean cost exposure; zero when the cohort is empty.
    pub avg_cost_exposure: CostRange,
    pub cost_by_tier: Vec<TierCostImpact>,
    pub model_auc: f64,
    pub readmission_rate_overall: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub risk_factors: Vec<RiskFactor>,
}

/// Running sums for one worklist tier.
#[derive(Default)]
struct TierAccumulator {
    count: u64,
    cost_sum: f64,
    risk_sum: f64,
}

/// Summarize a record collection against an upstream model artifact, with
/// the default worklist thresholds.
pub fn summarize(
    records: &[RiskRecord],
    model: &ModelArtifact,
    bases: &CostBases,
) -> SummaryAggregate {
    summarize_with_thresholds(records, model, bases, &TierThresholds::default())
}

/// Summarize with custom worklist thresholds.
///
/// Single pass for counts and sums; one extra sort for the median.
pub fn summarize_with_thresholds(
    records: &[RiskRecord],
    model: &ModelArtifact,
    bases: &CostBases,
    thresholds: &TierThresholds,
) -> SummaryAggregate {
    let mut distribution: [u64; 5] = [0; 5];
    let mut high_risk_detail: [u64; 4] = [0; 4];
    let mut age_sums: [(f64, u64); 4] = [(0.0, 0); 4];
    let mut tiers: [TierAccumulator; 4] = Default::default();
    let mut high_risk_scores: Vec<f64> = Vec::new();

    for record in records {
        let score = record.risk_score;
        let band = DistributionBand::of(score);
        distribution[DistributionBand::ALL.iter().position(|b| *b == band).unwrap_or(0)] += 1;

        // The detail histogram and the avg/median cohort share the
        // worklist's floor, so every non-routine record appears in both.
        if let Some(detail) = HighRiskBand::with_floor(score, thresholds.high) {
            high_risk_detail[HighRiskBand::ALL.iter().position(|b| *b == detail).unwrap_or(0)] += 1;
            high_risk_scores.push(score);
        }

        let age_band = AgeBand::of(record.age);
        let slot = AgeBand::ALL.iter().position(|b| *b == age_band).unwrap_or(0);
        age_sums[slot].0 += score;
        age_sums[slot].1 += 1;

        let tier = WorklistTier::with_thresholds(score, thresholds);
        let accumulator = match tier {
            WorklistTier::Routine => &mut tiers[0],
            WorklistTier::High => &mut tiers[1],
            WorklistTier::VeryHigh => &mut tiers[2],
            WorklistTier::Critical => &mut tiers[3],
        };
        accumulator.count += 1;
        accumulator.cost_sum += cost_range(score, bases).mid;
        accumulator.risk_sum += score;
    }

    let total_patients = records.len() as u64;
    let total_cost_exposure = total_cost_range(records, bases);
    let avg_cost_exposure = if total_patients == 0 {
        CostRange::default()
    } else {
        let divisor = total_patients as f64;
        CostRange {
            low: total_cost_exposure.low / divisor,
            mid: total_cost_exposure.mid / divisor,
            high: total_cost_exposure.high / divisor,
        }
    };

    let risk_distribution = DistributionBand::ALL
        .iter()
        .zip(distribution.iter())
        .map(|(band, count)| (band.as_str(), *count))
        .collect();
    let high_risk_distribution = HighRiskBand::ALL
        .iter()
        .zip(high_risk_detail.iter())
        .map(|(band, count)| (band.as_str(), *count))
        .collect();
    let avg_risk_by_age = AgeBand::ALL
        .iter()
        .zip(age_sums.iter())
        .filter(|(_, (_, count))| *count > 0)
        .map(|(band, (sum, count))| (band.as_str(), sum / *count as f64))
        .collect();

    // Worklist tiers in display order, routine excluded: it is not part of
    // the outreach queue.
    let cost_by_tier = [
        (WorklistTier::Critical, &tiers[3]),
        (WorklistTier::VeryHigh, &tiers[2]),
        (WorklistTier::High, &tiers[1]),
    ]
    .into_iter()
    .map(|(tier, acc)| TierCostImpact {
        tier: tier.label().to_string(),
        count: acc.count,
        total_cost: acc.cost_sum,
        avg_cost: mean(acc.cost_sum, acc.count),
        avg_risk: mean(acc.risk_sum, acc.count),
    })
    .collect();

    let avg_risk_score = mean(high_risk_scores.iter().sum(), high_risk_scores.len() as u64);
    let median_risk_score = median(&mut high_risk_scores);

    SummaryAggregate {
        total_patients,
        high_risk_count: tiers[1].count + tiers[2].count + tiers[3].count,
        critical_count: tiers[3].count,
        very_high_count: tiers[2].count,
        high_count: tiers[1].count,
        avg_risk_score,
        median_risk_score,
        risk_distribution,
        high_risk_distribution,
        avg_risk_by_age,
        total_cost_exposure,
        avg_cost_exposure,
        cost_by_tier,
        model_auc: model.model_auc,
        readmission_rate_overall: model.readmission_rate_overall,
        risk_factors: model.risk_factors.clone(),
    }
}

/// sum / count with an explicit zero-count guard.
fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Median of an unsorted slice; 0 for an empty slice.
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let middle = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[middle - 1] + values[middle]) / 2.0
    } else {
        values[middle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, age: u32, score: f64) -> RiskRecord {
        RiskRecord {
            patient_id: id,
            hadm_id: None,
            age,
            risk_score: score,
            readmitted_30day: None,
            uci: None,
            mimic: None,
        }
    }

    fn model() -> ModelArtifact {
        ModelArtifact {
            model_auc: 0.84,
            readmission_rate_overall: 11.2,
            risk_factors: Vec::new(),
        }
    }

    #[test]
    fn test_custom_thresholds_use_one_floor_everywhere() {
        // With the worklist floor lowered to 50, a score-55 record joins
        // the high-risk cohort in every view at once: the tier counts, the
        // detail histogram, and the avg/median selection.
        let records = vec![record(1, 60, 55.0)];
        let thresholds = TierThresholds {
            high: 50.0,
            ..TierThresholds::default()
        };
        let summary =
            summarize_with_thresholds(&records, &model(), &CostBases::default(), &thresholds);

        assert_eq!(summary.high_risk_count, 1);
        assert_eq!(summary.high_count, 1);
        let distributed: u64 = summary.high_risk_distribution.values().sum();
        assert_eq!(distributed, summary.high_risk_count);
        assert_eq!(summary.high_risk_distribution["60-70%"], 1);
        assert_eq!(summary.avg_risk_score, 55.0);
        assert_eq!(summary.median_risk_score, 55.0);
    }

    #[test]
    fn test_empty_cohort_yields_zero_result() {
        let summary = summarize(&[], &model(), &CostBases::default());
        assert_eq!(summary.total_patients, 0);
        assert_eq!(summary.high_risk_count, 0);
        assert_eq!(summary.avg_risk_score, 0.0);
        assert_eq!(summary.median_risk_score, 0.0);
        assert_eq!(summary.avg_cost_exposure, CostRange::default());
        assert!(summary.avg_risk_by_age.is_empty());
        // Pass-through fields survive an empty cohort.
        assert_eq!(summary.model_auc, 0.84);
    }

    #[test]
    fn test_three_record_scenario() {
        let records = vec![
            record(1, 45, 55.0),
            record(2, 62, 65.0),
            record(3, 78, 85.0),
        ];
        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(summary.total_patients, 3);
        assert_eq!(summary.high_count, 1);
        assert_eq!(summary.very_high_count, 0);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.high_risk_count, 2);
    }

    #[test]
    fn test_tier_counts_sum_to_total() {
        let records: Vec<RiskRecord> = (0u64..=100)
            .map(|i| record(i, 30 + (i % 60) as u32, i as f64))
            .collect();
        let counts = TierCounts::of(&records);
        assert_eq!(counts.total(), records.len() as u64);

        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(
            counts.routine + summary.high_count + summary.very_high_count + summary.critical_count,
            summary.total_patients
        );
    }

    #[test]
    fn test_total_cost_matches_element_wise_sum() {
        let records = vec![record(1, 50, 40.0), record(2, 60, 80.0)];
        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(summary.total_cost_exposure.low, 12_000.0);
        assert_eq!(summary.total_cost_exposure.mid, 18_000.0);
        assert_eq!(summary.total_cost_exposure.high, 30_000.0);
        assert_eq!(summary.avg_cost_exposure.mid, 9_000.0);
    }

    #[test]
    fn test_distribution_histogram() {
        let records = vec![
            record(1, 40, 10.0),
            record(2, 40, 30.0),
            record(3, 40, 30.5),
            record(4, 40, 79.9),
            record(5, 40, 80.0),
            record(6, 40, 100.0),
        ];
        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(summary.risk_distribution["0-20%"], 1);
        assert_eq!(summary.risk_distribution["20-40%"], 2);
        assert_eq!(summary.risk_distribution["40-60%"], 0);
        assert_eq!(summary.risk_distribution["60-80%"], 1);
        assert_eq!(summary.risk_distribution["80-100%"], 2);
    }

    #[test]
    fn test_high_risk_detail_histogram_and_median() {
        let records = vec![
            record(1, 40, 55.0), // below the floor, excluded from detail
            record(2, 40, 61.0),
            record(3, 40, 75.0),
            record(4, 40, 92.0),
        ];
        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(summary.high_risk_distribution["60-70%"], 1);
        assert_eq!(summary.high_risk_distribution["70-80%"], 1);
        assert_eq!(summary.high_risk_distribution["80-90%"], 0);
        assert_eq!(summary.high_risk_distribution["90-100%"], 1);
        assert_eq!(summary.median_risk_score, 75.0);
        assert!((summary.avg_risk_score - 76.0).abs() < 1e-9);
    }

    #[test]
    fn test_avg_risk_by_age_bands() {
        let records = vec![
            record(1, 25, 40.0),
            record(2, 28, 60.0),
            record(3, 72, 90.0),
        ];
        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(summary.avg_risk_by_age["Under 30"], 50.0);
        assert_eq!(summary.avg_risk_by_age["70+"], 90.0);
        assert!(!summary.avg_risk_by_age.contains_key("30-49"));
    }

    #[test]
    fn test_cost_by_tier_rows() {
        let records = vec![record(1, 50, 65.0), record(2, 60, 85.0)];
        let summary = summarize(&records, &model(), &CostBases::default());
        assert_eq!(summary.cost_by_tier.len(), 3);
        let critical = &summary.cost_by_tier[0];
        assert_eq!(critical.tier, "Critical (80%+)");
        assert_eq!(critical.count, 1);
        assert_eq!(critical.avg_risk, 85.0);
        // Mid-base cost at score 85 with the $15K midpoint.
        assert_eq!(critical.total_cost, 12_750.0);
        let very_high = &summary.cost_by_tier[1];
        assert_eq!(very_high.count, 0);
        assert_eq!(very_high.avg_cost, 0.0);
    }

    #[test]
    fn test_median_even_count() {
        let mut values = vec![80.0, 60.0, 70.0, 90.0];
        assert_eq!(median(&mut values), 75.0);
        let mut odd = vec![80.0, 60.0, 70.0];
        assert_eq!(median(&mut odd), 70.0);
    }
}
