//! Text and JSON rendering of worklists and summaries
//!
//! Global invariants enforced:
//! - Deterministic output ordering (input order is preserved)
//! - Byte-for-byte identical output across runs

use crate::aggregate::SummaryAggregate;
use crate::cost::{cost_range, CostBases, CostRange};
use crate::format::{format_count, format_currency};
use crate::geo::{
    self, BenchmarkComparison, Geography, HeatLevel, Hospital, NationalSummary, Performance,
    StateData, StateSort,
};
use crate::record::RiskRecord;
use crate::tier::WorklistTier;
use serde::Serialize;

/// One member row enriched with derived display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberView<'a> {
    #[serde(flatten)]
    pub record: &'a RiskRecord,
    pub tier: &'static str,
    pub cost_range: CostRange,
}

/// Attach tier and cost range to each record for output.
pub fn member_views<'a>(records: &[&'a RiskRecord], bases: &CostBases) -> Vec<MemberView<'a>> {
    records
        .iter()
        .map(|record| MemberView {
            record,
            tier: WorklistTier::of(record.risk_score).as_str(),
            cost_range: cost_range(record.risk_score, bases),
        })
        .collect()
}

/// Render member rows as a fixed-width text table.
pub fn render_members_text(records: &[&RiskRecord], bases: &CostBases) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:<5} {:<7} {:<10} {}\n",
        "ID", "AGE", "RISK", "TIER", "COST RANGE"
    ));
    for record in records {
        let range = cost_range(record.risk_score, bases);
        let risk = format!("{:.1}%", record.risk_score);
        output.push_str(&format!(
            "{:<10} {:<5} {:<7} {:<10} {} - {}\n",
            record.patient_id,
            record.age,
            risk,
            WorklistTier::of(record.risk_score).as_str(),
            format_currency(range.low),
            format_currency(range.high),
        ));
    }
    output
}

/// Render member rows as pretty JSON.
pub fn render_members_json(records: &[&RiskRecord], bases: &CostBases) -> String {
    serde_json::to_string_pretty(&member_views(records, bases))
        .unwrap_or_else(|_| "[]".to_string())
}

/// Render a cohort summary as human-readable text.
pub fn render_summary_text(summary: &SummaryAggregate) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Patients analyzed:    {}\n",
        format_count(summary.total_patients)
    ));
    output.push_str(&format!(
        "High-risk members:    {}\n",
        format_count(summary.high_risk_count)
    ));
    output.push_str(&format!(
        "  Critical (80%+):    {}\n",
        format_count(summary.critical_count)
    ));
    output.push_str(&format!(
        "  Very High (70-80%): {}\n",
        format_count(summary.very_high_count)
    ));
    output.push_str(&format!(
        "  High (60-70%):      {}\n",
        format_count(summary.high_count)
    ));
    output.push_str(&format!(
        "Avg risk score:       {:.1}%\n",
        summary.avg_risk_score
    ));
    output.push_str(&format!(
        "Median risk score:    {:.1}%\n",
        summary.median_risk_score
    ));
    output.push_str(&format!(
        "Cost exposure:        {} - {} (mid {})\n",
        format_currency(summary.total_cost_exposure.low),
        format_currency(summary.total_cost_exposure.high),
        format_currency(summary.total_cost_exposure.mid),
    ));
    output.push_str(&format!(
        "Model ROC-AUC:        {:.0}%\n",
        summary.model_auc * 100.0
    ));
    output.push_str(&format!(
        "Readmission rate:     {:.1}%\n",
        summary.readmission_rate_overall
    ));

    output.push_str("\nRisk distribution:\n");
    for (band, count) in &summary.risk_distribution {
        output.push_str(&format!("  {:<8} {}\n", band, format_count(*count)));
    }

    if !summary.cost_by_tier.is_empty() {
        output.push_str("\nCost impact by tier:\n");
        output.push_str(&format!(
            "  {:<20} {:<8} {:<10} {:<10} {}\n",
            "TIER", "COUNT", "TOTAL", "AVG", "AVG RISK"
        ));
        for row in &summary.cost_by_tier {
            output.push_str(&format!(
                "  {:<20} {:<8} {:<10} {:<10} {:.1}%\n",
                row.tier,
                format_count(row.count),
                format_currency(row.total_cost),
                format_currency(row.avg_cost),
                row.avg_risk,
            ));
        }
    }

    output
}

/// Render a cohort summary as pretty JSON.
pub fn render_summary_json(summary: &SummaryAggregate) -> String {
    serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
}

/// The cohort summary lined up against the national reference points.
pub fn render_benchmarks_text(comparisons: &[BenchmarkComparison]) -> String {
    let mut output = String::new();
    output.push_str("\nNational benchmarks:\n");
    for comparison in comparisons {
        output.push_str(&format!(
            "  {:<28} {:>5.1}%  (national {:.1}%)  {}\n",
            comparison.label,
            comparison.value,
            comparison.benchmark,
            comparison.performance.as_str(),
        ));
    }
    output
}

/// One state row enriched with its relative heat for output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
struct StateView<'a> {
    #[serde(flatten)]
    state: &'a StateData,
    #[serde(skip_serializing_if = "Option::is_none")]
    heat: Option<HeatLevel>,
}

/// One facility row enriched with its performance grade.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
struct HospitalView<'a> {
    #[serde(flatten)]
    hospital: &'a Hospital,
    performance: Performance,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
struct GeographyView<'a> {
    national: NationalSummary,
    states: Vec<StateView<'a>>,
    top_hospitals: Vec<HospitalView<'a>>,
}

fn geography_view(geography: &Geography, sort: StateSort, top: usize) -> GeographyView<'_> {
    let (min_rate, max_rate) = geo::rate_bounds(&geography.states);
    GeographyView {
        national: geo::national_summary(&geography.states),
        states: geo::sorted_states(&geography.states, sort)
            .into_iter()
            .map(|state| StateView {
                state,
                heat: HeatLevel::of(state.avg_readmission_rate, min_rate, max_rate),
            })
            .collect(),
        top_hospitals: geo::top_hospitals(&geography.hospitals, top)
            .into_iter()
            .map(|hospital| HospitalView {
                hospital,
                performance: Performance::of_rate(hospital.readmission_rate),
            })
            .collect(),
    }
}

/// Render the geographic analysis as human-readable text.
pub fn render_geography_text(geography: &Geography, sort: StateSort, top: usize) -> String {
    let view = geography_view(geography, sort, top);
    let mut output = String::new();
    output.push_str(&format!(
        "States analyzed:      {}\n",
        format_count(view.national.state_count)
    ));
    output.push_str(&format!(
        "Total hospitals:      {}\n",
        format_count(view.national.total_hospitals)
    ));
    output.push_str(&format!(
        "National avg rate:    {:.1}%\n",
        view.national.avg_readmission_rate
    ));
    output.push_str(&format!(
        "Est. total penalties: {}\n",
        format_currency(view.national.total_penalty_estimate)
    ));

    output.push_str(&format!(
        "\n{:<6} {:<22} {:<10} {:<9} {:<10} {:<13} {}\n",
        "STATE", "NAME", "HOSPITALS", "RATE", "PENALTY %", "EST. PENALTY", "HEAT"
    ));
    for row in &view.states {
        let rate = format!("{:.1}%", row.state.avg_readmission_rate);
        let penalty_pct = format!("{:.2}%", row.state.avg_penalty_pct);
        output.push_str(&format!(
            "{:<6} {:<22} {:<10} {:<9} {:<10} {:<13} {}\n",
            row.state.state,
            row.state.name,
            format_count(row.state.hospital_count),
            rate,
            penalty_pct,
            format_currency(row.state.total_penalty_estimate),
            row.heat.map(|h| h.as_str()).unwrap_or("-"),
        ));
    }

    if !view.top_hospitals.is_empty() {
        output.push_str("\nHighest readmission rate hospitals:\n");
        output.push_str(&format!(
            "  {:<36} {:<20} {:<8} {:<10} {}\n",
            "HOSPITAL", "LOCATION", "RATE", "PENALTY %", "PERFORMANCE"
        ));
        for row in &view.top_hospitals {
            let location = format!("{}, {}", row.hospital.city, row.hospital.state);
            let rate = format!("{:.1}%", row.hospital.readmission_rate);
            let penalty_pct = format!("{:.2}%", row.hospital.penalty_pct);
            output.push_str(&format!(
                "  {:<36} {:<20} {:<8} {:<10} {}\n",
                row.hospital.name,
                location,
                rate,
                penalty_pct,
                row.performance.as_str(),
            ));
        }
    }

    output
}

/// Render the geographic analysis as pretty JSON.
pub fn render_geography_json(geography: &Geography, sort: StateSort, top: usize) -> String {
    serde_json::to_string_pretty(&geography_view(geography, sort, top))
        .unwrap_or_else(|_| "{}".to_string())
}
