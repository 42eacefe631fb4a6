//! View query layer: filter, sort, and truncate member worklists
//!
//! Global invariants enforced:
//! - Filters are conjunctive; sentinel `All` values pass everything
//! - Sorting is a total order (id tie-break), so identical inputs always
//!   produce identical output order
//! - Truncation happens strictly after filtering and sorting

use crate::record::RiskRecord;
use crate::tier::WorklistTier;
use std::cmp::Ordering;

/// Worklist tier filter. Bounds mirror the classifier in `tier.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierFilter {
    #[default]
    All,
    Critical, // score >= 80
    VeryHigh, // 70 <= score < 80
    High,     // 60 <= score < 70
}

impl TierFilter {
    fn matches(&self, risk_score: f64) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Critical => risk_score >= 80.0,
            TierFilter::VeryHigh => (70.0..80.0).contains(&risk_score),
            TierFilter::High => (60.0..70.0).contains(&risk_score),
        }
    }
}

/// Age band filter for the member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeFilter {
    #[default]
    All,
    Under50,
    FiftyToSixtyNine,
    SeventyPlus,
}

impl AgeFilter {
    fn matches(&self, age: u32) -> bool {
        match self {
            AgeFilter::All => true,
            AgeFilter::Under50 => age < 50,
            AgeFilter::FiftyToSixtyNine => (50..70).contains(&age),
            AgeFilter::SeventyPlus => age >= 70,
        }
    }
}

/// Sortable record fields. Covariate fields may be absent on a given
/// record; absent values always sort after present ones. `Tier` is the one
/// textual field: it sorts by the tier's display name, not by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    PatientId,
    HadmId,
    Age,
    Tier,
    TimeInHospital,
    NumMedications,
    NumberDiagnoses,
    TotalVisits,
    MedicationCount,
    HadIcuStay,
    #[default]
    RiskScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A field value extracted for comparison: numeric when the field parses as
/// a number, textual otherwise.
#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn render(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Numeric comparison when both operands are numbers, lexicographic string
/// comparison otherwise.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        _ => a.render().cmp(&b.render()),
    }
}

fn field_value(record: &RiskRecord, field: SortField) -> Option<FieldValue> {
    let number = |n: f64| Some(FieldValue::Number(n));
    match field {
        SortField::PatientId => number(record.patient_id as f64),
        SortField::HadmId => record.hadm_id.map(|id| FieldValue::Number(id as f64)),
        SortField::Age => number(f64::from(record.age)),
        SortField::Tier => Some(FieldValue::Text(
            WorklistTier::of(record.risk_score).as_str().to_string(),
        )),
        SortField::RiskScore => number(record.risk_score),
        SortField::TimeInHospital => record
            .uci
            .map(|c| FieldValue::Number(f64::from(c.time_in_hospital))),
        SortField::NumMedications => record
            .uci
            .map(|c| FieldValue::Number(f64::from(c.num_medications))),
        SortField::NumberDiagnoses => record
            .uci
            .map(|c| FieldValue::Number(f64::from(c.number_diagnoses))),
        SortField::TotalVisits => record
            .uci
            .map(|c| FieldValue::Number(f64::from(c.total_visits))),
        SortField::MedicationCount => record
            .mimic
            .map(|c| FieldValue::Number(f64::from(c.medication_count))),
        SortField::HadIcuStay => record
            .mimic
            .map(|c| FieldValue::Number(f64::from(c.had_icu_stay))),
    }
}

/// Parameters for one member-table query. `Default` is the table's initial
/// view: every record, risk score descending, no truncation.
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
    /// Substring match against the decimal patient id.
    pub search: Option<String>,
    pub tier: TierFilter,
    pub age: AgeFilter,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// Applied after filtering and sorting, never before.
    pub limit: Option<usize>,
}

fn matches(record: &RiskRecord, query: &MemberQuery) -> bool {
    if let Some(term) = &query.search {
        if !term.is_empty() && !record.patient_id.to_string().contains(term.as_str()) {
            return false;
        }
    }
    query.tier.matches(record.risk_score) && query.age.matches(record.age)
}

/// Records passing every filter, in input order. Exposed separately so
/// side displays (tier counts) can read the filtered set before any limit
/// is applied.
pub fn filtered<'a>(records: &'a [RiskRecord], query: &MemberQuery) -> Vec<&'a RiskRecord> {
    records.iter().filter(|r| matches(r, query)).collect()
}

fn compare_records(
    a: &RiskRecord,
    b: &RiskRecord,
    field: SortField,
    order: SortOrder,
) -> Ordering {
    let tie_break = |a: &RiskRecord, b: &RiskRecord| a.unique_id().cmp(&b.unique_id());
    match (field_value(a, field), field_value(b, field)) {
        // Missing values go last regardless of direction.
        (None, None) => tie_break(a, b),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let mut ordering = compare_values(&x, &y);
            if order == SortOrder::Desc {
                ordering = ordering.reverse();
            }
            if ordering == Ordering::Equal {
                tie_break(a, b)
            } else {
                ordering
            }
        }
    }
}

/// Filter, sort into a total order, then truncate.
pub fn query<'a>(records: &'a [RiskRecord], query: &MemberQuery) -> Vec<&'a RiskRecord> {
    let mut hits = filtered(records, query);
    hits.sort_by(|a, b| compare_records(a, b, query.sort_field, query.sort_order));
    if let Some(limit) = query.limit {
        hits.truncate(limit);
    }
    hits
}

/// The outreach worklist: records at or above the floor, highest risk
/// first. The floor applies before the cut, so `top` never spends its
/// budget on sub-floor rows.
pub fn high_risk_worklist(
    records: &[RiskRecord],
    floor: f64,
    top: Option<usize>,
) -> Vec<&RiskRecord> {
    let mut rows: Vec<&RiskRecord> = records
        .iter()
        .filter(|r| r.risk_score >= floor)
        .collect();
    rows.sort_by(|a, b| compare_records(a, b, SortField::RiskScore, SortOrder::Desc));
    if let Some(top) = top {
        rows.truncate(top);
    }
    rows
}
