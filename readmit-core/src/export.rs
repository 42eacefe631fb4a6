//! CSV export of member worklists
//!
//! Column sets vary by dataset schema (sparse covariates), so headers are
//! declared per dataset rather than assumed fixed. Output is deterministic:
//! row order equals query order, `\n` line endings, header always present.

use crate::cost::{cost_range, CostBases};
use crate::record::{DatasetId, RiskRecord};

const UCI_HEADERS: &[&str] = &[
    "Patient ID",
    "Age",
    "Days Hospitalized",
    "Medications",
    "Diagnoses",
    "Total Visits",
    "Risk Score",
    "Cost Low",
    "Cost Mid",
    "Cost High",
];

const MIMIC_HEADERS: &[&str] = &[
    "Patient ID",
    "Admission ID",
    "Age",
    "Medication Count",
    "ICU Stay",
    "Risk Score",
    "Cost Low",
    "Cost Mid",
    "Cost High",
];

/// Column headers for a dataset's export schema.
pub fn csv_headers(dataset: DatasetId) -> &'static [&'static str] {
    match dataset {
        DatasetId::Uci => UCI_HEADERS,
        DatasetId::Mimic => MIMIC_HEADERS,
    }
}

fn optional_u32(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_row(record: &RiskRecord, dataset: DatasetId, bases: &CostBases) -> String {
    let range = cost_range(record.risk_score, bases);
    let mut cells: Vec<String> = vec![record.patient_id.to_string()];
    match dataset {
        DatasetId::Uci => {
            cells.push(record.age.to_string());
            cells.push(optional_u32(record.uci.map(|c| c.time_in_hospital)));
            cells.push(optional_u32(record.uci.map(|c| c.num_medications)));
            cells.push(optional_u32(record.uci.map(|c| c.number_diagnoses)));
            cells.push(optional_u32(record.uci.map(|c| c.total_visits)));
        }
        DatasetId::Mimic => {
            cells.push(record.hadm_id.map(|v| v.to_string()).unwrap_or_default());
            cells.push(record.age.to_string());
            cells.push(optional_u32(record.mimic.map(|c| c.medication_count)));
            cells.push(
                record
                    .mimic
                    .map(|c| if c.had_icu_stay == 1 { "Yes" } else { "No" }.to_string())
                    .unwrap_or_default(),
            );
        }
    }
    cells.push(format!("{:.1}", record.risk_score));
    cells.push(format!("{:.2}", range.low));
    cells.push(format!("{:.2}", range.mid));
    cells.push(format!("{:.2}", range.high));
    cells.join(",")
}

/// Render records as CSV with the dataset's column set.
pub fn render_csv(records: &[&RiskRecord], dataset: DatasetId, bases: &CostBases) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(csv_headers(dataset).join(","));
    for record in records {
        lines.push(csv_row(record, dataset, bases));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MimicCovariates, UciCovariates};

    fn uci_record() -> RiskRecord {
        RiskRecord {
            patient_id: 42,
            hadm_id: None,
            age: 71,
            risk_score: 83.46,
            readmitted_30day: Some(1),
            uci: Some(UciCovariates {
                time_in_hospital: 9,
                num_medications: 21,
                number_diagnoses: 8,
                number_inpatient: 2,
                number_emergency: 1,
                total_visits: 5,
                num_med_changes: 3,
            }),
            mimic: None,
        }
    }

    fn mimic_record() -> RiskRecord {
        RiskRecord {
            patient_id: 7,
            hadm_id: Some(120_345),
            age: 58,
            risk_score: 66.0,
            readmitted_30day: None,
            uci: None,
            mimic: Some(MimicCovariates {
                medication_count: 14,
                had_icu_stay: 1,
            }),
        }
    }

    #[test]
    fn test_uci_export_shape() {
        let record = uci_record();
        let csv = render_csv(&[&record], DatasetId::Uci, &CostBases::default());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Patient ID,Age,Days Hospitalized,Medications,Diagnoses,Total Visits,Risk Score,Cost Low,Cost Mid,Cost High"
        );
        // Score to one decimal, costs to two.
        assert_eq!(
            lines.next().unwrap(),
            "42,71,9,21,8,5,83.5,8346.00,12519.00,20865.00"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_mimic_export_shape() {
        let record = mimic_record();
        let csv = render_csv(&[&record], DatasetId::Mimic, &CostBases::default());
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "7,120345,58,14,Yes,66.0,6600.00,9900.00,16500.00");
    }

    #[test]
    fn test_missing_covariates_render_empty_cells() {
        let mut record = uci_record();
        record.uci = None;
        let csv = render_csv(&[&record], DatasetId::Uci, &CostBases::default());
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("42,71,,,,,"));
    }

    #[test]
    fn test_header_present_for_empty_export() {
        let csv = render_csv(&[], DatasetId::Mimic, &CostBases::default());
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Patient ID,Admission ID"));
    }
}
