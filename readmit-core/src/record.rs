//! Scored patient records and the upstream model artifact
//!
//! Records are produced by an offline scoring pipeline and shipped as static
//! JSON. Nothing in this crate mutates them after load.

use serde::{Deserialize, Serialize};

/// Identifier of a bundled patient cohort.
///
/// Different cohorts carry different covariate schemas; consumers branch on
/// this tag rather than probing for field presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetId {
    /// UCI diabetes readmissions cohort (1999-2008). The default dataset.
    Uci,
    /// MIMIC-IV ICU readmissions cohort (2008-2019). Optional.
    Mimic,
}

impl DatasetId {
    /// Dataset used when a requested cohort is not bundled.
    pub const DEFAULT: DatasetId = DatasetId::Uci;

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetId::Uci => "uci",
            DatasetId::Mimic => "mimic",
        }
    }

    pub fn parse(s: &str) -> Option<DatasetId> {
        match s {
            "uci" => Some(DatasetId::Uci),
            "mimic" => Some(DatasetId::Mimic),
            _ => None,
        }
    }
}

/// Covariates populated by UCI-shaped cohorts.
///
/// Display-only: none of these feed back into scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UciCovariates {
    pub time_in_hospital: u32,
    pub num_medications: u32,
    pub number_diagnoses: u32,
    pub number_inpatient: u32,
    pub number_emergency: u32,
    pub total_visits: u32,
    pub num_med_changes: u32,
}

/// Covariates populated by MIMIC-shaped cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MimicCovariates {
    pub medication_count: u32,
    /// 1 if the admission included an ICU stay, 0 otherwise.
    pub had_icu_stay: u8,
}

/// One scored patient admission.
///
/// `patient_id`, `age`, and `risk_score` are the required core; the two
/// covariate extensions are populated by exactly one dataset family each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskRecord {
    pub patient_id: u64,
    /// Hospital admission id (MIMIC only). Unique per admission, so it is
    /// the preferred tie-break key when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hadm_id: Option<u64>,
    pub age: u32,
    /// Modeled 30-day readmission likelihood in [0, 100].
    pub risk_score: f64,
    /// Observed outcome flag from the source data (1 = readmitted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readmitted_30day: Option<u8>,
    // A flattened `None` serializes to no fields at all, so absent
    // covariates round-trip cleanly.
    #[serde(flatten)]
    pub uci: Option<UciCovariates>,
    #[serde(flatten)]
    pub mimic: Option<MimicCovariates>,
}

impl RiskRecord {
    /// Stable identity for deterministic tie-breaking: the admission id when
    /// present (unique per row in MIMIC), otherwise the patient id.
    pub fn unique_id(&self) -> u64 {
        self.hadm_id.unwrap_or(self.patient_id)
    }
}

/// Direction of a model coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorDirection {
    Risk,
    Protective,
}

/// One named coefficient from the upstream model, for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskFactor {
    pub name: String,
    pub coefficient: f64,
    pub direction: FactorDirection,
}

/// Pass-through fields from the upstream model artifact.
///
/// These are inputs to the summary, never computed here: the model is
/// trained and evaluated entirely offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelArtifact {
    /// ROC-AUC of the upstream model on its held-out split.
    pub model_auc: f64,
    /// Observed 30-day readmission rate across the full population, percent.
    pub readmission_rate_overall: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_factors: Vec<RiskFactor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_id_round_trip() {
        for id in [DatasetId::Uci, DatasetId::Mimic] {
            assert_eq!(DatasetId::parse(id.as_str()), Some(id));
        }
        assert_eq!(DatasetId::parse("cms"), None);
    }

    #[test]
    fn test_unique_id_prefers_admission_id() {
        let mut record = RiskRecord {
            patient_id: 17,
            hadm_id: None,
            age: 64,
            risk_score: 72.5,
            readmitted_30day: None,
            uci: None,
            mimic: None,
        };
        assert_eq!(record.unique_id(), 17);
        record.hadm_id = Some(900_001);
        assert_eq!(record.unique_id(), 900_001);
    }

    #[test]
    fn test_uci_record_deserializes_with_flattened_covariates() {
        let json = r#"{
            "patient_id": 42,
            "age": 71,
            "risk_score": 83.4,
            "readmitted_30day": 1,
            "time_in_hospital": 9,
            "num_medications": 21,
            "number_diagnoses": 8,
            "number_inpatient": 2,
            "number_emergency": 1,
            "total_visits": 5,
            "num_med_changes": 3
        }"#;
        let record: RiskRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.patient_id, 42);
        assert!(record.mimic.is_none());
        let uci = record.uci.expect("uci covariates");
        assert_eq!(uci.num_medications, 21);
        assert_eq!(uci.total_visits, 5);
    }

    #[test]
    fn test_mimic_record_deserializes_sparse_schema() {
        let json = r#"{
            "patient_id": 7,
            "hadm_id": 120345,
            "age": 58,
            "risk_score": 66.0,
            "medication_count": 14,
            "had_icu_stay": 1
        }"#;
        let record: RiskRecord = serde_json::from_str(json).unwrap();
        assert!(record.uci.is_none());
        assert_eq!(record.hadm_id, Some(120_345));
        assert_eq!(record.mimic.expect("mimic covariates").medication_count, 14);
    }
}
