//! Dataset store: loading bundled cohorts
//!
//! An explicit, constructed store (no module-level statics) that reads one
//! records file and one model-summary file per dataset from a data
//! directory. The store performs the crate's only I/O: a single best-effort
//! read per load. Records are immutable after load; there is no write path.

use crate::cost::clamp_score;
use crate::geo::{Geography, Hospital, StateData};
use crate::record::{DatasetId, ModelArtifact, RiskRecord};
use anyhow::{Context, Result};
use log::warn;
use std::path::{Path, PathBuf};

const RECORDS_FILE: &str = "patient_risks.json";
const SUMMARY_FILE: &str = "risk_summary.json";
const STATE_FILE: &str = "state_summary.json";
const HOSPITAL_FILE: &str = "hospital_metrics.json";

/// One loaded cohort: scored records plus the upstream model artifact.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: DatasetId,
    pub records: Vec<RiskRecord>,
    pub model: ModelArtifact,
}

/// Read-only access to the bundled datasets under one data directory.
///
/// Layout: `<data_dir>/<dataset>/patient_risks.json` and
/// `<data_dir>/<dataset>/risk_summary.json`.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> DatasetStore {
        DatasetStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// True when both backing files for the dataset are present.
    pub fn available(&self, id: DatasetId) -> bool {
        let dir = self.data_dir.join(id.as_str());
        dir.join(RECORDS_FILE).is_file() && dir.join(SUMMARY_FILE).is_file()
    }

    /// Load a dataset, falling back to the default cohort when the
    /// requested one is not bundled.
    ///
    /// The fallback is logged, never fatal; only a missing *default*
    /// dataset is a hard error.
    pub fn load(&self, id: DatasetId) -> Result<Dataset> {
        if self.available(id) {
            return self.load_exact(id);
        }
        if id == DatasetId::DEFAULT {
            anyhow::bail!(
                "default dataset '{}' is not bundled under {}",
                id.as_str(),
                self.data_dir.display()
            );
        }
        warn!(
            "dataset '{}' is not bundled under {}; falling back to '{}'",
            id.as_str(),
            self.data_dir.display(),
            DatasetId::DEFAULT.as_str()
        );
        self.load_exact(DatasetId::DEFAULT)
    }

    /// Load the geographic benchmark pair from the directory root. The
    /// files sit beside the dataset subdirectories and are shared by every
    /// dataset; a missing file is a hard error, there is no fallback.
    pub fn load_geography(&self) -> Result<Geography> {
        let states_path = self.data_dir.join(STATE_FILE);
        let raw = std::fs::read_to_string(&states_path)
            .with_context(|| format!("failed to read {}", states_path.display()))?;
        let states: Vec<StateData> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", states_path.display()))?;

        let hospitals_path = self.data_dir.join(HOSPITAL_FILE);
        let raw = std::fs::read_to_string(&hospitals_path)
            .with_context(|| format!("failed to read {}", hospitals_path.display()))?;
        let hospitals: Vec<Hospital> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", hospitals_path.display()))?;

        Ok(Geography { states, hospitals })
    }

    fn load_exact(&self, id: DatasetId) -> Result<Dataset> {
        let dir = self.data_dir.join(id.as_str());

        let records_path = dir.join(RECORDS_FILE);
        let raw = std::fs::read_to_string(&records_path)
            .with_context(|| format!("failed to read {}", records_path.display()))?;
        let mut records: Vec<RiskRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", records_path.display()))?;

        // Upstream data is trusted to arrive pre-clamped; repair anything
        // out of range here so every downstream computation sees [0, 100].
        let mut repaired = 0usize;
        for record in &mut records {
            if !(0.0..=100.0).contains(&record.risk_score) {
                record.risk_score = if record.risk_score.is_finite() {
                    record.risk_score.clamp(0.0, 100.0)
                } else {
                    0.0
                };
                repaired += 1;
            }
        }
        if repaired > 0 {
            warn!(
                "clamped {} out-of-range risk score(s) while loading dataset '{}'",
                repaired,
                id.as_str()
            );
        }

        let summary_path = dir.join(SUMMARY_FILE);
        let raw = std::fs::read_to_string(&summary_path)
            .with_context(|| format!("failed to read {}", summary_path.display()))?;
        let model: ModelArtifact = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", summary_path.display()))?;

        debug_assert!(records
            .iter()
            .all(|r| clamp_score(r.risk_score) == r.risk_score));

        Ok(Dataset { id, records, model })
    }
}
