//! Configuration file support
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.readmitrc.json` in the data root
//! 3. `readmit.config.json` in the data root
//!
//! All fields are optional. CLI flags take precedence over config file
//! values.

use crate::cost::CostBases;
use crate::record::DatasetId;
use crate::tier::TierThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILENAMES: &[&str] = &[".readmitrc.json", "readmit.config.json"];

/// Readmit configuration loaded from a JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadmitConfig {
    /// Custom benchmark cost bases (default: $10K / $15K / $25K)
    #[serde(default)]
    pub cost_bases: Option<CostBaseConfig>,

    /// Custom worklist tier thresholds (default: 60 / 70 / 80)
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Minimum score counted as high-risk (default: 60.0)
    #[serde(default)]
    pub high_risk_floor: Option<f64>,

    /// Default row limit for member listings
    #[serde(default)]
    pub limit: Option<usize>,

    /// Dataset loaded when none is requested (default: "uci")
    #[serde(default)]
    pub default_dataset: Option<String>,
}

/// Custom benchmark cost bases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostBaseConfig {
    /// Low benchmark in dollars (default: 10000)
    pub low: Option<f64>,
    /// Mid benchmark in dollars (default: 15000)
    pub mid: Option<f64>,
    /// High benchmark in dollars (default: 25000)
    pub high: Option<f64>,
}

/// Custom worklist tier thresholds (lower bounds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Score threshold for the high tier (default: 60.0)
    pub high: Option<f64>,
    /// Score threshold for the very-high tier (default: 70.0)
    pub very_high: Option<f64>,
    /// Score threshold for the critical tier (default: 80.0)
    pub critical: Option<f64>,
}

/// Resolved configuration with every value made concrete.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bases: CostBases,
    pub thresholds: TierThresholds,
    pub high_risk_floor: f64,
    pub limit: Option<usize>,
    pub default_dataset: DatasetId,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            bases: CostBases::default(),
            thresholds: TierThresholds::default(),
            high_risk_floor: 60.0,
            limit: None,
            default_dataset: DatasetId::DEFAULT,
            config_path: None,
        }
    }
}

impl ReadmitConfig {
    /// Validate the configuration for logical errors.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref bases) = self.cost_bases {
            let low = bases.low.unwrap_or(10_000.0);
            let mid = bases.mid.unwrap_or(15_000.0);
            let high = bases.high.unwrap_or(25_000.0);

            for (name, value) in [("low", low), ("mid", mid), ("high", high)] {
                if !value.is_finite() || value < 0.0 {
                    anyhow::bail!(
                        "cost_bases.{} must be a non-negative number (got {})",
                        name,
                        value
                    );
                }
            }
            if low > mid {
                anyhow::bail!(
                    "cost_bases.low ({}) must not exceed cost_bases.mid ({})",
                    low,
                    mid
                );
            }
            if mid > high {
                anyhow::bail!(
                    "cost_bases.mid ({}) must not exceed cost_bases.high ({})",
                    mid,
                    high
                );
            }
        }

        if let Some(ref thresholds) = self.thresholds {
            let high = thresholds.high.unwrap_or(60.0);
            let very_high = thresholds.very_high.unwrap_or(70.0);
            let critical = thresholds.critical.unwrap_or(80.0);

            for (name, value) in [
                ("high", high),
                ("very_high", very_high),
                ("critical", critical),
            ] {
                if !(0.0..=100.0).contains(&value) {
                    anyhow::bail!(
                        "thresholds.{} must be within [0, 100] (got {})",
                        name,
                        value
                    );
                }
            }
            if high >= very_high {
                anyhow::bail!(
                    "thresholds.high ({}) must be less than thresholds.very_high ({})",
                    high,
                    very_high
                );
            }
            if very_high >= critical {
                anyhow::bail!(
                    "thresholds.very_high ({}) must be less than thresholds.critical ({})",
                    very_high,
                    critical
                );
            }
        }

        if let Some(floor) = self.high_risk_floor {
            if !(0.0..=100.0).contains(&floor) {
                anyhow::bail!("high_risk_floor must be within [0, 100] (got {})", floor);
            }
        }

        if let Some(ref dataset) = self.default_dataset {
            if DatasetId::parse(dataset).is_none() {
                anyhow::bail!(
                    "default_dataset must be one of 'uci', 'mimic' (got '{}')",
                    dataset
                );
            }
        }

        Ok(())
    }
}

/// Locate a config file under the given root, if any.
fn discover(root: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load a config file (explicit path or discovered), validate it, and merge
/// it with defaults. No file at all resolves to pure defaults.
pub fn load_and_resolve(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => discover(root),
    };

    let Some(path) = path else {
        return Ok(ResolvedConfig::default());
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: ReadmitConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config file: {}", path.display()))?;

    let defaults = ResolvedConfig::default();
    let bases = config
        .cost_bases
        .as_ref()
        .map(|b| CostBases {
            low: b.low.unwrap_or(defaults.bases.low),
            mid: b.mid.unwrap_or(defaults.bases.mid),
            high: b.high.unwrap_or(defaults.bases.high),
        })
        .unwrap_or(defaults.bases);
    let thresholds = config
        .thresholds
        .as_ref()
        .map(|t| TierThresholds {
            high: t.high.unwrap_or(defaults.thresholds.high),
            very_high: t.very_high.unwrap_or(defaults.thresholds.very_high),
            critical: t.critical.unwrap_or(defaults.thresholds.critical),
        })
        .unwrap_or(defaults.thresholds);
    let default_dataset = config
        .default_dataset
        .as_deref()
        .and_then(DatasetId::parse)
        .unwrap_or(defaults.default_dataset);

    Ok(ResolvedConfig {
        bases,
        thresholds,
        high_risk_floor: config.high_risk_floor.unwrap_or(defaults.high_risk_floor),
        limit: config.limit.or(defaults.limit),
        default_dataset,
        config_path: Some(path),
    })
}
