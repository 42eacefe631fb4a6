//! Risk tier classification
//!
//! Two independent binning schemes over [0, 100]: the 3-tier worklist
//! classification (plus an explicit `Routine` floor so the scheme partitions
//! the whole range), and 20-point distribution bands for population
//! histograms. They do not nest and must not be conflated.
//!
//! All bins are half-open on the lower bound; only the global maximum (100)
//! is upper-inclusive. Every valid score lands in exactly one bin per
//! scheme.

use crate::cost::clamp_score;
use serde::{Deserialize, Serialize};

/// Worklist tier thresholds (lower bounds). Fixed configuration, not
/// learned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TierThresholds {
    pub high: f64,
    pub very_high: f64,
    pub critical: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            high: 60.0,
            very_high: 70.0,
            critical: 80.0,
        }
    }
}

/// Outreach-priority tier for the care worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorklistTier {
    /// Below the high-risk floor; not part of the outreach worklist.
    Routine, // [0, 60)
    High,     // [60, 70)
    VeryHigh, // [70, 80)
    Critical, // [80, 100]
}

impl WorklistTier {
    pub fn of(risk_score: f64) -> WorklistTier {
        WorklistTier::with_thresholds(risk_score, &TierThresholds::default())
    }

    pub fn with_thresholds(risk_score: f64, thresholds: &TierThresholds) -> WorklistTier {
        let score = clamp_score(risk_score);
        if score >= thresholds.critical {
            WorklistTier::Critical
        } else if score >= thresholds.very_high {
            WorklistTier::VeryHigh
        } else if score >= thresholds.high {
            WorklistTier::High
        } else {
            WorklistTier::Routine
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorklistTier::Routine => "routine",
            WorklistTier::High => "high",
            WorklistTier::VeryHigh => "very-high",
            WorklistTier::Critical => "critical",
        }
    }

    /// Display label used in the per-tier cost table.
    pub fn label(&self) -> &'static str {
        match self {
            WorklistTier::Routine => "Routine (<60%)",
            WorklistTier::High => "High (60-70%)",
            WorklistTier::VeryHigh => "Very High (70-80%)",
            WorklistTier::Critical => "Critical (80%+)",
        }
    }
}

/// 20-point population distribution band. Independent of the worklist
/// tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionBand {
    #[serde(rename = "0-20%")]
    UpTo20, // [0, 20)
    #[serde(rename = "20-40%")]
    UpTo40, // [20, 40)
    #[serde(rename = "40-60%")]
    UpTo60, // [40, 60)
    #[serde(rename = "60-80%")]
    UpTo80, // [60, 80)
    #[serde(rename = "80-100%")]
    UpTo100, // [80, 100]
}

impl DistributionBand {
    pub const ALL: [DistributionBand; 5] = [
        DistributionBand::UpTo20,
        DistributionBand::UpTo40,
        DistributionBand::UpTo60,
        DistributionBand::UpTo80,
        DistributionBand::UpTo100,
    ];

    pub fn of(risk_score: f64) -> DistributionBand {
        let score = clamp_score(risk_score);
        // Integer division keeps the lower bound half-open; 100 folds into
        // the top band.
        let index = ((score / 20.0).floor() as usize).min(4);
        DistributionBand::ALL[index]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionBand::UpTo20 => "0-20%",
            DistributionBand::UpTo40 => "20-40%",
            DistributionBand::UpTo60 => "40-60%",
            DistributionBand::UpTo80 => "60-80%",
            DistributionBand::UpTo100 => "80-100%",
        }
    }
}

/// 10-point detail band over the high-risk population (score >= 60).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighRiskBand {
    #[serde(rename = "60-70%")]
    UpTo70, // [60, 70)
    #[serde(rename = "70-80%")]
    UpTo80, // [70, 80)
    #[serde(rename = "80-90%")]
    UpTo90, // [80, 90)
    #[serde(rename = "90-100%")]
    UpTo100, // [90, 100]
}

impl HighRiskBand {
    pub const ALL: [HighRiskBand; 4] = [
        HighRiskBand::UpTo70,
        HighRiskBand::UpTo80,
        HighRiskBand::UpTo90,
        HighRiskBand::UpTo100,
    ];

    /// None for scores below the default high-risk floor of 60.
    pub fn of(risk_score: f64) -> Option<HighRiskBand> {
        HighRiskBand::with_floor(risk_score, 60.0)
    }

    /// None for scores below `floor`. A floor below 60 widens the bottom
    /// band: everything in `[floor, 70)` lands in it; a floor above 60
    /// narrows it. The decade edges at 70/80/90 never move.
    pub fn with_floor(risk_score: f64, floor: f64) -> Option<HighRiskBand> {
        let score = clamp_score(risk_score);
        if score < floor {
            return None;
        }
        let index = (((score - 60.0) / 10.0).floor().max(0.0) as usize).min(3);
        Some(HighRiskBand::ALL[index])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HighRiskBand::UpTo70 => "60-70%",
            HighRiskBand::UpTo80 => "70-80%",
            HighRiskBand::UpTo90 => "80-90%",
            HighRiskBand::UpTo100 => "90-100%",
        }
    }
}

/// Age cohort used for mean-risk-by-age reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "Under 30")]
    Under30, // [0, 30)
    #[serde(rename = "30-49")]
    Thirties, // [30, 50)
    #[serde(rename = "50-69")]
    Fifties, // [50, 70)
    #[serde(rename = "70+")]
    SeventyPlus, // [70, ..)
}

impl AgeBand {
    pub const ALL: [AgeBand; 4] = [
        AgeBand::Under30,
        AgeBand::Thirties,
        AgeBand::Fifties,
        AgeBand::SeventyPlus,
    ];

    pub fn of(age: u32) -> AgeBand {
        if age < 30 {
            AgeBand::Under30
        } else if age < 50 {
            AgeBand::Thirties
        } else if age < 70 {
            AgeBand::Fifties
        } else {
            AgeBand::SeventyPlus
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::Under30 => "Under 30",
            AgeBand::Thirties => "30-49",
            AgeBand::Fifties => "50-69",
            AgeBand::SeventyPlus => "70+",
        }
    }
}
