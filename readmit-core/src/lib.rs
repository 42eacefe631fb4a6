//! Readmit core library - readmission risk tiers, cost exposure, and cohort aggregation

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Risk scoring happens upstream; this crate only derives display
//   aggregates from precomputed scores
// - Records are immutable after load; all derived values are freshly
//   allocated, never stored
// - No global mutable state, no randomness, no threads, no async
// - Identical input yields byte-for-byte identical output

pub mod aggregate;
pub mod config;
pub mod cost;
pub mod export;
pub mod format;
pub mod geo;
pub mod query;
pub mod record;
pub mod render;
pub mod store;
pub mod tier;

pub use aggregate::{summarize, summarize_with_thresholds, SummaryAggregate, TierCounts};
pub use config::{load_and_resolve, ReadmitConfig, ResolvedConfig};
pub use cost::{cost_range, total_cost_range, CostBases, CostRange};
pub use geo::{Geography, Hospital, NationalBenchmarks, StateData, StateSort};
pub use query::{high_risk_worklist, MemberQuery, SortField, SortOrder};
pub use record::{DatasetId, ModelArtifact, RiskRecord};
pub use store::{Dataset, DatasetStore};
pub use tier::{AgeBand, DistributionBand, HighRiskBand, TierThresholds, WorklistTier};
