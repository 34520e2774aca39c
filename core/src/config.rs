//! Engine configuration: the tunable constants behind derived fields.
//!
//! Defaults carry the canonical values; deployments that want different
//! review cadences or health thresholds load overrides from JSON.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub review: ReviewConfig,
    pub plan_health: PlanHealthConfig,
    pub criticality_bands: CriticalityBands,
}

/// Review cadence for newly created critical roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Days until a new critical role's first scheduled review.
    pub role_review_days: i64,
}

/// Development plan health bucketing, applied to active plans only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanHealthConfig {
    /// A plan with overall progress at or above this is on track.
    pub on_track_min_progress: u32,
    /// A plan with overall progress strictly below this is at risk.
    pub at_risk_max_progress: u32,
}

/// Criticality score bands for the queryable criticality level.
/// Band floors are inclusive; anything below `medium_min` is low.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalityBands {
    pub critical_min: u32,
    pub high_min: u32,
    pub medium_min: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            review: ReviewConfig::default(),
            plan_health: PlanHealthConfig::default(),
            criticality_bands: CriticalityBands::default(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            role_review_days: 90,
        }
    }
}

impl Default for PlanHealthConfig {
    fn default() -> Self {
        Self {
            on_track_min_progress: 70,
            at_risk_max_progress: 30,
        }
    }
}

impl Default for CriticalityBands {
    fn default() -> Self {
        Self {
            critical_min: 80,
            high_min: 60,
            medium_min: 40,
        }
    }
}

impl EngineConfig {
    /// Parse a config override from a JSON string. Missing fields fall
    /// back to the defaults above.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a config override from a JSON file.
    /// In tests, use `EngineConfig::default()` or `from_json`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_json(&content)?)
    }
}
