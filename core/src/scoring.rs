//! Scoring library: every derived talent metric in one place.
//!
//! Pure functions only. No store access, no clock, no state. Each
//! mutating service recomputes its derived fields by calling into this
//! module, so a score can never drift between call sites:
//!   1. Criticality score from weighted factor lists
//!   2. Readiness score from assessment dimensions
//!   3. Nine-box category from performance x potential
//!   4. Succession risk from the cascade rule
//!   5. Bench strength (immediately deployable successors)
//!   6. Criticality banding for queryable role lists

use crate::config::CriticalityBands;
use serde::{Deserialize, Serialize};

// ── Label sets ───────────────────────────────────────────────────────────────

/// Time-to-ready classification for a successor candidate.
/// Wire labels are fixed; downstream dashboards match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadinessLevel {
    #[serde(rename = "READY_NOW")]
    ReadyNow,
    #[serde(rename = "READY_1_YEAR")]
    Ready1Year,
    #[serde(rename = "READY_2_3_YEARS")]
    Ready2To3Years,
    #[serde(rename = "NOT_READY")]
    NotReady,
}

impl ReadinessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadyNow => "READY_NOW",
            Self::Ready1Year => "READY_1_YEAR",
            Self::Ready2To3Years => "READY_2_3_YEARS",
            Self::NotReady => "NOT_READY",
        }
    }
}

/// Succession risk grade for a critical role, derived from the best
/// available successor readiness. Never set directly by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuccessionRisk {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "CRITICAL")]
    Critical,
}

impl SuccessionRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// The 3x3 performance x potential grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NineBoxCategory {
    Star,
    HighPerformer,
    SolidPerformer,
    HighPotential,
    CorePlayer,
    SolidContributor,
    RoughDiamond,
    InconsistentPlayer,
    Risk,
}

impl NineBoxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::HighPerformer => "high_performer",
            Self::SolidPerformer => "solid_performer",
            Self::HighPotential => "high_potential",
            Self::CorePlayer => "core_player",
            Self::SolidContributor => "solid_contributor",
            Self::RoughDiamond => "rough_diamond",
            Self::InconsistentPlayer => "inconsistent_player",
            Self::Risk => "risk",
        }
    }
}

/// Queryable banding of the criticality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl CriticalityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ── Inputs ───────────────────────────────────────────────────────────────────

/// One weighted criticality factor, e.g. ("revenue_impact", 4.0, 30.0).
/// Weights conventionally sum to 100; the engine does not enforce that,
/// it only clamps the final score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalityFactor {
    pub factor: String,
    /// Factor score, 0-5.
    pub score: f64,
    /// Factor weight, 0-100.
    pub weight: f64,
}

/// Successor readiness assessment: six mandatory dimensions (0-100)
/// plus an optional regional-knowledge dimension for candidates whose
/// target role spans regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub leadership: f64,
    pub technical: f64,
    pub strategic_thinking: f64,
    pub communication: f64,
    pub cultural_fit: f64,
    pub experience: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_knowledge: Option<f64>,
}

// ── Scoring functions ────────────────────────────────────────────────────────

/// Criticality score in [0,100]: `round(sum(score * weight / 100) * 20)`.
///
/// Accepts any factor list length and never validates the weight sum;
/// weights that do not sum to 100 are a caller error. The final score is
/// clamped so a bad weight sum cannot leak an out-of-band value into
/// queries and rollups.
pub fn criticality_score(factors: &[CriticalityFactor]) -> u32 {
    let weighted: f64 = factors.iter().map(|f| f.score * f.weight / 100.0).sum();
    (weighted * 20.0).round().clamp(0.0, 100.0) as u32
}

/// Readiness score in [0,100]: rounded mean over the dimensions present
/// (six mandatory, seven when regional knowledge is assessed).
pub fn readiness_score(assessment: &ReadinessAssessment) -> u32 {
    let mut sum = assessment.leadership
        + assessment.technical
        + assessment.strategic_thinking
        + assessment.communication
        + assessment.cultural_fit
        + assessment.experience;
    let mut count = 6.0;
    if let Some(regional) = assessment.regional_knowledge {
        sum += regional;
        count += 1.0;
    }
    (sum / count).round() as u32
}

/// Nine-box classification from a 1-5 performance rating and a caller
/// supplied potential tier string ("high" / "medium" / "low", any case).
///
/// Tier vocabularies come from upstream assessment tools, so an unmapped
/// tier classifies as `CorePlayer` rather than erroring.
pub fn nine_box_category(performance_rating: f64, potential_tier: &str) -> NineBoxCategory {
    let performance = if performance_rating >= 4.0 {
        "high"
    } else if performance_rating >= 3.0 {
        "medium"
    } else {
        "low"
    };

    match (performance, potential_tier.to_lowercase().as_str()) {
        ("high", "high") => NineBoxCategory::Star,
        ("high", "medium") => NineBoxCategory::HighPerformer,
        ("high", "low") => NineBoxCategory::SolidPerformer,
        ("medium", "high") => NineBoxCategory::HighPotential,
        ("medium", "medium") => NineBoxCategory::CorePlayer,
        ("medium", "low") => NineBoxCategory::SolidContributor,
        ("low", "high") => NineBoxCategory::RoughDiamond,
        ("low", "medium") => NineBoxCategory::InconsistentPlayer,
        ("low", "low") => NineBoxCategory::Risk,
        _ => NineBoxCategory::CorePlayer,
    }
}

/// The risk cascade rule. Pure function of the successor readiness
/// levels, in precedence order:
///   1. any READY_NOW            -> LOW
///   2. else any READY_1_YEAR    -> MEDIUM
///   3. else a non-empty list    -> HIGH
///   4. else                     -> CRITICAL
pub fn succession_risk(levels: impl IntoIterator<Item = ReadinessLevel>) -> SuccessionRisk {
    let mut any = false;
    let mut ready_now = false;
    let mut ready_1_year = false;
    for level in levels {
        any = true;
        match level {
            ReadinessLevel::ReadyNow => ready_now = true,
            ReadinessLevel::Ready1Year => ready_1_year = true,
            _ => {}
        }
    }
    if ready_now {
        SuccessionRisk::Low
    } else if ready_1_year {
        SuccessionRisk::Medium
    } else if any {
        SuccessionRisk::High
    } else {
        SuccessionRisk::Critical
    }
}

/// Bench strength: how many successors are deployable today.
pub fn bench_strength(levels: impl IntoIterator<Item = ReadinessLevel>) -> u32 {
    levels
        .into_iter()
        .filter(|level| *level == ReadinessLevel::ReadyNow)
        .count() as u32
}

/// Band a criticality score into the queryable criticality level.
pub fn criticality_level(score: u32, bands: &CriticalityBands) -> CriticalityLevel {
    if score >= bands.critical_min {
        CriticalityLevel::Critical
    } else if score >= bands.high_min {
        CriticalityLevel::High
    } else if score >= bands.medium_min {
        CriticalityLevel::Medium
    } else {
        CriticalityLevel::Low
    }
}
