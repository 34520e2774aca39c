//! Analytics aggregator — company-wide pipeline health at a glance.
//!
//! Read-only. Every number is a pure function of the current role and
//! plan population; nothing is persisted. The whole aggregation runs
//! inside one store read snapshot and consumes both collections through
//! the store's paged scan, so memory stays flat however large the
//! company is.

use crate::{
    clock::EngineClock,
    config::{EngineConfig, PlanHealthConfig},
    development_tracker::{DevelopmentPlanRecord, PlanStatus},
    error::EngineResult,
    role_registry::CriticalRoleRecord,
    scoring::{NineBoxCategory, ReadinessLevel, SuccessionRisk},
    store::{Collection, DocStore, FieldFilter},
    types::CompanyId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessionAnalytics {
    pub company_id: CompanyId,
    pub generated_at: DateTime<Utc>,
    /// Active critical roles only; deactivated roles are history.
    pub total_critical_roles: u32,
    pub roles_with_ready_now: u32,
    /// Share of roles with a READY_NOW successor, one decimal place.
    pub ready_now_coverage_pct: f64,
    pub risk_distribution: RiskDistribution,
    /// Nine-box spread over every successor across every role.
    pub talent_distribution: TalentDistribution,
    pub readiness_distribution: ReadinessDistribution,
    pub plan_health: PlanHealth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentDistribution {
    pub star: u32,
    pub high_performer: u32,
    pub solid_performer: u32,
    pub high_potential: u32,
    pub core_player: u32,
    pub solid_contributor: u32,
    pub rough_diamond: u32,
    pub inconsistent_player: u32,
    pub risk: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessDistribution {
    pub ready_now: u32,
    pub ready_1_year: u32,
    pub ready_2_3_years: u32,
    pub not_ready: u32,
}

/// Development plan health. On-track and at-risk are judged over active
/// plans only; drafts and completed plans are neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanHealth {
    pub total_plans: u32,
    pub active_plans: u32,
    pub on_track: u32,
    pub at_risk: u32,
}

pub struct AnalyticsAggregator {
    clock: EngineClock,
    health: PlanHealthConfig,
}

impl AnalyticsAggregator {
    pub fn new(config: &EngineConfig, clock: EngineClock) -> Self {
        Self {
            clock,
            health: config.plan_health.clone(),
        }
    }

    pub fn aggregate(
        &self,
        store: &DocStore,
        company_id: &str,
    ) -> EngineResult<SuccessionAnalytics> {
        let analytics = store.snapshot_read(|store| {
            let mut total_roles = 0u32;
            let mut roles_with_ready_now = 0u32;
            let mut risk = RiskDistribution::default();
            let mut talent = TalentDistribution::default();
            let mut readiness = ReadinessDistribution::default();

            let active_only = [FieldFilter::eq("is_active", true)];
            store.scan_documents(
                Collection::CriticalRoles,
                company_id,
                &active_only,
                |role: CriticalRoleRecord| {
                    total_roles += 1;
                    match role.succession_risk {
                        SuccessionRisk::Low => risk.low += 1,
                        SuccessionRisk::Medium => risk.medium += 1,
                        SuccessionRisk::High => risk.high += 1,
                        SuccessionRisk::Critical => risk.critical += 1,
                    }
                    if role
                        .successors
                        .iter()
                        .any(|s| s.readiness_level == ReadinessLevel::ReadyNow)
                    {
                        roles_with_ready_now += 1;
                    }
                    for successor in &role.successors {
                        match successor.nine_box_category {
                            NineBoxCategory::Star => talent.star += 1,
                            NineBoxCategory::HighPerformer => talent.high_performer += 1,
                            NineBoxCategory::SolidPerformer => talent.solid_performer += 1,
                            NineBoxCategory::HighPotential => talent.high_potential += 1,
                            NineBoxCategory::CorePlayer => talent.core_player += 1,
                            NineBoxCategory::SolidContributor => talent.solid_contributor += 1,
                            NineBoxCategory::RoughDiamond => talent.rough_diamond += 1,
                            NineBoxCategory::InconsistentPlayer => talent.inconsistent_player += 1,
                            NineBoxCategory::Risk => talent.risk += 1,
                        }
                        match successor.readiness_level {
                            ReadinessLevel::ReadyNow => readiness.ready_now += 1,
                            ReadinessLevel::Ready1Year => readiness.ready_1_year += 1,
                            ReadinessLevel::Ready2To3Years => readiness.ready_2_3_years += 1,
                            ReadinessLevel::NotReady => readiness.not_ready += 1,
                        }
                    }
                    Ok(())
                },
            )?;

            let mut plan_health = PlanHealth::default();
            store.scan_documents(
                Collection::DevelopmentPlans,
                company_id,
                &[],
                |plan: DevelopmentPlanRecord| {
                    plan_health.total_plans += 1;
                    if plan.status == PlanStatus::Active {
                        plan_health.active_plans += 1;
                        if plan.overall_progress >= self.health.on_track_min_progress {
                            plan_health.on_track += 1;
                        }
                        if plan.overall_progress < self.health.at_risk_max_progress {
                            plan_health.at_risk += 1;
                        }
                    }
                    Ok(())
                },
            )?;

            let ready_now_coverage_pct = if total_roles == 0 {
                0.0
            } else {
                (f64::from(roles_with_ready_now) / f64::from(total_roles) * 1000.0).round() / 10.0
            };

            Ok(SuccessionAnalytics {
                company_id: company_id.to_string(),
                generated_at: self.clock.now(),
                total_critical_roles: total_roles,
                roles_with_ready_now,
                ready_now_coverage_pct,
                risk_distribution: risk,
                talent_distribution: talent,
                readiness_distribution: readiness,
                plan_health,
            })
        })?;

        log::info!(
            "analytics: company '{company_id}' coverage={:.1}% over {} roles, {} plans",
            analytics.ready_now_coverage_pct,
            analytics.total_critical_roles,
            analytics.plan_health.total_plans
        );
        Ok(analytics)
    }
}
