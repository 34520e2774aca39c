//! Succession plan compiler — point-in-time readiness summaries.
//!
//! A compiled plan is a frozen snapshot over a chosen set of critical
//! roles. Later changes to those roles never propagate back into it;
//! the only post-creation mutation is the draft -> in_review -> approved
//! status walk.

use crate::{
    clock::EngineClock,
    error::EngineResult,
    role_registry::CriticalRoleRecord,
    scoring::{ReadinessLevel, SuccessionRisk},
    store::{Collection, DocStore},
    types::{new_entity_id, CompanyId, EntityId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessionPlanStatus {
    Draft,
    InReview,
    Approved,
}

impl SuccessionPlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in_review",
            Self::Approved => "approved",
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessionPlanRecord {
    pub plan_id: EntityId,
    pub company_id: CompanyId,
    pub plan_name: String,
    /// The role ids actually included (requested ids that resolved).
    pub role_ids: Vec<EntityId>,
    pub rollup: PlanRollup,
    pub status: SuccessionPlanStatus,
    pub compiled_at: DateTime<Utc>,
    pub created_by: String,
    pub reviewed_by: Option<String>,
    pub approved_by: Option<String>,
}

/// The compiled numbers. Computed once at compile time, never refreshed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRollup {
    pub total_critical_roles: u32,
    /// Roles with at least one successor of any readiness.
    pub roles_with_successors: u32,
    /// Percentage of roles with a READY_NOW successor, rounded to an
    /// integer. 0 when the role set is empty.
    pub ready_now_coverage_pct: u32,
    /// Mean bench strength, rounded to one decimal place.
    pub average_bench_strength: f64,
    /// Roles at HIGH or CRITICAL succession risk.
    pub high_risk_roles: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilePlanInput {
    pub company_id: CompanyId,
    pub plan_name: String,
    pub role_ids: Vec<EntityId>,
}

// ── Pure rollup ──────────────────────────────────────────────────────────────

/// Roll a set of role records up into the plan numbers. Pure function;
/// the persisted derived fields on each role are trusted as-is.
pub fn compile(roles: &[CriticalRoleRecord]) -> PlanRollup {
    let total = roles.len() as u32;
    let roles_with_successors = roles
        .iter()
        .filter(|role| !role.successors.is_empty())
        .count() as u32;
    let roles_with_ready_now = roles
        .iter()
        .filter(|role| {
            role.successors
                .iter()
                .any(|s| s.readiness_level == ReadinessLevel::ReadyNow)
        })
        .count();
    let ready_now_coverage_pct = if total == 0 {
        0
    } else {
        (roles_with_ready_now as f64 / f64::from(total) * 100.0).round() as u32
    };
    let average_bench_strength = if total == 0 {
        0.0
    } else {
        let bench_sum: u32 = roles.iter().map(|role| role.bench_strength).sum();
        (f64::from(bench_sum) / f64::from(total) * 10.0).round() / 10.0
    };
    let high_risk_roles = roles
        .iter()
        .filter(|role| {
            matches!(
                role.succession_risk,
                SuccessionRisk::High | SuccessionRisk::Critical
            )
        })
        .count() as u32;

    PlanRollup {
        total_critical_roles: total,
        roles_with_successors,
        ready_now_coverage_pct,
        average_bench_strength,
        high_risk_roles,
    }
}

// ── Service ──────────────────────────────────────────────────────────────────

pub struct SuccessionPlanCompiler {
    clock: EngineClock,
}

impl SuccessionPlanCompiler {
    pub fn new(clock: EngineClock) -> Self {
        Self { clock }
    }

    /// Resolve the requested role ids and persist the compiled summary
    /// as a new, independently versioned document. Ids that do not
    /// resolve, or that belong to another company, are silently absent
    /// from the compiled set. All ids are resolved inside one read
    /// transaction, so the rollup freezes a single instant's state even
    /// when roles are being edited concurrently.
    pub fn compile_succession_plan(
        &self,
        store: &DocStore,
        input: CompilePlanInput,
        actor: &str,
    ) -> EngineResult<SuccessionPlanRecord> {
        let roles = store.snapshot_read(|store| {
            let mut roles: Vec<CriticalRoleRecord> = Vec::with_capacity(input.role_ids.len());
            for role_id in &input.role_ids {
                if let Some(role) = store
                    .try_fetch_document::<CriticalRoleRecord>(Collection::CriticalRoles, role_id)?
                {
                    if role.company_id == input.company_id {
                        roles.push(role);
                    }
                }
            }
            Ok(roles)
        })?;
        if roles.len() < input.role_ids.len() {
            log::debug!(
                "compiler: {} of {} requested roles resolved for '{}'",
                roles.len(),
                input.role_ids.len(),
                input.plan_name
            );
        }

        let plan = SuccessionPlanRecord {
            plan_id: new_entity_id("succplan"),
            company_id: input.company_id,
            plan_name: input.plan_name,
            role_ids: roles.iter().map(|role| role.role_id.clone()).collect(),
            rollup: compile(&roles),
            status: SuccessionPlanStatus::Draft,
            compiled_at: self.clock.now(),
            created_by: actor.to_string(),
            reviewed_by: None,
            approved_by: None,
        };
        store.insert_document(
            Collection::SuccessionPlans,
            &plan.company_id,
            &plan.plan_id,
            &plan,
        )?;
        log::info!(
            "compiler: compiled plan '{}' ({}): {} roles, coverage {}%, {} high risk",
            plan.plan_name,
            plan.plan_id,
            plan.rollup.total_critical_roles,
            plan.rollup.ready_now_coverage_pct,
            plan.rollup.high_risk_roles
        );
        Ok(plan)
    }

    pub fn get_succession_plan(
        &self,
        store: &DocStore,
        plan_id: &str,
    ) -> EngineResult<SuccessionPlanRecord> {
        store.fetch_document(Collection::SuccessionPlans, plan_id)
    }

    /// Move the plan through its review workflow, stamping who moved it.
    /// Sending a plan backwards clears the stamps of the abandoned pass,
    /// so `reviewed_by`/`approved_by` never outlive the status they
    /// describe. The rollup itself stays frozen.
    pub fn update_plan_status(
        &self,
        store: &DocStore,
        plan_id: &str,
        status: SuccessionPlanStatus,
        actor: &str,
    ) -> EngineResult<SuccessionPlanRecord> {
        let updated = store.update_document(
            Collection::SuccessionPlans,
            plan_id,
            |plan: &mut SuccessionPlanRecord| {
                plan.status = status;
                match status {
                    SuccessionPlanStatus::Draft => {
                        plan.reviewed_by = None;
                        plan.approved_by = None;
                    }
                    SuccessionPlanStatus::InReview => {
                        plan.reviewed_by = Some(actor.to_string());
                        plan.approved_by = None;
                    }
                    SuccessionPlanStatus::Approved => plan.approved_by = Some(actor.to_string()),
                }
                Ok(())
            },
        )?;
        log::info!(
            "compiler: plan '{plan_id}' moved to {}",
            updated.status.as_str()
        );
        Ok(updated)
    }

    pub fn list_succession_plans(
        &self,
        store: &DocStore,
        company_id: &str,
    ) -> EngineResult<Vec<SuccessionPlanRecord>> {
        store.query_documents(Collection::SuccessionPlans, company_id, &[])
    }
}
