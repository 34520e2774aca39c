//! Development plan tracker — remediation plans closing readiness gaps.
//!
//! This service:
//!   1. Creates plans with sequentially numbered actions
//!   2. Rolls action-level progress up into plan progress and status
//!   3. Stamps action completion times on the transition into completed
//!   4. Allows manual activation and hard deletion of plans

use crate::{
    clock::EngineClock,
    error::{EngineError, EngineResult},
    store::{Collection, DocStore, FieldFilter},
    types::{CompanyId, EmployeeId, EntityId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Draft,
    Active,
    Completed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentPlanRecord {
    pub plan_id: EntityId,
    pub company_id: CompanyId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    /// The critical role this plan develops the employee toward.
    pub target_role_id: EntityId,
    pub actions: Vec<DevelopmentAction>,
    /// Rounded mean over all actions; 0 for an action-less plan.
    pub overall_progress: u32,
    pub status: PlanStatus,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentAction {
    /// Sequential within the plan: act-1, act-2, …
    pub action_id: String,
    pub action_type: String,
    pub title: String,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: ActionStatus,
    pub progress: u32,
    pub resources: Vec<String>,
    pub cost: Option<f64>,
    pub expected_outcome: String,
    pub actual_outcome: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanInput {
    pub company_id: CompanyId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub target_role_id: EntityId,
    pub actions: Vec<ActionInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionInput {
    pub action_type: String,
    pub title: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    pub expected_outcome: String,
}

// ── Service ──────────────────────────────────────────────────────────────────

pub struct DevelopmentTracker {
    clock: EngineClock,
}

impl DevelopmentTracker {
    pub fn new(clock: EngineClock) -> Self {
        Self { clock }
    }

    /// Create a plan in draft. All actions start planned at 0 progress.
    pub fn create_development_plan(
        &self,
        store: &DocStore,
        input: CreatePlanInput,
        actor: &str,
    ) -> EngineResult<DevelopmentPlanRecord> {
        let actions: Vec<DevelopmentAction> = input
            .actions
            .iter()
            .enumerate()
            .map(|(i, a)| DevelopmentAction {
                action_id: format!("act-{}", i + 1),
                action_type: a.action_type.clone(),
                title: a.title.clone(),
                start_date: a.start_date,
                due_date: a.due_date,
                status: ActionStatus::Planned,
                progress: 0,
                resources: a.resources.clone(),
                cost: a.cost,
                expected_outcome: a.expected_outcome.clone(),
                actual_outcome: None,
                completed_at: None,
            })
            .collect();
        let mut plan = DevelopmentPlanRecord {
            plan_id: crate::types::new_entity_id("devplan"),
            company_id: input.company_id,
            employee_id: input.employee_id,
            employee_name: input.employee_name,
            target_role_id: input.target_role_id,
            actions,
            overall_progress: 0,
            status: PlanStatus::Draft,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        };
        plan.overall_progress = overall_progress(&plan.actions);
        store.insert_document(
            Collection::DevelopmentPlans,
            &plan.company_id,
            &plan.plan_id,
            &plan,
        )?;
        log::info!(
            "tracker: created plan '{}' for employee '{}' with {} actions",
            plan.plan_id,
            plan.employee_id,
            plan.actions.len()
        );
        Ok(plan)
    }

    pub fn get_development_plan(
        &self,
        store: &DocStore,
        plan_id: &str,
    ) -> EngineResult<DevelopmentPlanRecord> {
        store.fetch_document(Collection::DevelopmentPlans, plan_id)
    }

    /// Update one action, then roll the whole plan up again: overall
    /// progress is the mean over ALL actions, and plan status follows
    /// the action states (all completed -> completed, any in progress ->
    /// active, otherwise unchanged).
    pub fn update_action_progress(
        &self,
        store: &DocStore,
        plan_id: &str,
        action_id: &str,
        progress: u32,
        status: Option<ActionStatus>,
        actual_outcome: Option<String>,
        actor: &str,
    ) -> EngineResult<DevelopmentPlanRecord> {
        let now = self.clock.now();
        let updated = store.update_document(
            Collection::DevelopmentPlans,
            plan_id,
            |plan: &mut DevelopmentPlanRecord| {
                let action = plan
                    .actions
                    .iter_mut()
                    .find(|a| a.action_id == action_id)
                    .ok_or_else(|| EngineError::NotFound {
                        entity: "development action",
                        id: action_id.to_string(),
                    })?;
                action.progress = progress;
                if let Some(new_status) = status {
                    let was_completed = action.status == ActionStatus::Completed;
                    action.status = new_status;
                    if new_status == ActionStatus::Completed && !was_completed {
                        action.completed_at = Some(now);
                    } else if new_status != ActionStatus::Completed {
                        action.completed_at = None;
                    }
                }
                if let Some(outcome) = &actual_outcome {
                    action.actual_outcome = Some(outcome.clone());
                }
                plan.overall_progress = overall_progress(&plan.actions);
                plan.status = derive_status(plan.status, &plan.actions);
                plan.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "tracker: plan '{plan_id}' action '{action_id}' at {progress}%, plan {}% ({})",
            updated.overall_progress,
            updated.status.as_str()
        );
        Ok(updated)
    }

    /// Manual promotion to active, independent of action state.
    pub fn activate_plan(
        &self,
        store: &DocStore,
        plan_id: &str,
        actor: &str,
    ) -> EngineResult<DevelopmentPlanRecord> {
        let updated = store.update_document(
            Collection::DevelopmentPlans,
            plan_id,
            |plan: &mut DevelopmentPlanRecord| {
                plan.status = PlanStatus::Active;
                plan.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!("tracker: plan '{plan_id}' activated");
        Ok(updated)
    }

    pub fn list_development_plans(
        &self,
        store: &DocStore,
        company_id: &str,
        employee_id: Option<&str>,
    ) -> EngineResult<Vec<DevelopmentPlanRecord>> {
        let mut filters: Vec<FieldFilter> = Vec::new();
        if let Some(employee) = employee_id {
            filters.push(FieldFilter::eq("employee_id", employee));
        }
        store.query_documents(Collection::DevelopmentPlans, company_id, &filters)
    }

    /// Plans are hard-deleted, unlike critical roles: a plan is working
    /// state, not organizational history.
    pub fn delete_development_plan(&self, store: &DocStore, plan_id: &str) -> EngineResult<()> {
        store.delete_document(Collection::DevelopmentPlans, plan_id)?;
        log::info!("tracker: deleted plan '{plan_id}'");
        Ok(())
    }
}

/// Mean progress over all actions, rounded. An action-less plan is
/// defined as 0 rather than the mean-of-empty-set NaN.
fn overall_progress(actions: &[DevelopmentAction]) -> u32 {
    if actions.is_empty() {
        return 0;
    }
    let sum: u32 = actions.iter().map(|a| a.progress).sum();
    (f64::from(sum) / actions.len() as f64).round() as u32
}

/// All actions completed -> completed. Any in progress -> active.
/// Otherwise the plan keeps whatever status it already had. The empty
/// guard keeps a freshly created action-less plan in draft.
fn derive_status(previous: PlanStatus, actions: &[DevelopmentAction]) -> PlanStatus {
    if !actions.is_empty()
        && actions
            .iter()
            .all(|a| a.status == ActionStatus::Completed)
    {
        PlanStatus::Completed
    } else if actions.iter().any(|a| a.status == ActionStatus::InProgress) {
        PlanStatus::Active
    } else {
        previous
    }
}
