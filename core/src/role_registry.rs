//! Critical role registry — roles whose vacancy threatens operations.
//!
//! This service:
//!   1. Creates and updates critical role records
//!   2. Manages the embedded, rank-ordered successor bench per role
//!   3. Re-derives score, level, risk, and bench strength on every mutation
//!   4. Soft-deletes roles via `is_active` so history is never lost
//!
//! Every mutation is a read-modify-write through the store's
//! compare-and-set loop, and every mutation funnels through one
//! `rederive` path, so the persisted derived fields can never drift
//! from the base fields no matter which operation wrote last.

use crate::{
    clock::EngineClock,
    config::{CriticalityBands, EngineConfig},
    error::{EngineError, EngineResult},
    scoring::{
        self, CriticalityFactor, CriticalityLevel, NineBoxCategory, ReadinessAssessment,
        ReadinessLevel, SuccessionRisk,
    },
    store::{Collection, DocStore, FieldFilter},
    types::{new_entity_id, CompanyId, EmployeeId, EntityId},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalRoleRecord {
    pub role_id: EntityId,
    pub company_id: CompanyId,
    pub position_id: String,
    pub position_title: String,
    pub department: String,
    pub criticality_factors: Vec<CriticalityFactor>,
    // Derived fields, owned by `rederive`
    pub criticality_score: u32,
    pub criticality_level: CriticalityLevel,
    pub succession_risk: SuccessionRisk,
    pub bench_strength: u32,
    /// Sorted by rank ascending; equal ranks keep insertion order.
    pub successors: Vec<SuccessorCandidate>,
    pub is_active: bool,
    pub next_review_date: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

/// A successor candidate lives only inside its role's successor list;
/// it is never a top-level document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessorCandidate {
    pub candidate_id: EntityId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub current_position: String,
    pub current_department: String,
    pub readiness_level: ReadinessLevel,
    pub readiness_assessment: ReadinessAssessment,
    pub readiness_score: u32,
    /// Performance rating on the caller's 1-5 review scale.
    pub performance_rating: f64,
    /// Potential tier string from the caller's assessment tool.
    pub potential_rating: String,
    pub nine_box_category: NineBoxCategory,
    pub competency_gaps: Vec<CompetencyGap>,
    /// Caller-assigned ordering among successors for the same role.
    pub rank: u32,
    pub assessed_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyGap {
    pub competency: String,
    pub required_level: u32,
    pub current_level: u32,
    /// required - current; negative means the candidate already exceeds.
    pub gap_size: i32,
    pub development_actions: Vec<String>,
}

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoleInput {
    pub company_id: CompanyId,
    pub position_id: String,
    pub position_title: String,
    pub department: String,
    pub criticality_factors: Vec<CriticalityFactor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessorInput {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub current_position: String,
    pub current_department: String,
    pub readiness_level: ReadinessLevel,
    pub readiness_assessment: ReadinessAssessment,
    pub performance_rating: f64,
    pub potential_rating: String,
    #[serde(default)]
    pub competency_gaps: Vec<CompetencyGapInput>,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyGapInput {
    pub competency: String,
    pub required_level: u32,
    pub current_level: u32,
    #[serde(default)]
    pub development_actions: Vec<String>,
}

/// Partial update for a role. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub position_title: Option<String>,
    pub department: Option<String>,
    pub criticality_factors: Option<Vec<CriticalityFactor>>,
    pub next_review_date: Option<DateTime<Utc>>,
}

/// Partial update for a successor candidate. `None` fields are left
/// untouched; readiness score and nine-box category are re-derived from
/// whatever the merged fields end up being.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessorUpdate {
    pub employee_name: Option<String>,
    pub current_position: Option<String>,
    pub current_department: Option<String>,
    pub readiness_level: Option<ReadinessLevel>,
    pub readiness_assessment: Option<ReadinessAssessment>,
    pub performance_rating: Option<f64>,
    pub potential_rating: Option<String>,
    pub competency_gaps: Option<Vec<CompetencyGapInput>>,
    pub rank: Option<u32>,
}

/// Role list filters. Department, level, and risk are pushed into the
/// store query; `has_successors` is applied after fetch because it
/// depends on list length, not a stored scalar.
#[derive(Debug, Clone, Default)]
pub struct RoleFilters {
    pub department: Option<String>,
    pub criticality_level: Option<CriticalityLevel>,
    pub succession_risk: Option<SuccessionRisk>,
    pub has_successors: Option<bool>,
    /// Deactivated roles are hidden unless explicitly requested.
    pub include_inactive: bool,
}

// ── Service ──────────────────────────────────────────────────────────────────

pub struct RoleRegistry {
    clock: EngineClock,
    bands: CriticalityBands,
    review_days: i64,
}

impl RoleRegistry {
    pub fn new(config: &EngineConfig, clock: EngineClock) -> Self {
        Self {
            clock,
            bands: config.criticality_bands.clone(),
            review_days: config.review.role_review_days,
        }
    }

    /// Create a role with an empty bench. Risk starts at CRITICAL, which
    /// is exactly what the cascade rule yields for an empty successor
    /// list. First review is scheduled `role_review_days` out.
    pub fn create_critical_role(
        &self,
        store: &DocStore,
        input: CreateRoleInput,
        actor: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        let now = self.clock.now();
        let mut role = CriticalRoleRecord {
            role_id: new_entity_id("role"),
            company_id: input.company_id,
            position_id: input.position_id,
            position_title: input.position_title,
            department: input.department,
            criticality_factors: input.criticality_factors,
            criticality_score: 0,
            criticality_level: CriticalityLevel::Low,
            succession_risk: SuccessionRisk::Critical,
            bench_strength: 0,
            successors: Vec::new(),
            is_active: true,
            next_review_date: now + Duration::days(self.review_days),
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        };
        self.rederive(&mut role);
        store.insert_document(
            Collection::CriticalRoles,
            &role.company_id,
            &role.role_id,
            &role,
        )?;
        log::info!(
            "registry: created critical role '{}' ({}) score={} level={} risk={}",
            role.position_title,
            role.role_id,
            role.criticality_score,
            role.criticality_level.as_str(),
            role.succession_risk.as_str()
        );
        Ok(role)
    }

    pub fn get_critical_role(
        &self,
        store: &DocStore,
        role_id: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        store.fetch_document(Collection::CriticalRoles, role_id)
    }

    /// Append a successor candidate. At most one candidate per employee
    /// id; a second add for the same employee fails with
    /// `DuplicateSuccessor` instead of silently stacking assessments.
    pub fn add_successor(
        &self,
        store: &DocStore,
        role_id: &str,
        input: SuccessorInput,
        actor: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        // Minted once so a CAS retry re-inserts the same candidate id.
        let candidate_id = new_entity_id("cand");
        let updated = store.update_document(
            Collection::CriticalRoles,
            role_id,
            |role: &mut CriticalRoleRecord| {
                if role
                    .successors
                    .iter()
                    .any(|s| s.employee_id == input.employee_id)
                {
                    return Err(EngineError::DuplicateSuccessor {
                        role_id: role_id.to_string(),
                        employee_id: input.employee_id.clone(),
                    });
                }
                role.successors
                    .push(build_candidate(&candidate_id, &input, actor));
                self.rederive(role);
                role.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "registry: role '{role_id}' added successor '{}' rank={} risk={} bench={}",
            candidate_id,
            input.rank,
            updated.succession_risk.as_str(),
            updated.bench_strength
        );
        Ok(updated)
    }

    /// Merge partial updates onto one candidate, then re-derive the role.
    pub fn update_successor(
        &self,
        store: &DocStore,
        role_id: &str,
        successor_id: &str,
        updates: SuccessorUpdate,
        actor: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        let updated = store.update_document(
            Collection::CriticalRoles,
            role_id,
            |role: &mut CriticalRoleRecord| {
                let successor = role
                    .successors
                    .iter_mut()
                    .find(|s| s.candidate_id == successor_id)
                    .ok_or_else(|| EngineError::NotFound {
                        entity: "successor",
                        id: successor_id.to_string(),
                    })?;
                if let Some(name) = &updates.employee_name {
                    successor.employee_name = name.clone();
                }
                if let Some(position) = &updates.current_position {
                    successor.current_position = position.clone();
                }
                if let Some(department) = &updates.current_department {
                    successor.current_department = department.clone();
                }
                if let Some(level) = updates.readiness_level {
                    successor.readiness_level = level;
                }
                if let Some(assessment) = &updates.readiness_assessment {
                    successor.readiness_assessment = assessment.clone();
                }
                if let Some(rating) = updates.performance_rating {
                    successor.performance_rating = rating;
                }
                if let Some(tier) = &updates.potential_rating {
                    successor.potential_rating = tier.clone();
                }
                if let Some(gaps) = &updates.competency_gaps {
                    successor.competency_gaps = gaps.iter().map(build_gap).collect();
                }
                if let Some(rank) = updates.rank {
                    successor.rank = rank;
                }
                successor.assessed_by = actor.to_string();
                self.rederive(role);
                role.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "registry: role '{role_id}' updated successor '{successor_id}' risk={} bench={}",
            updated.succession_risk.as_str(),
            updated.bench_strength
        );
        Ok(updated)
    }

    /// Remove a candidate by id. Removing the last READY_NOW successor
    /// can jump risk straight from LOW to HIGH or CRITICAL; the drop is
    /// logged at warn level.
    pub fn remove_successor(
        &self,
        store: &DocStore,
        role_id: &str,
        successor_id: &str,
        actor: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        let updated = store.update_document(
            Collection::CriticalRoles,
            role_id,
            |role: &mut CriticalRoleRecord| {
                let before = role.successors.len();
                role.successors.retain(|s| s.candidate_id != successor_id);
                if role.successors.len() == before {
                    return Err(EngineError::NotFound {
                        entity: "successor",
                        id: successor_id.to_string(),
                    });
                }
                self.rederive(role);
                role.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        match updated.succession_risk {
            SuccessionRisk::High | SuccessionRisk::Critical => log::warn!(
                "registry: role '{role_id}' bench degraded after removing '{successor_id}', risk={}",
                updated.succession_risk.as_str()
            ),
            _ => log::info!(
                "registry: role '{role_id}' removed successor '{successor_id}', risk={}",
                updated.succession_risk.as_str()
            ),
        }
        Ok(updated)
    }

    pub fn update_critical_role(
        &self,
        store: &DocStore,
        role_id: &str,
        updates: RoleUpdate,
        actor: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        let updated = store.update_document(
            Collection::CriticalRoles,
            role_id,
            |role: &mut CriticalRoleRecord| {
                if let Some(title) = &updates.position_title {
                    role.position_title = title.clone();
                }
                if let Some(department) = &updates.department {
                    role.department = department.clone();
                }
                if let Some(factors) = &updates.criticality_factors {
                    role.criticality_factors = factors.clone();
                }
                if let Some(review) = updates.next_review_date {
                    role.next_review_date = review;
                }
                self.rederive(role);
                role.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "registry: updated role '{role_id}' score={} level={}",
            updated.criticality_score,
            updated.criticality_level.as_str()
        );
        Ok(updated)
    }

    /// Soft delete. The document stays in place for audit history and is
    /// hidden from default listings; nothing is ever physically removed.
    pub fn deactivate_critical_role(
        &self,
        store: &DocStore,
        role_id: &str,
        actor: &str,
    ) -> EngineResult<CriticalRoleRecord> {
        let updated = store.update_document(
            Collection::CriticalRoles,
            role_id,
            |role: &mut CriticalRoleRecord| {
                role.is_active = false;
                role.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!("registry: deactivated role '{role_id}'");
        Ok(updated)
    }

    pub fn list_critical_roles(
        &self,
        store: &DocStore,
        company_id: &str,
        filters: &RoleFilters,
    ) -> EngineResult<Vec<CriticalRoleRecord>> {
        let mut field_filters: Vec<FieldFilter> = Vec::new();
        if !filters.include_inactive {
            field_filters.push(FieldFilter::eq("is_active", true));
        }
        if let Some(department) = &filters.department {
            field_filters.push(FieldFilter::eq("department", department.as_str()));
        }
        if let Some(level) = filters.criticality_level {
            field_filters.push(FieldFilter::eq("criticality_level", level.as_str()));
        }
        if let Some(risk) = filters.succession_risk {
            field_filters.push(FieldFilter::eq("succession_risk", risk.as_str()));
        }
        let mut roles: Vec<CriticalRoleRecord> =
            store.query_documents(Collection::CriticalRoles, company_id, &field_filters)?;
        if let Some(wanted) = filters.has_successors {
            roles.retain(|role| !role.successors.is_empty() == wanted);
        }
        Ok(roles)
    }

    /// The single derivation path. Sorts the bench (stable, so equal
    /// ranks keep insertion order) and recomputes every derived field
    /// from the base fields.
    fn rederive(&self, role: &mut CriticalRoleRecord) {
        role.successors.sort_by_key(|s| s.rank);
        for successor in &mut role.successors {
            successor.readiness_score = scoring::readiness_score(&successor.readiness_assessment);
            successor.nine_box_category = scoring::nine_box_category(
                successor.performance_rating,
                &successor.potential_rating,
            );
        }
        role.criticality_score = scoring::criticality_score(&role.criticality_factors);
        role.criticality_level = scoring::criticality_level(role.criticality_score, &self.bands);
        role.succession_risk =
            scoring::succession_risk(role.successors.iter().map(|s| s.readiness_level));
        role.bench_strength =
            scoring::bench_strength(role.successors.iter().map(|s| s.readiness_level));
    }
}

fn build_candidate(candidate_id: &str, input: &SuccessorInput, actor: &str) -> SuccessorCandidate {
    SuccessorCandidate {
        candidate_id: candidate_id.to_string(),
        employee_id: input.employee_id.clone(),
        employee_name: input.employee_name.clone(),
        current_position: input.current_position.clone(),
        current_department: input.current_department.clone(),
        readiness_level: input.readiness_level,
        readiness_assessment: input.readiness_assessment.clone(),
        readiness_score: scoring::readiness_score(&input.readiness_assessment),
        performance_rating: input.performance_rating,
        potential_rating: input.potential_rating.clone(),
        nine_box_category: scoring::nine_box_category(
            input.performance_rating,
            &input.potential_rating,
        ),
        competency_gaps: input.competency_gaps.iter().map(build_gap).collect(),
        rank: input.rank,
        assessed_by: actor.to_string(),
    }
}

fn build_gap(input: &CompetencyGapInput) -> CompetencyGap {
    CompetencyGap {
        competency: input.competency.clone(),
        required_level: input.required_level,
        current_level: input.current_level,
        gap_size: input.required_level as i32 - input.current_level as i32,
        development_actions: input.development_actions.clone(),
    }
}
