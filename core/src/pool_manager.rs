//! Talent pool manager — named employee pools with roll-up counters.
//!
//! This service:
//!   1. Creates pools with a review cadence
//!   2. Adds and removes members, enforcing one entry per employee
//!   3. Keeps member/readiness counters in lockstep with the member list
//!   4. Refreshes a member's assessment snapshot in place

use crate::{
    clock::EngineClock,
    error::{EngineError, EngineResult},
    scoring::{NineBoxCategory, ReadinessLevel},
    store::{Collection, DocStore},
    types::{new_entity_id, CompanyId, EmployeeId, EntityId},
};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// How often a pool is reviewed. Drives `next_review_date` at creation
/// time only; membership changes never reschedule a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCycle {
    Quarterly,
    SemiAnnual,
    Annual,
}

impl ReviewCycle {
    fn months(&self) -> u32 {
        match self {
            Self::Quarterly => 3,
            Self::SemiAnnual => 6,
            Self::Annual => 12,
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentPoolRecord {
    pub pool_id: EntityId,
    pub company_id: CompanyId,
    pub pool_name: String,
    /// Level or type of role the pool feeds, e.g. "executive".
    pub pool_type: String,
    pub members: Vec<PoolMember>,
    // Counters derived from `members`, rewritten on every change
    pub member_count: u32,
    pub ready_now_count: u32,
    pub ready_1_year_count: u32,
    pub review_cycle: ReviewCycle,
    pub next_review_date: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolMember {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub current_position: String,
    pub nine_box_category: NineBoxCategory,
    pub readiness_level: ReadinessLevel,
    pub added_date: DateTime<Utc>,
    pub added_by: String,
    pub last_assessed_date: DateTime<Utc>,
}

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoolInput {
    pub company_id: CompanyId,
    pub pool_name: String,
    pub pool_type: String,
    pub review_cycle: ReviewCycle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberInput {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub current_position: String,
    pub nine_box_category: NineBoxCategory,
    pub readiness_level: ReadinessLevel,
}

// ── Service ──────────────────────────────────────────────────────────────────

pub struct PoolManager {
    clock: EngineClock,
}

impl PoolManager {
    pub fn new(clock: EngineClock) -> Self {
        Self { clock }
    }

    pub fn create_talent_pool(
        &self,
        store: &DocStore,
        input: CreatePoolInput,
        actor: &str,
    ) -> EngineResult<TalentPoolRecord> {
        let now = self.clock.now();
        let pool = TalentPoolRecord {
            pool_id: new_entity_id("pool"),
            company_id: input.company_id,
            pool_name: input.pool_name,
            pool_type: input.pool_type,
            members: Vec::new(),
            member_count: 0,
            ready_now_count: 0,
            ready_1_year_count: 0,
            review_cycle: input.review_cycle,
            next_review_date: now + Months::new(input.review_cycle.months()),
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        };
        store.insert_document(Collection::TalentPools, &pool.company_id, &pool.pool_id, &pool)?;
        log::info!(
            "pools: created pool '{}' ({}), first review {}",
            pool.pool_name,
            pool.pool_id,
            pool.next_review_date.format("%Y-%m-%d")
        );
        Ok(pool)
    }

    pub fn get_talent_pool(
        &self,
        store: &DocStore,
        pool_id: &str,
    ) -> EngineResult<TalentPoolRecord> {
        store.fetch_document(Collection::TalentPools, pool_id)
    }

    /// Add an employee. One entry per employee id per pool; a second add
    /// fails with `DuplicateMember`.
    pub fn add_member(
        &self,
        store: &DocStore,
        pool_id: &str,
        input: AddMemberInput,
        actor: &str,
    ) -> EngineResult<TalentPoolRecord> {
        let now = self.clock.now();
        let updated = store.update_document(
            Collection::TalentPools,
            pool_id,
            |pool: &mut TalentPoolRecord| {
                if pool.members.iter().any(|m| m.employee_id == input.employee_id) {
                    return Err(EngineError::DuplicateMember {
                        pool_id: pool_id.to_string(),
                        employee_id: input.employee_id.clone(),
                    });
                }
                pool.members.push(PoolMember {
                    employee_id: input.employee_id.clone(),
                    employee_name: input.employee_name.clone(),
                    current_position: input.current_position.clone(),
                    nine_box_category: input.nine_box_category,
                    readiness_level: input.readiness_level,
                    added_date: now,
                    added_by: actor.to_string(),
                    last_assessed_date: now,
                });
                recount(pool);
                pool.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "pools: pool '{pool_id}' added '{}' ({} members, {} ready now)",
            input.employee_id,
            updated.member_count,
            updated.ready_now_count
        );
        Ok(updated)
    }

    /// Remove an employee. Removing a non-member is a no-op that still
    /// rewrites the counters, so the call is idempotent.
    pub fn remove_member(
        &self,
        store: &DocStore,
        pool_id: &str,
        employee_id: &str,
        actor: &str,
    ) -> EngineResult<TalentPoolRecord> {
        let updated = store.update_document(
            Collection::TalentPools,
            pool_id,
            |pool: &mut TalentPoolRecord| {
                pool.members.retain(|m| m.employee_id != employee_id);
                recount(pool);
                pool.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "pools: pool '{pool_id}' removed '{employee_id}' ({} members remain)",
            updated.member_count
        );
        Ok(updated)
    }

    /// Refresh one member's assessment snapshot and stamp the
    /// assessment date. Counters follow, since readiness may change.
    pub fn update_member_assessment(
        &self,
        store: &DocStore,
        pool_id: &str,
        employee_id: &str,
        nine_box_category: NineBoxCategory,
        readiness_level: ReadinessLevel,
        actor: &str,
    ) -> EngineResult<TalentPoolRecord> {
        let now = self.clock.now();
        let updated = store.update_document(
            Collection::TalentPools,
            pool_id,
            |pool: &mut TalentPoolRecord| {
                let member = pool
                    .members
                    .iter_mut()
                    .find(|m| m.employee_id == employee_id)
                    .ok_or_else(|| EngineError::NotFound {
                        entity: "pool member",
                        id: employee_id.to_string(),
                    })?;
                member.nine_box_category = nine_box_category;
                member.readiness_level = readiness_level;
                member.last_assessed_date = now;
                recount(pool);
                pool.updated_by = actor.to_string();
                Ok(())
            },
        )?;
        log::info!(
            "pools: pool '{pool_id}' reassessed '{employee_id}' ({} ready now)",
            updated.ready_now_count
        );
        Ok(updated)
    }

    pub fn list_talent_pools(
        &self,
        store: &DocStore,
        company_id: &str,
    ) -> EngineResult<Vec<TalentPoolRecord>> {
        store.query_documents(Collection::TalentPools, company_id, &[])
    }
}

/// Counters are pure projections of the member list and are rewritten
/// together on every membership change.
fn recount(pool: &mut TalentPoolRecord) {
    pool.member_count = pool.members.len() as u32;
    pool.ready_now_count = pool
        .members
        .iter()
        .filter(|m| m.readiness_level == ReadinessLevel::ReadyNow)
        .count() as u32;
    pool.ready_1_year_count = pool
        .members
        .iter()
        .filter(|m| m.readiness_level == ReadinessLevel::Ready1Year)
        .count() as u32;
}
