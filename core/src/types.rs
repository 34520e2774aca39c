//! Shared primitive types used across the entire engine.

/// Tenant scope. Every document collection is partitioned by company.
pub type CompanyId = String;

/// A stable, unique identifier for any persisted entity.
pub type EntityId = String;

/// An employee identifier owned by the caller's HR system.
/// Opaque to the engine; used for uniqueness checks and audit stamps.
pub type EmployeeId = String;

/// Mint a prefixed entity id, e.g. `role-3f1c…`. The prefix makes ids
/// self-describing in logs and across collections.
pub fn new_entity_id(prefix: &str) -> EntityId {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}
