//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Services call store methods — they never execute SQL directly.
//!
//! Every entity is stored as one JSON document in a per-collection table,
//! alongside a `version` counter. All writes go through compare-and-set on
//! that counter (`put_if_version` / `update_document`), so two callers
//! editing the same document cannot silently overwrite each other.

use crate::error::{EngineError, EngineResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

mod query;
pub use query::FieldFilter;

/// How many times `update_document` re-reads and retries after losing a
/// compare-and-set race before giving up with `VersionConflict`.
pub const CAS_MAX_ATTEMPTS: u32 = 5;

/// The document collections the engine persists. One SQLite table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    CriticalRoles,
    DevelopmentPlans,
    TalentPools,
    SuccessionPlans,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::CriticalRoles => "critical_roles",
            Self::DevelopmentPlans => "development_plans",
            Self::TalentPools => "talent_pools",
            Self::SuccessionPlans => "succession_plans",
        }
    }

    /// Human-readable entity name, used in errors and log lines.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::CriticalRoles => "critical role",
            Self::DevelopmentPlans => "development plan",
            Self::TalentPools => "talent pool",
            Self::SuccessionPlans => "succession plan",
        }
    }
}

pub struct DocStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl DocStore {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        // A second handle on the same file waits for the writer instead of
        // failing fast with SQLITE_BUSY.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open a private in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Open a second connection to the same database. For a plain
    /// `:memory:` store this yields a fresh, isolated database; file and
    /// shared-memory URI stores get a real second handle.
    pub fn reopen(&self) -> EngineResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_documents.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_query_indexes.sql"))?;
        Ok(())
    }

    // ── Document CRUD ──────────────────────────────────────────

    /// Insert a new document at version 1.
    pub fn insert_document<T: Serialize>(
        &self,
        collection: Collection,
        company_id: &str,
        doc_id: &str,
        body: &T,
    ) -> EngineResult<()> {
        let json = serde_json::to_string(body)?;
        let sql = format!(
            "INSERT INTO {} (doc_id, company_id, version, body, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, datetime('now'), datetime('now'))",
            collection.table_name()
        );
        self.conn.execute(&sql, params![doc_id, company_id, json])?;
        Ok(())
    }

    /// Fetch a document, or `None` if no such id exists in the collection.
    pub fn try_fetch_document<T: DeserializeOwned>(
        &self,
        collection: Collection,
        doc_id: &str,
    ) -> EngineResult<Option<T>> {
        Ok(self
            .try_fetch_versioned(collection, doc_id)?
            .map(|(body, _)| body))
    }

    /// Fetch a document that must exist.
    pub fn fetch_document<T: DeserializeOwned>(
        &self,
        collection: Collection,
        doc_id: &str,
    ) -> EngineResult<T> {
        self.try_fetch_document(collection, doc_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: collection.entity_name(),
                id: doc_id.to_string(),
            })
    }

    fn try_fetch_versioned<T: DeserializeOwned>(
        &self,
        collection: Collection,
        doc_id: &str,
    ) -> EngineResult<Option<(T, i64)>> {
        let sql = format!(
            "SELECT body, version FROM {} WHERE doc_id = ?1",
            collection.table_name()
        );
        let row: Option<(String, i64)> = self
            .conn
            .query_row(&sql, params![doc_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        match row {
            Some((json, version)) => Ok(Some((serde_json::from_str(&json)?, version))),
            None => Ok(None),
        }
    }

    /// Current version counter of a document. Test and diagnostics helper.
    pub fn document_version(&self, collection: Collection, doc_id: &str) -> EngineResult<i64> {
        let sql = format!(
            "SELECT version FROM {} WHERE doc_id = ?1",
            collection.table_name()
        );
        self.conn
            .query_row(&sql, params![doc_id], |row| row.get(0))
            .optional()?
            .ok_or_else(|| EngineError::NotFound {
                entity: collection.entity_name(),
                id: doc_id.to_string(),
            })
    }

    /// Compare-and-set write: replaces the body only if the stored version
    /// still equals `expected_version`. Returns `false` when the document
    /// changed underneath the caller (or no longer exists).
    pub fn put_if_version<T: Serialize>(
        &self,
        collection: Collection,
        doc_id: &str,
        body: &T,
        expected_version: i64,
    ) -> EngineResult<bool> {
        let json = serde_json::to_string(body)?;
        let sql = format!(
            "UPDATE {} SET body = ?1, version = version + 1, updated_at = datetime('now')
             WHERE doc_id = ?2 AND version = ?3",
            collection.table_name()
        );
        let affected = self
            .conn
            .execute(&sql, params![json, doc_id, expected_version])?;
        Ok(affected == 1)
    }

    /// Read-modify-write with compare-and-set retry.
    ///
    /// The closure is applied to a freshly fetched copy of the document; if
    /// the write loses a race, the loop re-fetches and re-applies the
    /// closure to the new state. The closure must therefore be a pure
    /// transformation of the document, safe to run more than once. Returns
    /// the body that was actually persisted.
    pub fn update_document<T: Serialize + DeserializeOwned>(
        &self,
        collection: Collection,
        doc_id: &str,
        mut mutate: impl FnMut(&mut T) -> EngineResult<()>,
    ) -> EngineResult<T> {
        for attempt in 1..=CAS_MAX_ATTEMPTS {
            let (mut body, version) = self
                .try_fetch_versioned::<T>(collection, doc_id)?
                .ok_or_else(|| EngineError::NotFound {
                    entity: collection.entity_name(),
                    id: doc_id.to_string(),
                })?;
            mutate(&mut body)?;
            if self.put_if_version(collection, doc_id, &body, version)? {
                return Ok(body);
            }
            log::debug!(
                "store: lost write race on {} '{}' (attempt {attempt}), retrying",
                collection.entity_name(),
                doc_id
            );
        }
        Err(EngineError::VersionConflict {
            entity: collection.entity_name(),
            id: doc_id.to_string(),
            attempts: CAS_MAX_ATTEMPTS,
        })
    }

    /// Remove a document permanently.
    pub fn delete_document(&self, collection: Collection, doc_id: &str) -> EngineResult<()> {
        let sql = format!("DELETE FROM {} WHERE doc_id = ?1", collection.table_name());
        let affected = self.conn.execute(&sql, params![doc_id])?;
        if affected == 0 {
            return Err(EngineError::NotFound {
                entity: collection.entity_name(),
                id: doc_id.to_string(),
            });
        }
        Ok(())
    }

    // ── Counts ─────────────────────────────────────────────────

    pub fn document_count(&self, collection: Collection, company_id: &str) -> EngineResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE company_id = ?1",
            collection.table_name()
        );
        self.conn
            .query_row(&sql, params![company_id], |row| row.get(0))
            .map_err(Into::into)
    }
}
