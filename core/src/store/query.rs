//! Filtered queries, bounded scans, and read-snapshot transactions.

use super::{Collection, DocStore};
use crate::error::EngineResult;
use rusqlite::types::Value as SqlValue;
use serde::de::DeserializeOwned;

/// Page size for `scan_documents`. Keeps memory flat on large companies:
/// the scan never materializes more than one page of rows at a time.
const SCAN_PAGE_SIZE: usize = 200;

/// Equality filter on a top-level field of the document body.
///
/// Field names come from call sites inside this crate, never from user
/// input, so they are interpolated into the SQL text directly; only the
/// compared value is bound as a parameter.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    field: &'static str,
    value: serde_json::Value,
}

impl FieldFilter {
    pub fn eq(field: &'static str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    fn sql_fragment(&self, param_index: usize) -> String {
        format!(
            " AND json_extract(body, '$.{}') = ?{}",
            self.field, param_index
        )
    }

    /// JSON scalars compare against what `json_extract` yields: TEXT for
    /// strings, INTEGER for booleans and whole numbers, REAL otherwise.
    fn sql_value(&self) -> SqlValue {
        match &self.value {
            serde_json::Value::String(s) => SqlValue::Text(s.clone()),
            serde_json::Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
            },
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl DocStore {
    /// Fetch every document of a company matching all filters, ordered by
    /// creation time. `created_at` has one-second resolution, so rows
    /// tie-break on `rowid` to keep listings in insertion order.
    pub fn query_documents<T: DeserializeOwned>(
        &self,
        collection: Collection,
        company_id: &str,
        filters: &[FieldFilter],
    ) -> EngineResult<Vec<T>> {
        let mut sql = format!(
            "SELECT body FROM {} WHERE company_id = ?1",
            collection.table_name()
        );
        let mut bindings: Vec<SqlValue> = vec![SqlValue::Text(company_id.to_string())];
        for filter in filters {
            sql.push_str(&filter.sql_fragment(bindings.len() + 1));
            bindings.push(filter.sql_value());
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }

    /// Visit every matching document of a company, one keyset page at a
    /// time. Use this instead of `query_documents` for whole-collection
    /// walks (dashboards, compilers) where the result set is unbounded.
    pub fn scan_documents<T: DeserializeOwned>(
        &self,
        collection: Collection,
        company_id: &str,
        filters: &[FieldFilter],
        mut visit: impl FnMut(T) -> EngineResult<()>,
    ) -> EngineResult<()> {
        let mut sql = format!(
            "SELECT doc_id, body FROM {} WHERE company_id = ?1",
            collection.table_name()
        );
        let mut filter_bindings: Vec<SqlValue> = Vec::with_capacity(filters.len());
        for filter in filters {
            sql.push_str(&filter.sql_fragment(filter_bindings.len() + 2));
            filter_bindings.push(filter.sql_value());
        }
        let after_param = filter_bindings.len() + 2;
        sql.push_str(&format!(
            " AND doc_id > ?{after_param} ORDER BY doc_id ASC LIMIT {SCAN_PAGE_SIZE}"
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut after = String::new();
        loop {
            let mut bindings: Vec<SqlValue> = vec![SqlValue::Text(company_id.to_string())];
            bindings.extend(filter_bindings.iter().cloned());
            bindings.push(SqlValue::Text(after.clone()));

            let page = stmt
                .query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let page_len = page.len();
            for (doc_id, json) in page {
                visit(serde_json::from_str(&json)?)?;
                after = doc_id;
            }
            if page_len < SCAN_PAGE_SIZE {
                return Ok(());
            }
        }
    }

    /// Run a multi-read closure inside one deferred transaction so every
    /// read observes the same database state. Not reentrant: the closure
    /// must only perform reads through the same store handle and must not
    /// call `snapshot_read` again.
    pub fn snapshot_read<R>(
        &self,
        read: impl FnOnce(&Self) -> EngineResult<R>,
    ) -> EngineResult<R> {
        self.conn.execute_batch("BEGIN DEFERRED")?;
        match read(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }
}
