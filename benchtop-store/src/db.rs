//! Connection wrapper and shared row-mapping helpers.

use crate::error::StorageResult;
use crate::schema::initialize_schema;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// The local cache database.
///
/// All domain tables live in one SQLite file; the connection is shared
/// behind a mutex and each public operation locks it for its duration.
/// Cache writes that touch multiple tables run inside a single
/// transaction, so a failed decomposition rolls back completely.
#[derive(Clone)]
pub struct CacheDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl CacheDb {
    /// Opens or creates the cache database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory cache (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs a multi-table cache write inside one transaction.
    pub(crate) fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn apply_pragmas(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

// -- Row mapping helpers --

/// RFC3339 TEXT column from an optional timestamp.
pub(crate) fn ts_to_sql(t: &Option<DateTime<Utc>>) -> Option<String> {
    t.map(|t| t.to_rfc3339())
}

pub(crate) fn ts_req_to_sql(t: &DateTime<Utc>) -> String {
    t.to_rfc3339()
}

/// Optional timestamp from an RFC3339 TEXT column.
pub(crate) fn ts_from_sql(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Required timestamp from an RFC3339 TEXT column; epoch on a corrupt row
/// rather than failing the whole rehydration.
pub(crate) fn ts_req_from_sql(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}

pub(crate) fn date_to_sql(d: &Option<NaiveDate>) -> Option<String> {
    d.map(|d| d.to_string())
}

pub(crate) fn date_from_sql(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| s.parse().ok())
}

/// Appends ` LIMIT ? OFFSET ?`-equivalent clauses with inlined values.
/// Values come from the caller as integers, never user strings.
pub(crate) fn push_slice(sql: &mut String, limit: i64, offset: i64) {
    sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
}

/// SQL LIKE pattern for a substring search.
pub(crate) fn like_pattern(search: &str) -> String {
    format!("%{search}%")
}

/// Borrows a boxed parameter list as the `&[&dyn ToSql]` shape rusqlite
/// accepts for dynamically built filters.
pub(crate) fn param_refs(args: &[Box<dyn rusqlite::ToSql>]) -> Vec<&dyn rusqlite::ToSql> {
    args.iter().map(|a| a.as_ref()).collect()
}
