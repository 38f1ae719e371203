//! Import-tracker rows.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::users;
use benchtop_types::{ImportStatus, ImportTracker};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn status_from_str(s: &str) -> ImportStatus {
    match s {
        "in_progress" => ImportStatus::InProgress,
        "completed" => ImportStatus::Completed,
        "failed" => ImportStatus::Failed,
        _ => ImportStatus::Pending,
    }
}

struct TrackerRow {
    id: i64,
    import_type: String,
    import_status: String,
    import_name: Option<String>,
    user_id: Option<i64>,
    created_at: Option<String>,
    completed_at: Option<String>,
}

const SELECT: &str = "SELECT id, import_type, import_status, import_name, user_id, \
                      created_at, completed_at FROM import_trackers";

fn from_row(row: &Row<'_>) -> rusqlite::Result<TrackerRow> {
    Ok(TrackerRow {
        id: row.get(0)?,
        import_type: row.get(1)?,
        import_status: row.get(2)?,
        import_name: row.get(3)?,
        user_id: row.get(4)?,
        created_at: row.get(5)?,
        completed_at: row.get(6)?,
    })
}

fn rehydrate(conn: &Connection, row: TrackerRow) -> StorageResult<ImportTracker> {
    Ok(ImportTracker {
        id: row.id,
        import_type: row.import_type,
        import_status: status_from_str(&row.import_status),
        import_name: row.import_name,
        user: users::resolve_fk(conn, row.user_id)?,
        created_at: db::ts_from_sql(row.created_at),
        completed_at: db::ts_from_sql(row.completed_at),
    })
}

impl CacheDb {
    pub fn cache_import_tracker(&self, tracker: &ImportTracker) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &tracker.user)?;
            tx.execute(
                "INSERT OR REPLACE INTO import_trackers
                     (id, import_type, import_status, import_name, user_id, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    tracker.id,
                    tracker.import_type,
                    tracker.import_status.as_str(),
                    tracker.import_name,
                    tracker.user.as_ref().map(|u| u.id),
                    db::ts_to_sql(&tracker.created_at),
                    db::ts_to_sql(&tracker.completed_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_import_tracker(&self, id: i64) -> StorageResult<Option<ImportTracker>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists import trackers, optionally for one user, newest first.
    pub fn list_import_trackers(
        &self,
        user: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<ImportTracker>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(SELECT);
        if user.is_some() {
            sql.push_str(" WHERE user_id = ?1");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<TrackerRow> = match user {
            Some(user) => stmt
                .query_map(params![user], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        drop(stmt);

        let mut trackers = Vec::with_capacity(rows.len());
        for row in rows {
            trackers.push(rehydrate(&conn, row)?);
        }
        Ok(trackers)
    }

    pub fn count_import_trackers(&self, user: Option<i64>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match user {
            Some(user) => conn.query_row(
                "SELECT COUNT(*) FROM import_trackers WHERE user_id = ?1",
                params![user],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM import_trackers", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    pub fn evict_import_tracker(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM import_trackers WHERE id = ?1", params![id])?;
        Ok(())
    }
}
