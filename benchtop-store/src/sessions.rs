//! Session rows — the one aggregate keyed by a remote-assigned string
//! `unique_id`. Associated protocol ids live in a cross-reference table
//! that is fully replaced on every cache write.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::users;
use benchtop_types::Session;
use rusqlite::{params, Connection, OptionalExtension, Row};

struct SessionRow {
    unique_id: String,
    user_id: Option<i64>,
    name: String,
    enabled: bool,
    started_at: Option<String>,
    ended_at: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        unique_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        enabled: row.get(3)?,
        started_at: row.get(4)?,
        ended_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const SELECT: &str = "SELECT unique_id, user_id, name, enabled, started_at, ended_at, \
                      created_at, updated_at FROM sessions";

fn protocol_ids(conn: &Connection, unique_id: &str) -> StorageResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT protocol_id FROM session_protocols WHERE session_id = ?1 ORDER BY protocol_id ASC",
    )?;
    let ids = stmt
        .query_map(params![unique_id], |row| row.get(0))?
        .filter_map(|r| r.ok())
        .collect();
    Ok(ids)
}

fn rehydrate(conn: &Connection, row: SessionRow) -> StorageResult<Session> {
    Ok(Session {
        protocols: protocol_ids(conn, &row.unique_id)?,
        user: users::resolve_fk(conn, row.user_id)?,
        unique_id: row.unique_id,
        name: row.name,
        enabled: row.enabled,
        started_at: db::ts_from_sql(row.started_at),
        ended_at: db::ts_from_sql(row.ended_at),
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    pub fn cache_session(&self, session: &Session) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &session.user)?;
            tx.execute(
                "INSERT OR REPLACE INTO sessions
                     (unique_id, user_id, name, enabled, started_at, ended_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    session.unique_id,
                    session.user.as_ref().map(|u| u.id),
                    session.name,
                    session.enabled,
                    db::ts_to_sql(&session.started_at),
                    db::ts_to_sql(&session.ended_at),
                    db::ts_to_sql(&session.created_at),
                    db::ts_to_sql(&session.updated_at)
                ],
            )?;
            tx.execute(
                "DELETE FROM session_protocols WHERE session_id = ?1",
                params![session.unique_id],
            )?;
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO session_protocols (session_id, protocol_id) VALUES (?1, ?2)",
            )?;
            for protocol_id in &session.protocols {
                stmt.execute(params![session.unique_id, protocol_id])?;
            }
            Ok(())
        })
    }

    pub fn get_session(&self, unique_id: &str) -> StorageResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{SELECT} WHERE unique_id = ?1"), params![unique_id], from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists sessions, optionally those running a given protocol.
    pub fn list_sessions(
        &self,
        protocol: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(SELECT);
        if protocol.is_some() {
            sql.push_str(
                " WHERE unique_id IN (SELECT session_id FROM session_protocols WHERE protocol_id = ?1)",
            );
        }
        sql.push_str(" ORDER BY unique_id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<SessionRow> = match protocol {
            Some(protocol) => stmt
                .query_map(params![protocol], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        drop(stmt);

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(rehydrate(&conn, row)?);
        }
        Ok(sessions)
    }

    pub fn count_sessions(&self, protocol: Option<i64>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match protocol {
            Some(protocol) => conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE unique_id IN
                     (SELECT session_id FROM session_protocols WHERE protocol_id = ?1)",
                params![protocol],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Evicts a session and its protocol associations after a
    /// remote-confirmed delete. Annotations referencing the session keep
    /// their rows; they are independent aggregates.
    pub fn evict_session(&self, unique_id: &str) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute(
                "DELETE FROM session_protocols WHERE session_id = ?1",
                params![unique_id],
            )?;
            tx.execute("DELETE FROM sessions WHERE unique_id = ?1", params![unique_id])?;
            Ok(())
        })
    }
}
