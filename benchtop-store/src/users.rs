//! Shared user side-table.
//!
//! Users arrive embedded in other aggregates, sometimes fully populated
//! and sometimes as bare references. The upsert is merge-guarded: an empty
//! incoming field never overwrites a cached non-empty one.

use crate::db::CacheDb;
use crate::error::StorageResult;
use benchtop_types::UserBasic;
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) fn upsert(conn: &Connection, user: &UserBasic) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO users (id, username, first_name, last_name) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             username = CASE WHEN excluded.username != '' THEN excluded.username ELSE username END,
             first_name = CASE WHEN excluded.first_name != '' THEN excluded.first_name ELSE first_name END,
             last_name = CASE WHEN excluded.last_name != '' THEN excluded.last_name ELSE last_name END",
        params![user.id, user.username, user.first_name, user.last_name],
    )?;
    Ok(())
}

pub(crate) fn upsert_opt(conn: &Connection, user: &Option<UserBasic>) -> StorageResult<()> {
    if let Some(user) = user {
        upsert(conn, user)?;
    }
    Ok(())
}

pub(crate) fn get(conn: &Connection, id: i64) -> StorageResult<Option<UserBasic>> {
    let user = conn
        .query_row(
            "SELECT id, username, first_name, last_name FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(UserBasic {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Resolves a nullable user foreign key during rehydration: absent row
/// becomes a placeholder, NULL key becomes `None`.
pub(crate) fn resolve_fk(conn: &Connection, id: Option<i64>) -> StorageResult<Option<UserBasic>> {
    match id {
        Some(id) => Ok(Some(get(conn, id)?.unwrap_or_else(|| UserBasic::placeholder(id)))),
        None => Ok(None),
    }
}

impl CacheDb {
    pub fn upsert_user(&self, user: &UserBasic) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        upsert(&conn, user)
    }

    pub fn get_user(&self, id: i64) -> StorageResult<Option<UserBasic>> {
        let conn = self.conn.lock().unwrap();
        get(&conn, id)
    }

    pub fn delete_user(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(())
    }
}
