//! Storage-object hierarchy.
//!
//! `path_to_root` is not persisted; rehydration rebuilds it by walking
//! cached parent rows, stopping at the first uncached ancestor.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::users;
use benchtop_types::{StorageObject, StorageObjectBasic};
use rusqlite::{params, Connection, OptionalExtension, Row};

struct StorageRow {
    id: i64,
    object_name: String,
    object_type: String,
    object_description: String,
    stored_at: Option<i64>,
    user_id: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<StorageRow> {
    Ok(StorageRow {
        id: row.get(0)?,
        object_name: row.get(1)?,
        object_type: row.get(2)?,
        object_description: row.get(3)?,
        stored_at: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const SELECT: &str = "SELECT id, object_name, object_type, object_description, stored_at, \
                      user_id, created_at, updated_at FROM storage_objects";

/// Upserts a bare reference without clobbering a richer cached row.
pub(crate) fn upsert_basic(conn: &Connection, basic: &StorageObjectBasic) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO storage_objects (id, object_name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET
             object_name = CASE WHEN excluded.object_name != '' THEN excluded.object_name ELSE object_name END",
        params![basic.id, basic.object_name],
    )?;
    Ok(())
}

pub(crate) fn upsert_full(conn: &Connection, object: &StorageObject) -> StorageResult<()> {
    users::upsert_opt(conn, &object.user)?;
    conn.execute(
        "INSERT OR REPLACE INTO storage_objects
             (id, object_name, object_type, object_description, stored_at, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            object.id,
            object.object_name,
            object.object_type,
            object.object_description,
            object.stored_at,
            object.user.as_ref().map(|u| u.id),
            db::ts_to_sql(&object.created_at),
            db::ts_to_sql(&object.updated_at)
        ],
    )?;
    Ok(())
}

pub(crate) fn get_basic(conn: &Connection, id: i64) -> StorageResult<StorageObjectBasic> {
    let basic = conn
        .query_row(
            "SELECT id, object_name FROM storage_objects WHERE id = ?1",
            params![id],
            |row| {
                Ok(StorageObjectBasic {
                    id: row.get(0)?,
                    object_name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(basic.unwrap_or_else(|| StorageObjectBasic::placeholder(id)))
}

/// Walks `stored_at` links upward, root first. Cycles cannot arise from
/// remote data but a corrupt cache must not hang, so the walk is capped.
fn path_to_root(conn: &Connection, mut parent: Option<i64>) -> StorageResult<Vec<StorageObjectBasic>> {
    let mut path = Vec::new();
    let mut hops = 0;
    while let Some(id) = parent {
        if hops > 64 {
            break;
        }
        hops += 1;
        let row = conn
            .query_row(
                "SELECT id, object_name, stored_at FROM storage_objects WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        StorageObjectBasic {
                            id: row.get(0)?,
                            object_name: row.get(1)?,
                        },
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((basic, next)) => {
                path.push(basic);
                parent = next;
            }
            None => break,
        }
    }
    path.reverse();
    Ok(path)
}

fn rehydrate(conn: &Connection, row: StorageRow) -> StorageResult<StorageObject> {
    Ok(StorageObject {
        id: row.id,
        object_name: row.object_name,
        object_type: row.object_type,
        object_description: row.object_description,
        stored_at: row.stored_at,
        user: users::resolve_fk(conn, row.user_id)?,
        path_to_root: path_to_root(conn, row.stored_at)?,
        child_count: None,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    pub fn cache_storage_object(&self, object: &StorageObject) -> StorageResult<()> {
        self.in_transaction(|tx| {
            // Ancestors observed in path_to_root are worth keeping as stubs
            for ancestor in &object.path_to_root {
                upsert_basic(tx, ancestor)?;
            }
            upsert_full(tx, object)
        })
    }

    pub fn get_storage_object(&self, id: i64) -> StorageResult<Option<StorageObject>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists storage objects, optionally scoped to one parent or filtered
    /// by a name substring.
    pub fn list_storage_objects(
        &self,
        stored_at: Option<i64>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<StorageObject>> {
        let conn = self.conn.lock().unwrap();
        let (mut sql, args) = filtered_sql(SELECT, stored_at, search);
        sql.push_str(" ORDER BY id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<StorageRow> = stmt
            .query_map(db::param_refs(&args).as_slice(), from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            objects.push(rehydrate(&conn, row)?);
        }
        Ok(objects)
    }

    pub fn count_storage_objects(
        &self,
        stored_at: Option<i64>,
        search: Option<&str>,
    ) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let (sql, args) = filtered_sql("SELECT COUNT(*) FROM storage_objects", stored_at, search);
        let count = conn.query_row(&sql, db::param_refs(&args).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Evicts a storage object after a remote-confirmed delete. Child
    /// objects and stored reagents are independent aggregates and keep
    /// their rows; their dangling references rehydrate as placeholders.
    pub fn evict_storage_object(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM storage_objects WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn filtered_sql(
    base: &str,
    stored_at: Option<i64>,
    search: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut sql = String::from(base);
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let mut clause = " WHERE";
    if let Some(parent) = stored_at {
        args.push(Box::new(parent));
        sql.push_str(&format!("{clause} stored_at = ?{}", args.len()));
        clause = " AND";
    }
    if let Some(search) = search {
        args.push(Box::new(db::like_pattern(search)));
        sql.push_str(&format!("{clause} object_name LIKE ?{}", args.len()));
    }
    (sql, args)
}
