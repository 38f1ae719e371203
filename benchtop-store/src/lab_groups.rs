//! Lab-group rows. The default storage reference flattens into the shared
//! storage-object side-table.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::storage_objects;
use benchtop_types::LabGroup;
use rusqlite::{params, Connection, OptionalExtension, Row};

struct LabGroupRow {
    id: i64,
    name: String,
    description: String,
    is_core_facility: bool,
    default_storage_id: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

const SELECT: &str = "SELECT id, name, description, is_core_facility, default_storage_id, \
                      created_at, updated_at FROM lab_groups";

fn from_row(row: &Row<'_>) -> rusqlite::Result<LabGroupRow> {
    Ok(LabGroupRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_core_facility: row.get(3)?,
        default_storage_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn rehydrate(conn: &Connection, row: LabGroupRow) -> StorageResult<LabGroup> {
    let default_storage = match row.default_storage_id {
        Some(id) => Some(storage_objects::get_basic(conn, id)?),
        None => None,
    };
    Ok(LabGroup {
        id: row.id,
        name: row.name,
        description: row.description,
        is_core_facility: row.is_core_facility,
        default_storage,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    pub fn cache_lab_group(&self, group: &LabGroup) -> StorageResult<()> {
        self.in_transaction(|tx| {
            if let Some(storage) = &group.default_storage {
                storage_objects::upsert_basic(tx, storage)?;
            }
            tx.execute(
                "INSERT OR REPLACE INTO lab_groups
                     (id, name, description, is_core_facility, default_storage_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    group.id,
                    group.name,
                    group.description,
                    group.is_core_facility,
                    group.default_storage.as_ref().map(|s| s.id),
                    db::ts_to_sql(&group.created_at),
                    db::ts_to_sql(&group.updated_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_lab_group(&self, id: i64) -> StorageResult<Option<LabGroup>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    pub fn list_lab_groups(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<LabGroup>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(SELECT);
        if search.is_some() {
            sql.push_str(" WHERE name LIKE ?1");
        }
        sql.push_str(" ORDER BY id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<LabGroupRow> = match search {
            Some(search) => stmt
                .query_map(params![db::like_pattern(search)], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        drop(stmt);

        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            groups.push(rehydrate(&conn, row)?);
        }
        Ok(groups)
    }

    pub fn count_lab_groups(&self, search: Option<&str>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match search {
            Some(search) => conn.query_row(
                "SELECT COUNT(*) FROM lab_groups WHERE name LIKE ?1",
                params![db::like_pattern(search)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM lab_groups", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    pub fn evict_lab_group(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM lab_groups WHERE id = ?1", params![id])?;
        Ok(())
    }
}
