//! Reagent table. Shared with stored reagents and protocol reagent lists.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use benchtop_types::Reagent;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Reagent> {
    Ok(Reagent {
        id: row.get(0)?,
        name: row.get(1)?,
        unit: row.get(2)?,
        created_at: db::ts_from_sql(row.get(3)?),
        updated_at: db::ts_from_sql(row.get(4)?),
    })
}

pub(crate) fn upsert(conn: &Connection, reagent: &Reagent) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO reagents (id, name, unit, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
             name = CASE WHEN excluded.name != '' THEN excluded.name ELSE name END,
             unit = CASE WHEN excluded.unit != '' THEN excluded.unit ELSE unit END,
             created_at = COALESCE(excluded.created_at, created_at),
             updated_at = COALESCE(excluded.updated_at, updated_at)",
        params![
            reagent.id,
            reagent.name,
            reagent.unit,
            db::ts_to_sql(&reagent.created_at),
            db::ts_to_sql(&reagent.updated_at)
        ],
    )?;
    Ok(())
}

pub(crate) fn get(conn: &Connection, id: i64) -> StorageResult<Option<Reagent>> {
    let reagent = conn
        .query_row(
            "SELECT id, name, unit, created_at, updated_at FROM reagents WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(reagent)
}

/// Resolves a reagent foreign key during rehydration, substituting a
/// placeholder when the row was never cached.
pub(crate) fn resolve_fk(conn: &Connection, id: i64) -> StorageResult<Reagent> {
    Ok(get(conn, id)?.unwrap_or_else(|| Reagent::placeholder(id)))
}

impl CacheDb {
    pub fn cache_reagent(&self, reagent: &Reagent) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        upsert(&conn, reagent)
    }

    pub fn get_reagent(&self, id: i64) -> StorageResult<Option<Reagent>> {
        let conn = self.conn.lock().unwrap();
        get(&conn, id)
    }

    pub fn list_reagents(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Reagent>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from("SELECT id, name, unit, created_at, updated_at FROM reagents");
        if search.is_some() {
            sql.push_str(" WHERE name LIKE ?1");
        }
        sql.push_str(" ORDER BY id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows = match search {
            Some(search) => stmt
                .query_map(params![db::like_pattern(search)], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        Ok(rows)
    }

    pub fn count_reagents(&self, search: Option<&str>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match search {
            Some(search) => conn.query_row(
                "SELECT COUNT(*) FROM reagents WHERE name LIKE ?1",
                params![db::like_pattern(search)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM reagents", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    pub fn evict_reagent(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM reagents WHERE id = ?1", params![id])?;
        Ok(())
    }
}
