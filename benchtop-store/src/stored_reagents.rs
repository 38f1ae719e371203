//! Stored-reagent decomposition and rehydration.
//!
//! The remote serves the nested reagent, storage object and user fully
//! populated; the cache keeps only foreign keys on the stored-reagent row
//! and re-joins the side-tables on rehydration.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::{reagents, storage_objects, users};
use benchtop_types::StoredReagent;
use rusqlite::{params, Connection, OptionalExtension, Row};

struct StoredReagentRow {
    id: i64,
    reagent_id: i64,
    storage_object_id: i64,
    quantity: f64,
    notes: String,
    user_id: Option<i64>,
    barcode: Option<String>,
    expiration_date: Option<String>,
    shareable: bool,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<StoredReagentRow> {
    Ok(StoredReagentRow {
        id: row.get(0)?,
        reagent_id: row.get(1)?,
        storage_object_id: row.get(2)?,
        quantity: row.get(3)?,
        notes: row.get(4)?,
        user_id: row.get(5)?,
        barcode: row.get(6)?,
        expiration_date: row.get(7)?,
        shareable: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const COLS: &str = "sr.id, sr.reagent_id, sr.storage_object_id, sr.quantity, sr.notes, \
                    sr.user_id, sr.barcode, sr.expiration_date, sr.shareable, sr.created_at, sr.updated_at";

fn rehydrate(conn: &Connection, row: StoredReagentRow) -> StorageResult<StoredReagent> {
    Ok(StoredReagent {
        id: row.id,
        reagent: reagents::resolve_fk(conn, row.reagent_id)?,
        storage_object: storage_objects::get_basic(conn, row.storage_object_id)?,
        quantity: row.quantity,
        notes: row.notes,
        user: users::resolve_fk(conn, row.user_id)?,
        barcode: row.barcode,
        expiration_date: db::date_from_sql(row.expiration_date),
        shareable: row.shareable,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    /// Decomposes a stored reagent: side-table children first, then the
    /// parent row with foreign keys only.
    pub fn cache_stored_reagent(&self, stored: &StoredReagent) -> StorageResult<()> {
        self.in_transaction(|tx| {
            reagents::upsert(tx, &stored.reagent)?;
            storage_objects::upsert_basic(tx, &stored.storage_object)?;
            users::upsert_opt(tx, &stored.user)?;
            tx.execute(
                "INSERT OR REPLACE INTO stored_reagents
                     (id, reagent_id, storage_object_id, quantity, notes, user_id,
                      barcode, expiration_date, shareable, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    stored.id,
                    stored.reagent.id,
                    stored.storage_object.id,
                    stored.quantity,
                    stored.notes,
                    stored.user.as_ref().map(|u| u.id),
                    stored.barcode,
                    db::date_to_sql(&stored.expiration_date),
                    stored.shareable,
                    db::ts_to_sql(&stored.created_at),
                    db::ts_to_sql(&stored.updated_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_stored_reagent(&self, id: i64) -> StorageResult<Option<StoredReagent>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("SELECT {COLS} FROM stored_reagents sr WHERE sr.id = ?1"),
                params![id],
                from_row,
            )
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists stored reagents, optionally scoped to one storage object or
    /// filtered by a reagent-name substring (matched via the reagent
    /// side-table, as the remote search endpoint does).
    pub fn list_stored_reagents(
        &self,
        storage_object: Option<i64>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<StoredReagent>> {
        let conn = self.conn.lock().unwrap();
        let (mut sql, args) = filtered_sql(COLS, storage_object, search);
        sql.push_str(" ORDER BY sr.id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<StoredReagentRow> = stmt
            .query_map(db::param_refs(&args).as_slice(), from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            stored.push(rehydrate(&conn, row)?);
        }
        Ok(stored)
    }

    pub fn count_stored_reagents(
        &self,
        storage_object: Option<i64>,
        search: Option<&str>,
    ) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let (sql, args) = filtered_sql("COUNT(*)", storage_object, search);
        let count = conn.query_row(&sql, db::param_refs(&args).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    pub fn evict_stored_reagent(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM stored_reagents WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn filtered_sql(
    select_cols: &str,
    storage_object: Option<i64>,
    search: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut sql = format!("SELECT {select_cols} FROM stored_reagents sr");
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    if search.is_some() {
        sql.push_str(" JOIN reagents r ON r.id = sr.reagent_id");
    }
    let mut clause = " WHERE";
    if let Some(parent) = storage_object {
        args.push(Box::new(parent));
        sql.push_str(&format!("{clause} sr.storage_object_id = ?{}", args.len()));
        clause = " AND";
    }
    if let Some(search) = search {
        args.push(Box::new(db::like_pattern(search)));
        sql.push_str(&format!("{clause} r.name LIKE ?{}", args.len()));
    }
    (sql, args)
}
