//! Protocol aggregate decomposition and rehydration.
//!
//! A protocol fans out across six tables: the parent row, sections, steps,
//! the step successor-edge table, the tag association table and the
//! protocol reagent list. Association and edge tables are fully replaced
//! on every cache write so the local edge set always equals the most
//! recently observed remote one.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::{reagents, tags, users};
use benchtop_types::{Protocol, ProtocolReagent, ProtocolSection, ProtocolStep, Tag};
use rusqlite::{params, Connection, OptionalExtension, Row};

struct ProtocolRow {
    id: i64,
    protocol_title: String,
    protocol_description: String,
    enabled: bool,
    user_id: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn protocol_from_row(row: &Row<'_>) -> rusqlite::Result<ProtocolRow> {
    Ok(ProtocolRow {
        id: row.get(0)?,
        protocol_title: row.get(1)?,
        protocol_description: row.get(2)?,
        enabled: row.get(3)?,
        user_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<ProtocolSection> {
    Ok(ProtocolSection {
        id: row.get(0)?,
        protocol: row.get(1)?,
        section_description: row.get(2)?,
        section_duration: row.get(3)?,
        created_at: db::ts_from_sql(row.get(4)?),
        updated_at: db::ts_from_sql(row.get(5)?),
    })
}

const PROTOCOL_SELECT: &str = "SELECT id, protocol_title, protocol_description, enabled, \
                               user_id, created_at, updated_at FROM protocols";
const SECTION_SELECT: &str = "SELECT id, protocol_id, section_description, section_duration, \
                              created_at, updated_at FROM protocol_sections";
const STEP_SELECT: &str = "SELECT id, protocol_id, section_id, step_description, step_duration, \
                           created_at, updated_at FROM protocol_steps";

// ── Sections ─────────────────────────────────────────────────────

pub(crate) fn upsert_section(conn: &Connection, section: &ProtocolSection) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO protocol_sections
             (id, protocol_id, section_description, section_duration, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            section.id,
            section.protocol,
            section.section_description,
            section.section_duration,
            db::ts_to_sql(&section.created_at),
            db::ts_to_sql(&section.updated_at)
        ],
    )?;
    Ok(())
}

// ── Steps ────────────────────────────────────────────────────────

pub(crate) fn upsert_step(conn: &Connection, step: &ProtocolStep) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO protocol_steps
             (id, protocol_id, section_id, step_description, step_duration, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            step.id,
            step.protocol,
            step.step_section,
            step.step_description,
            step.step_duration,
            db::ts_to_sql(&step.created_at),
            db::ts_to_sql(&step.updated_at)
        ],
    )?;
    replace_next_edges(conn, step.id, &step.next_step)?;
    Ok(())
}

/// Full replacement of a step's successor edges, preserving order.
fn replace_next_edges(conn: &Connection, step_id: i64, next: &[i64]) -> StorageResult<()> {
    conn.execute("DELETE FROM step_next_edges WHERE step_id = ?1", params![step_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO step_next_edges (step_id, next_step_id, ordinal) VALUES (?1, ?2, ?3)",
    )?;
    for (ordinal, next_id) in next.iter().enumerate() {
        stmt.execute(params![step_id, next_id, ordinal as i64])?;
    }
    Ok(())
}

fn next_edges(conn: &Connection, step_id: i64) -> StorageResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT next_step_id FROM step_next_edges WHERE step_id = ?1 ORDER BY ordinal ASC",
    )?;
    let edges = stmt
        .query_map(params![step_id], |row| row.get(0))?
        .filter_map(|r| r.ok())
        .collect();
    Ok(edges)
}

// ── Protocol aggregate ───────────────────────────────────────────

fn rehydrate(conn: &Connection, row: ProtocolRow) -> StorageResult<Protocol> {
    let mut stmt = conn.prepare(&format!("{SECTION_SELECT} WHERE protocol_id = ?1 ORDER BY id ASC"))?;
    let sections = stmt
        .query_map(params![row.id], section_from_row)?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);

    let mut stmt = conn.prepare(&format!("{STEP_SELECT} WHERE protocol_id = ?1 ORDER BY id ASC"))?;
    let step_rows: Vec<(i64, i64, Option<i64>, String, Option<i64>, Option<String>, Option<String>)> = stmt
        .query_map(params![row.id], |r| {
            Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
            ))
        })?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);

    let mut steps = Vec::with_capacity(step_rows.len());
    for (id, protocol, step_section, step_description, step_duration, created_at, updated_at) in
        step_rows
    {
        steps.push(ProtocolStep {
            id,
            protocol,
            step_section,
            step_description,
            step_duration,
            next_step: next_edges(conn, id)?,
            created_at: db::ts_from_sql(created_at),
            updated_at: db::ts_from_sql(updated_at),
        });
    }

    let mut stmt = conn.prepare(
        "SELECT tag_id FROM protocol_tags WHERE protocol_id = ?1 ORDER BY tag_id ASC",
    )?;
    let tag_ids: Vec<i64> = stmt
        .query_map(params![row.id], |r| r.get(0))?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);
    let mut protocol_tags = Vec::with_capacity(tag_ids.len());
    for tag_id in tag_ids {
        protocol_tags.push(tags::get(conn, tag_id)?.unwrap_or_else(|| Tag::placeholder(tag_id)));
    }

    let mut stmt = conn.prepare(
        "SELECT id, reagent_id, quantity FROM protocol_reagents WHERE protocol_id = ?1 ORDER BY id ASC",
    )?;
    let reagent_rows: Vec<(i64, i64, f64)> = stmt
        .query_map(params![row.id], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);
    let mut protocol_reagents = Vec::with_capacity(reagent_rows.len());
    for (id, reagent_id, quantity) in reagent_rows {
        protocol_reagents.push(ProtocolReagent {
            id,
            protocol: row.id,
            reagent: reagents::resolve_fk(conn, reagent_id)?,
            quantity,
        });
    }

    Ok(Protocol {
        id: row.id,
        protocol_title: row.protocol_title,
        protocol_description: row.protocol_description,
        enabled: row.enabled,
        user: users::resolve_fk(conn, row.user_id)?,
        sections,
        steps,
        tags: protocol_tags,
        reagents: protocol_reagents,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    /// Decomposes a protocol aggregate: children and side-tables first,
    /// then the parent row, then full replacement of associations.
    pub fn cache_protocol(&self, protocol: &Protocol) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &protocol.user)?;
            tx.execute(
                "INSERT OR REPLACE INTO protocols
                     (id, protocol_title, protocol_description, enabled, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    protocol.id,
                    protocol.protocol_title,
                    protocol.protocol_description,
                    protocol.enabled,
                    protocol.user.as_ref().map(|u| u.id),
                    db::ts_to_sql(&protocol.created_at),
                    db::ts_to_sql(&protocol.updated_at)
                ],
            )?;

            // Child tables are replaced wholesale: the detail endpoint is
            // authoritative for the full collection.
            tx.execute(
                "DELETE FROM protocol_sections WHERE protocol_id = ?1",
                params![protocol.id],
            )?;
            for section in &protocol.sections {
                upsert_section(tx, section)?;
            }

            let mut stmt = tx.prepare("SELECT id FROM protocol_steps WHERE protocol_id = ?1")?;
            let old_step_ids: Vec<i64> = stmt
                .query_map(params![protocol.id], |r| r.get(0))?
                .filter_map(|r| r.ok())
                .collect();
            drop(stmt);
            for old_id in old_step_ids {
                tx.execute("DELETE FROM step_next_edges WHERE step_id = ?1", params![old_id])?;
            }
            tx.execute(
                "DELETE FROM protocol_steps WHERE protocol_id = ?1",
                params![protocol.id],
            )?;
            for step in &protocol.steps {
                upsert_step(tx, step)?;
            }

            tx.execute(
                "DELETE FROM protocol_tags WHERE protocol_id = ?1",
                params![protocol.id],
            )?;
            for tag in &protocol.tags {
                tags::upsert(tx, tag)?;
                tx.execute(
                    "INSERT OR IGNORE INTO protocol_tags (protocol_id, tag_id) VALUES (?1, ?2)",
                    params![protocol.id, tag.id],
                )?;
            }

            tx.execute(
                "DELETE FROM protocol_reagents WHERE protocol_id = ?1",
                params![protocol.id],
            )?;
            for pr in &protocol.reagents {
                reagents::upsert(tx, &pr.reagent)?;
                tx.execute(
                    "INSERT INTO protocol_reagents (id, protocol_id, reagent_id, quantity) VALUES (?1, ?2, ?3, ?4)",
                    params![pr.id, protocol.id, pr.reagent.id, pr.quantity],
                )?;
            }
            Ok(())
        })
    }

    pub fn get_protocol(&self, id: i64) -> StorageResult<Option<Protocol>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{PROTOCOL_SELECT} WHERE id = ?1"), params![id], protocol_from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    pub fn list_protocols(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Protocol>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(PROTOCOL_SELECT);
        if search.is_some() {
            sql.push_str(" WHERE protocol_title LIKE ?1");
        }
        sql.push_str(" ORDER BY id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<ProtocolRow> = match search {
            Some(search) => stmt
                .query_map(params![db::like_pattern(search)], protocol_from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], protocol_from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        drop(stmt);

        let mut protocols = Vec::with_capacity(rows.len());
        for row in rows {
            protocols.push(rehydrate(&conn, row)?);
        }
        Ok(protocols)
    }

    pub fn count_protocols(&self, search: Option<&str>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match search {
            Some(search) => conn.query_row(
                "SELECT COUNT(*) FROM protocols WHERE protocol_title LIKE ?1",
                params![db::like_pattern(search)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM protocols", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Evicts a protocol and every dependent row after a remote-confirmed
    /// delete: sections, steps, edges, tag associations and reagent list.
    pub fn evict_protocol(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute(
                "DELETE FROM step_next_edges WHERE step_id IN
                     (SELECT id FROM protocol_steps WHERE protocol_id = ?1)",
                params![id],
            )?;
            tx.execute("DELETE FROM protocol_steps WHERE protocol_id = ?1", params![id])?;
            tx.execute("DELETE FROM protocol_sections WHERE protocol_id = ?1", params![id])?;
            tx.execute("DELETE FROM protocol_tags WHERE protocol_id = ?1", params![id])?;
            tx.execute("DELETE FROM protocol_reagents WHERE protocol_id = ?1", params![id])?;
            tx.execute("DELETE FROM protocols WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    // ── Granular step/section operations ─────────────────────────

    pub fn cache_protocol_step(&self, step: &ProtocolStep) -> StorageResult<()> {
        self.in_transaction(|tx| upsert_step(tx, step))
    }

    pub fn get_protocol_step(&self, id: i64) -> StorageResult<Option<ProtocolStep>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{STEP_SELECT} WHERE id = ?1"), params![id], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, Option<i64>>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, Option<i64>>(4)?,
                    r.get::<_, Option<String>>(5)?,
                    r.get::<_, Option<String>>(6)?,
                ))
            })
            .optional()?;
        let Some((id, protocol, step_section, step_description, step_duration, created_at, updated_at)) = row
        else {
            return Ok(None);
        };
        Ok(Some(ProtocolStep {
            id,
            protocol,
            step_section,
            step_description,
            step_duration,
            next_step: next_edges(&conn, id)?,
            created_at: db::ts_from_sql(created_at),
            updated_at: db::ts_from_sql(updated_at),
        }))
    }

    pub fn evict_protocol_step(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute("DELETE FROM step_next_edges WHERE step_id = ?1", params![id])?;
            // A deleted step also disappears from other steps' successor lists
            tx.execute("DELETE FROM step_next_edges WHERE next_step_id = ?1", params![id])?;
            tx.execute("DELETE FROM protocol_steps WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    pub fn cache_protocol_section(&self, section: &ProtocolSection) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        upsert_section(&conn, section)
    }

    pub fn get_protocol_section(&self, id: i64) -> StorageResult<Option<ProtocolSection>> {
        let conn = self.conn.lock().unwrap();
        let section = conn
            .query_row(&format!("{SECTION_SELECT} WHERE id = ?1"), params![id], section_from_row)
            .optional()?;
        Ok(section)
    }

    pub fn evict_protocol_section(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            // Steps keep their rows; their section link is cleared
            tx.execute(
                "UPDATE protocol_steps SET section_id = NULL WHERE section_id = ?1",
                params![id],
            )?;
            tx.execute("DELETE FROM protocol_sections WHERE id = ?1", params![id])?;
            Ok(())
        })
    }
}
