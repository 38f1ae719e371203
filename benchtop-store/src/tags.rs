//! Tag table. Shared with the protocol association table; the tag service
//! owns row content, the protocol service only writes associations.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use benchtop_types::Tag;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        tag: row.get(1)?,
        created_at: db::ts_from_sql(row.get(2)?),
        updated_at: db::ts_from_sql(row.get(3)?),
    })
}

pub(crate) fn upsert(conn: &Connection, tag: &Tag) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO tags (id, tag, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             tag = CASE WHEN excluded.tag != '' THEN excluded.tag ELSE tag END,
             created_at = COALESCE(excluded.created_at, created_at),
             updated_at = COALESCE(excluded.updated_at, updated_at)",
        params![
            tag.id,
            tag.tag,
            db::ts_to_sql(&tag.created_at),
            db::ts_to_sql(&tag.updated_at)
        ],
    )?;
    Ok(())
}

pub(crate) fn get(conn: &Connection, id: i64) -> StorageResult<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, tag, created_at, updated_at FROM tags WHERE id = ?1",
            params![id],
            from_row,
        )
        .optional()?;
    Ok(tag)
}

impl CacheDb {
    pub fn cache_tag(&self, tag: &Tag) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        upsert(&conn, tag)
    }

    pub fn get_tag(&self, id: i64) -> StorageResult<Option<Tag>> {
        let conn = self.conn.lock().unwrap();
        get(&conn, id)
    }

    pub fn list_tags(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from("SELECT id, tag, created_at, updated_at FROM tags");
        if search.is_some() {
            sql.push_str(" WHERE tag LIKE ?1");
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

    pub fn count_tags(&self, search: Option<&str>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match search {
            Some(search) => conn.query_row(
                "SELECT COUNT(*) FROM tags WHERE tag LIKE ?1",
                params![db::like_pattern(search)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Evicts a tag and its protocol associations after a remote-confirmed
    /// delete.
    pub fn evict_tag(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute("DELETE FROM protocol_tags WHERE tag_id = ?1", params![id])?;
            tx.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
            Ok(())
        })
    }
}
