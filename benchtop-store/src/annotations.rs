//! Annotation rows. Step and session references stay scalar foreign keys;
//! the embedded user flattens into the shared side-table.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::users;
use benchtop_types::{Annotation, AnnotationType};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn annotation_type_from_str(s: &str) -> AnnotationType {
    match s {
        "file" => AnnotationType::File,
        "image" => AnnotationType::Image,
        "video" => AnnotationType::Video,
        "audio" => AnnotationType::Audio,
        "sketch" => AnnotationType::Sketch,
        "checklist" => AnnotationType::Checklist,
        "counter" => AnnotationType::Counter,
        "table" => AnnotationType::Table,
        _ => AnnotationType::Text,
    }
}

struct AnnotationRow {
    id: i64,
    step_id: Option<i64>,
    session_id: Option<String>,
    annotation: String,
    annotation_type: String,
    file: Option<String>,
    transcribed: bool,
    transcription: Option<String>,
    language: Option<String>,
    scratched: bool,
    summary: Option<String>,
    user_id: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<AnnotationRow> {
    Ok(AnnotationRow {
        id: row.get(0)?,
        step_id: row.get(1)?,
        session_id: row.get(2)?,
        annotation: row.get(3)?,
        annotation_type: row.get(4)?,
        file: row.get(5)?,
        transcribed: row.get(6)?,
        transcription: row.get(7)?,
        language: row.get(8)?,
        scratched: row.get(9)?,
        summary: row.get(10)?,
        user_id: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

const SELECT: &str = "SELECT id, step_id, session_id, annotation, annotation_type, file, \
                      transcribed, transcription, language, scratched, summary, user_id, \
                      created_at, updated_at FROM annotations";

fn rehydrate(conn: &Connection, row: AnnotationRow) -> StorageResult<Annotation> {
    Ok(Annotation {
        id: row.id,
        step: row.step_id,
        session: row.session_id,
        annotation: row.annotation,
        annotation_type: annotation_type_from_str(&row.annotation_type),
        file: row.file,
        transcribed: row.transcribed,
        transcription: row.transcription,
        language: row.language,
        scratched: row.scratched,
        summary: row.summary,
        user: users::resolve_fk(conn, row.user_id)?,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    pub fn cache_annotation(&self, annotation: &Annotation) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &annotation.user)?;
            tx.execute(
                "INSERT OR REPLACE INTO annotations
                     (id, step_id, session_id, annotation, annotation_type, file, transcribed,
                      transcription, language, scratched, summary, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    annotation.id,
                    annotation.step,
                    annotation.session,
                    annotation.annotation,
                    annotation.annotation_type.as_str(),
                    annotation.file,
                    annotation.transcribed,
                    annotation.transcription,
                    annotation.language,
                    annotation.scratched,
                    annotation.summary,
                    annotation.user.as_ref().map(|u| u.id),
                    db::ts_to_sql(&annotation.created_at),
                    db::ts_to_sql(&annotation.updated_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_annotation(&self, id: i64) -> StorageResult<Option<Annotation>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists annotations scoped by step and/or session, newest first —
    /// the ordering the remote annotation feed uses.
    pub fn list_annotations(
        &self,
        step: Option<i64>,
        session: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Annotation>> {
        let conn = self.conn.lock().unwrap();
        let (mut sql, args) = filtered_sql(SELECT, step, session);
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<AnnotationRow> = stmt
            .query_map(db::param_refs(&args).as_slice(), from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut annotations = Vec::with_capacity(rows.len());
        for row in rows {
            annotations.push(rehydrate(&conn, row)?);
        }
        Ok(annotations)
    }

    pub fn count_annotations(
        &self,
        step: Option<i64>,
        session: Option<&str>,
    ) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let (sql, args) = filtered_sql("SELECT COUNT(*) FROM annotations", step, session);
        let count = conn.query_row(&sql, db::param_refs(&args).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    pub fn evict_annotation(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM annotations WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn filtered_sql(
    base: &str,
    step: Option<i64>,
    session: Option<&str>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut sql = String::from(base);
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let mut clause = " WHERE";
    if let Some(step) = step {
        args.push(Box::new(step));
        sql.push_str(&format!("{clause} step_id = ?{}", args.len()));
        clause = " AND";
    }
    if let Some(session) = session {
        args.push(Box::new(session.to_string()));
        sql.push_str(&format!("{clause} session_id = ?{}", args.len()));
    }
    (sql, args)
}
