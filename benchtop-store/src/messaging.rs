//! Message threads and messages.
//!
//! Thread participants, message recipients and attachment metadata are
//! cross-reference/child tables fully replaced on each cache write — with
//! one exception: a recipient row whose read-state carries a pending local
//! receipt is preserved, so an optimistic read flag is not clobbered by a
//! stale remote copy before the receipt has been flushed.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::users;
use benchtop_types::{
    Message, MessageAttachment, MessagePriority, MessageRecipient, MessageThread, MessageType,
    UserBasic,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn message_type_from_str(s: &str) -> MessageType {
    match s {
        "system_notification" => MessageType::SystemNotification,
        "alert" => MessageType::Alert,
        "announcement" => MessageType::Announcement,
        _ => MessageType::UserMessage,
    }
}

fn priority_from_str(s: &str) -> MessagePriority {
    match s {
        "low" => MessagePriority::Low,
        "high" => MessagePriority::High,
        "urgent" => MessagePriority::Urgent,
        _ => MessagePriority::Normal,
    }
}

/// A locally applied read-state change awaiting remote confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReadReceipt {
    pub message_id: i64,
    pub user_id: i64,
    pub is_read: bool,
}

// ── Threads ──────────────────────────────────────────────────────

struct ThreadRow {
    id: i64,
    title: String,
    lab_group_id: Option<i64>,
    is_system_thread: bool,
    creator_id: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

const THREAD_SELECT: &str = "SELECT id, title, lab_group_id, is_system_thread, creator_id, \
                             created_at, updated_at FROM message_threads";

fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<ThreadRow> {
    Ok(ThreadRow {
        id: row.get(0)?,
        title: row.get(1)?,
        lab_group_id: row.get(2)?,
        is_system_thread: row.get(3)?,
        creator_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn rehydrate_thread(conn: &Connection, row: ThreadRow) -> StorageResult<MessageThread> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM thread_participants WHERE thread_id = ?1 ORDER BY user_id ASC",
    )?;
    let participant_ids: Vec<i64> = stmt
        .query_map(params![row.id], |r| r.get(0))?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);

    let mut participants = Vec::with_capacity(participant_ids.len());
    for user_id in participant_ids {
        participants
            .push(users::get(conn, user_id)?.unwrap_or_else(|| UserBasic::placeholder(user_id)));
    }

    Ok(MessageThread {
        id: row.id,
        title: row.title,
        participants,
        lab_group: row.lab_group_id,
        is_system_thread: row.is_system_thread,
        creator: users::resolve_fk(conn, row.creator_id)?,
        unread_count: None,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

// ── Messages ─────────────────────────────────────────────────────

struct MessageRow {
    id: i64,
    thread_id: i64,
    sender_id: Option<i64>,
    content: String,
    message_type: String,
    priority: String,
    created_at: Option<String>,
    updated_at: Option<String>,
}

const MESSAGE_SELECT: &str = "SELECT id, thread_id, sender_id, content, message_type, priority, \
                              created_at, updated_at FROM messages";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        message_type: row.get(4)?,
        priority: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn rehydrate_message(conn: &Connection, row: MessageRow) -> StorageResult<Message> {
    let mut stmt = conn.prepare(
        "SELECT user_id, is_read, read_at FROM message_recipients WHERE message_id = ?1 ORDER BY user_id ASC",
    )?;
    let recipient_rows: Vec<(i64, bool, Option<String>)> = stmt
        .query_map(params![row.id], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);

    let mut recipients = Vec::with_capacity(recipient_rows.len());
    for (user_id, is_read, read_at) in recipient_rows {
        recipients.push(MessageRecipient {
            user: users::get(conn, user_id)?.unwrap_or_else(|| UserBasic::placeholder(user_id)),
            is_read,
            read_at: db::ts_from_sql(read_at),
        });
    }

    let mut stmt = conn.prepare(
        "SELECT id, file_name, file_size, content_type FROM message_attachments \
         WHERE message_id = ?1 ORDER BY id ASC",
    )?;
    let attachments: Vec<MessageAttachment> = stmt
        .query_map(params![row.id], |r| {
            Ok(MessageAttachment {
                id: r.get(0)?,
                file_name: r.get(1)?,
                file_size: r.get(2)?,
                content_type: r.get(3)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();
    drop(stmt);

    Ok(Message {
        id: row.id,
        thread: row.thread_id,
        sender: users::resolve_fk(conn, row.sender_id)?,
        content: row.content,
        message_type: message_type_from_str(&row.message_type),
        priority: priority_from_str(&row.priority),
        recipients,
        attachments,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

impl CacheDb {
    // ── Threads ──────────────────────────────────────────────────

    pub fn cache_thread(&self, thread: &MessageThread) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &thread.creator)?;
            for participant in &thread.participants {
                users::upsert(tx, participant)?;
            }
            tx.execute(
                "INSERT OR REPLACE INTO message_threads
                     (id, title, lab_group_id, is_system_thread, creator_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    thread.id,
                    thread.title,
                    thread.lab_group,
                    thread.is_system_thread,
                    thread.creator.as_ref().map(|u| u.id),
                    db::ts_to_sql(&thread.created_at),
                    db::ts_to_sql(&thread.updated_at)
                ],
            )?;
            tx.execute(
                "DELETE FROM thread_participants WHERE thread_id = ?1",
                params![thread.id],
            )?;
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO thread_participants (thread_id, user_id) VALUES (?1, ?2)",
            )?;
            for participant in &thread.participants {
                stmt.execute(params![thread.id, participant.id])?;
            }
            Ok(())
        })
    }

    pub fn get_thread(&self, id: i64) -> StorageResult<Option<MessageThread>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{THREAD_SELECT} WHERE id = ?1"), params![id], thread_from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate_thread(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists threads, most recently active first.
    pub fn list_threads(&self, limit: i64, offset: i64) -> StorageResult<Vec<MessageThread>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(THREAD_SELECT);
        sql.push_str(" ORDER BY updated_at DESC, id DESC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<ThreadRow> = stmt
            .query_map([], thread_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut threads = Vec::with_capacity(rows.len());
        for row in rows {
            threads.push(rehydrate_thread(&conn, row)?);
        }
        Ok(threads)
    }

    pub fn count_threads(&self) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM message_threads", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Evicts a thread and everything under it: messages, recipient rows
    /// and attachment metadata.
    pub fn evict_thread(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute(
                "DELETE FROM message_recipients WHERE message_id IN
                     (SELECT id FROM messages WHERE thread_id = ?1)",
                params![id],
            )?;
            tx.execute(
                "DELETE FROM message_attachments WHERE message_id IN
                     (SELECT id FROM messages WHERE thread_id = ?1)",
                params![id],
            )?;
            tx.execute("DELETE FROM messages WHERE thread_id = ?1", params![id])?;
            tx.execute("DELETE FROM thread_participants WHERE thread_id = ?1", params![id])?;
            tx.execute("DELETE FROM message_threads WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    // ── Messages ─────────────────────────────────────────────────

    pub fn cache_message(&self, message: &Message) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &message.sender)?;
            tx.execute(
                "INSERT OR REPLACE INTO messages
                     (id, thread_id, sender_id, content, message_type, priority, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    message.id,
                    message.thread,
                    message.sender.as_ref().map(|u| u.id),
                    message.content,
                    message.message_type.as_str(),
                    message.priority.as_str(),
                    db::ts_to_sql(&message.created_at),
                    db::ts_to_sql(&message.updated_at)
                ],
            )?;

            // Replace recipient rows, but keep any row still carrying an
            // unflushed local read receipt.
            tx.execute(
                "DELETE FROM message_recipients WHERE message_id = ?1 AND pending_sync = 0",
                params![message.id],
            )?;
            let mut stmt = tx.prepare(
                "INSERT INTO message_recipients (message_id, user_id, is_read, read_at, pending_sync)
                 VALUES (?1, ?2, ?3, ?4, 0)
                 ON CONFLICT(message_id, user_id) DO UPDATE SET
                     is_read = CASE WHEN pending_sync = 1 THEN is_read ELSE excluded.is_read END,
                     read_at = CASE WHEN pending_sync = 1 THEN read_at ELSE excluded.read_at END",
            )?;
            for recipient in &message.recipients {
                users::upsert(tx, &recipient.user)?;
                stmt.execute(params![
                    message.id,
                    recipient.user.id,
                    recipient.is_read,
                    db::ts_to_sql(&recipient.read_at)
                ])?;
            }
            drop(stmt);

            tx.execute(
                "DELETE FROM message_attachments WHERE message_id = ?1",
                params![message.id],
            )?;
            let mut stmt = tx.prepare(
                "INSERT INTO message_attachments (id, message_id, file_name, file_size, content_type)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for attachment in &message.attachments {
                stmt.execute(params![
                    attachment.id,
                    message.id,
                    attachment.file_name,
                    attachment.file_size,
                    attachment.content_type
                ])?;
            }
            Ok(())
        })
    }

    pub fn get_message(&self, id: i64) -> StorageResult<Option<Message>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{MESSAGE_SELECT} WHERE id = ?1"), params![id], message_from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate_message(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists messages in a thread, newest first.
    pub fn list_messages(
        &self,
        thread: i64,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = format!("{MESSAGE_SELECT} WHERE thread_id = ?1");
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<MessageRow> = stmt
            .query_map(params![thread], message_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            messages.push(rehydrate_message(&conn, row)?);
        }
        Ok(messages)
    }

    pub fn count_messages(&self, thread: i64) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE thread_id = ?1",
            params![thread],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn evict_message(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute("DELETE FROM message_recipients WHERE message_id = ?1", params![id])?;
            tx.execute("DELETE FROM message_attachments WHERE message_id = ?1", params![id])?;
            tx.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    // ── Read receipts ────────────────────────────────────────────

    /// Applies a read-state change locally. `pending` marks the row as
    /// awaiting remote confirmation; a confirmed change clears the marker.
    pub fn set_read_state(
        &self,
        message_id: i64,
        user_id: i64,
        is_read: bool,
        read_at: Option<DateTime<Utc>>,
        pending: bool,
    ) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO message_recipients (message_id, user_id, is_read, read_at, pending_sync)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(message_id, user_id) DO UPDATE SET
                 is_read = excluded.is_read,
                 read_at = excluded.read_at,
                 pending_sync = excluded.pending_sync",
            params![message_id, user_id, is_read, db::ts_to_sql(&read_at), pending],
        )?;
        Ok(())
    }

    /// Read-state changes still awaiting remote confirmation.
    pub fn pending_read_receipts(&self) -> StorageResult<Vec<PendingReadReceipt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT message_id, user_id, is_read FROM message_recipients \
             WHERE pending_sync = 1 ORDER BY message_id ASC, user_id ASC",
        )?;
        let receipts = stmt
            .query_map([], |row| {
                Ok(PendingReadReceipt {
                    message_id: row.get(0)?,
                    user_id: row.get(1)?,
                    is_read: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(receipts)
    }

    pub fn clear_pending_receipt(&self, message_id: i64, user_id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE message_recipients SET pending_sync = 0 WHERE message_id = ?1 AND user_id = ?2",
            params![message_id, user_id],
        )?;
        Ok(())
    }
}
