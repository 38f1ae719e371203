//! Messaging service: threads, messages and read receipts.
//!
//! Read receipts are the one deliberate exception to the remote-first
//! write rule: the local flag flips immediately with a pending marker so
//! the UI stays responsive, and [`MessagingService::flush_pending_read_receipts`]
//! retries unconfirmed receipts when connectivity returns.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Message, MessageRequest, MessageThread, Page, ThreadRequest};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MessagingService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl MessagingService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    // ── Threads ──────────────────────────────────────────────────

    pub async fn get_thread(&self, id: i64) -> ServiceResult<MessageThread> {
        fetch_one(
            self.api.get_thread(id),
            |thread| self.db.cache_thread(thread),
            || self.db.get_thread(id),
            "message thread",
        )
        .await
    }

    pub async fn list_threads(&self, limit: i64, offset: i64) -> ServiceResult<Page<MessageThread>> {
        fetch_page(
            self.api.list_threads(limit, offset),
            |thread| self.db.cache_thread(thread),
            || {
                Ok(Page::offline(
                    self.db.count_threads()?,
                    self.db.list_threads(limit, offset)?,
                ))
            },
            "message threads",
        )
        .await
    }

    pub async fn create_thread(&self, req: &ThreadRequest) -> ServiceResult<MessageThread> {
        mutate(
            self.api.create_thread(req),
            |thread| self.db.cache_thread(thread),
            "message thread",
        )
        .await
    }

    pub async fn delete_thread(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(self.api.delete_thread(id), || self.db.evict_thread(id), "message thread")
            .await
    }

    // ── Messages ─────────────────────────────────────────────────

    pub async fn get_message(&self, id: i64) -> ServiceResult<Message> {
        fetch_one(
            self.api.get_message(id),
            |message| self.db.cache_message(message),
            || self.db.get_message(id),
            "message",
        )
        .await
    }

    /// Lists a thread's messages, newest first.
    pub async fn list_messages(
        &self,
        thread: i64,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Message>> {
        fetch_page(
            self.api.list_messages(thread, limit, offset),
            |message| self.db.cache_message(message),
            || {
                Ok(Page::offline(
                    self.db.count_messages(thread)?,
                    self.db.list_messages(thread, limit, offset)?,
                ))
            },
            "messages",
        )
        .await
    }

    pub async fn send_message(&self, req: &MessageRequest) -> ServiceResult<Message> {
        mutate(
            self.api.send_message(req),
            |message| self.db.cache_message(message),
            "message",
        )
        .await
    }

    // ── Read receipts ────────────────────────────────────────────

    /// Marks a message read for the current user.
    ///
    /// The local flag is applied immediately with a pending marker; the
    /// remote receipt is attempted in the same call, and a network failure
    /// leaves the marker in place for a later flush instead of surfacing.
    pub async fn mark_read(&self, message_id: i64, user_id: i64) -> ServiceResult<()> {
        self.db
            .set_read_state(message_id, user_id, true, Some(Utc::now()), true)?;
        match self.api.mark_message_read(message_id).await {
            Ok(message) => {
                self.db.clear_pending_receipt(message_id, user_id)?;
                if let Err(e) = self.db.cache_message(&message) {
                    warn!("cache write failed after read receipt for message {message_id}: {e}");
                }
                Ok(())
            }
            Err(e) => {
                debug!("read receipt for message {message_id} deferred: {e}");
                Ok(())
            }
        }
    }

    /// Marks a message unread for the current user; same two-phase scheme
    /// as [`Self::mark_read`].
    pub async fn mark_unread(&self, message_id: i64, user_id: i64) -> ServiceResult<()> {
        self.db
            .set_read_state(message_id, user_id, false, None, true)?;
        match self.api.mark_message_unread(message_id).await {
            Ok(message) => {
                self.db.clear_pending_receipt(message_id, user_id)?;
                if let Err(e) = self.db.cache_message(&message) {
                    warn!("cache write failed after unread receipt for message {message_id}: {e}");
                }
                Ok(())
            }
            Err(e) => {
                debug!("unread receipt for message {message_id} deferred: {e}");
                Ok(())
            }
        }
    }

    /// Retries every receipt still awaiting remote confirmation. Returns
    /// the number flushed; receipts that fail again stay pending.
    pub async fn flush_pending_read_receipts(&self) -> ServiceResult<usize> {
        let pending = self.db.pending_read_receipts()?;
        let mut flushed = 0;
        for receipt in pending {
            let result = if receipt.is_read {
                self.api.mark_message_read(receipt.message_id).await
            } else {
                self.api.mark_message_unread(receipt.message_id).await
            };
            match result {
                Ok(message) => {
                    self.db
                        .clear_pending_receipt(receipt.message_id, receipt.user_id)?;
                    if let Err(e) = self.db.cache_message(&message) {
                        warn!(
                            "cache write failed while flushing receipt for message {}: {e}",
                            receipt.message_id
                        );
                    }
                    flushed += 1;
                }
                Err(e) => {
                    debug!(
                        "receipt for message {} still deferred: {e}",
                        receipt.message_id
                    );
                }
            }
        }
        Ok(flushed)
    }
}
