//! Session service — string-keyed aggregates.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Page, Session, SessionRequest};
use std::sync::Arc;

pub struct SessionService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl SessionService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_session(&self, unique_id: &str) -> ServiceResult<Session> {
        fetch_one(
            self.api.get_session(unique_id),
            |session| self.db.cache_session(session),
            || self.db.get_session(unique_id),
            "session",
        )
        .await
    }

    pub async fn list_sessions(
        &self,
        protocol: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Session>> {
        fetch_page(
            self.api.list_sessions(protocol, limit, offset),
            |session| self.db.cache_session(session),
            || {
                Ok(Page::offline(
                    self.db.count_sessions(protocol)?,
                    self.db.list_sessions(protocol, limit, offset)?,
                ))
            },
            "sessions",
        )
        .await
    }

    pub async fn create_session(&self, req: &SessionRequest) -> ServiceResult<Session> {
        mutate(
            self.api.create_session(req),
            |session| self.db.cache_session(session),
            "session",
        )
        .await
    }

    pub async fn update_session(
        &self,
        unique_id: &str,
        req: &SessionRequest,
    ) -> ServiceResult<Session> {
        mutate(
            self.api.update_session(unique_id, req),
            |session| self.db.cache_session(session),
            "session",
        )
        .await
    }

    pub async fn delete_session(&self, unique_id: &str) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_session(unique_id),
            || self.db.evict_session(unique_id),
            "session",
        )
        .await
    }
}
