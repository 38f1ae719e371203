//! Reagent service.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Page, Reagent, ReagentRequest};
use std::sync::Arc;

pub struct ReagentService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl ReagentService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_reagent(&self, id: i64) -> ServiceResult<Reagent> {
        fetch_one(
            self.api.get_reagent(id),
            |reagent| self.db.cache_reagent(reagent),
            || self.db.get_reagent(id),
            "reagent",
        )
        .await
    }

    pub async fn list_reagents(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Reagent>> {
        fetch_page(
            self.api.list_reagents(search, limit, offset),
            |reagent| self.db.cache_reagent(reagent),
            || {
                Ok(Page::offline(
                    self.db.count_reagents(search)?,
                    self.db.list_reagents(search, limit, offset)?,
                ))
            },
            "reagents",
        )
        .await
    }

    pub async fn create_reagent(&self, req: &ReagentRequest) -> ServiceResult<Reagent> {
        mutate(
            self.api.create_reagent(req),
            |reagent| self.db.cache_reagent(reagent),
            "reagent",
        )
        .await
    }

    pub async fn update_reagent(&self, id: i64, req: &ReagentRequest) -> ServiceResult<Reagent> {
        mutate(
            self.api.update_reagent(id, req),
            |reagent| self.db.cache_reagent(reagent),
            "reagent",
        )
        .await
    }

    pub async fn delete_reagent(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(self.api.delete_reagent(id), || self.db.evict_reagent(id), "reagent").await
    }
}
