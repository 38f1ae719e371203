//! Stored-reagent service — the inventory workhorse.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Page, StoredReagent, StoredReagentRequest};
use std::sync::Arc;

pub struct StoredReagentService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl StoredReagentService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_stored_reagent(&self, id: i64) -> ServiceResult<StoredReagent> {
        fetch_one(
            self.api.get_stored_reagent(id),
            |stored| self.db.cache_stored_reagent(stored),
            || self.db.get_stored_reagent(id),
            "stored reagent",
        )
        .await
    }

    /// Lists stored reagents, optionally scoped to a storage object or
    /// filtered by reagent-name substring.
    pub async fn list_stored_reagents(
        &self,
        storage_object: Option<i64>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<StoredReagent>> {
        fetch_page(
            self.api.list_stored_reagents(storage_object, search, limit, offset),
            |stored| self.db.cache_stored_reagent(stored),
            || {
                Ok(Page::offline(
                    self.db.count_stored_reagents(storage_object, search)?,
                    self.db.list_stored_reagents(storage_object, search, limit, offset)?,
                ))
            },
            "stored reagents",
        )
        .await
    }

    pub async fn create_stored_reagent(
        &self,
        req: &StoredReagentRequest,
    ) -> ServiceResult<StoredReagent> {
        mutate(
            self.api.create_stored_reagent(req),
            |stored| self.db.cache_stored_reagent(stored),
            "stored reagent",
        )
        .await
    }

    pub async fn update_stored_reagent(
        &self,
        id: i64,
        req: &StoredReagentRequest,
    ) -> ServiceResult<StoredReagent> {
        mutate(
            self.api.update_stored_reagent(id, req),
            |stored| self.db.cache_stored_reagent(stored),
            "stored reagent",
        )
        .await
    }

    pub async fn delete_stored_reagent(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_stored_reagent(id),
            || self.db.evict_stored_reagent(id),
            "stored reagent",
        )
        .await
    }
}
