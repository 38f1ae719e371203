//! Storage-object service.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Page, StorageObject, StorageObjectRequest};
use std::sync::Arc;

pub struct StorageService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl StorageService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_storage_object(&self, id: i64) -> ServiceResult<StorageObject> {
        fetch_one(
            self.api.get_storage_object(id),
            |object| self.db.cache_storage_object(object),
            || self.db.get_storage_object(id),
            "storage object",
        )
        .await
    }

    /// Lists storage locations, optionally the children of one parent or
    /// those matching a name substring.
    pub async fn list_storage_objects(
        &self,
        stored_at: Option<i64>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<StorageObject>> {
        fetch_page(
            self.api.list_storage_objects(stored_at, search, limit, offset),
            |object| self.db.cache_storage_object(object),
            || {
                Ok(Page::offline(
                    self.db.count_storage_objects(stored_at, search)?,
                    self.db.list_storage_objects(stored_at, search, limit, offset)?,
                ))
            },
            "storage objects",
        )
        .await
    }

    pub async fn create_storage_object(
        &self,
        req: &StorageObjectRequest,
    ) -> ServiceResult<StorageObject> {
        mutate(
            self.api.create_storage_object(req),
            |object| self.db.cache_storage_object(object),
            "storage object",
        )
        .await
    }

    pub async fn update_storage_object(
        &self,
        id: i64,
        req: &StorageObjectRequest,
    ) -> ServiceResult<StorageObject> {
        mutate(
            self.api.update_storage_object(id, req),
            |object| self.db.cache_storage_object(object),
            "storage object",
        )
        .await
    }

    pub async fn delete_storage_object(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_storage_object(id),
            || self.db.evict_storage_object(id),
            "storage object",
        )
        .await
    }
}
