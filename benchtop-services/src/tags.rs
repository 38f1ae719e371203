//! Tag service.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Page, Tag, TagRequest};
use std::sync::Arc;

pub struct TagService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl TagService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_tag(&self, id: i64) -> ServiceResult<Tag> {
        fetch_one(
            self.api.get_tag(id),
            |tag| self.db.cache_tag(tag),
            || self.db.get_tag(id),
            "tag",
        )
        .await
    }

    pub async fn list_tags(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Tag>> {
        fetch_page(
            self.api.list_tags(search, limit, offset),
            |tag| self.db.cache_tag(tag),
            || {
                Ok(Page::offline(
                    self.db.count_tags(search)?,
                    self.db.list_tags(search, limit, offset)?,
                ))
            },
            "tags",
        )
        .await
    }

    pub async fn create_tag(&self, req: &TagRequest) -> ServiceResult<Tag> {
        mutate(self.api.create_tag(req), |tag| self.db.cache_tag(tag), "tag").await
    }

    pub async fn update_tag(&self, id: i64, req: &TagRequest) -> ServiceResult<Tag> {
        mutate(self.api.update_tag(id, req), |tag| self.db.cache_tag(tag), "tag").await
    }

    pub async fn delete_tag(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(self.api.delete_tag(id), || self.db.evict_tag(id), "tag").await
    }
}
