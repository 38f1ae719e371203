//! Lab-group service.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{LabGroup, LabGroupRequest, Page};
use std::sync::Arc;

pub struct LabGroupService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl LabGroupService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_lab_group(&self, id: i64) -> ServiceResult<LabGroup> {
        fetch_one(
            self.api.get_lab_group(id),
            |group| self.db.cache_lab_group(group),
            || self.db.get_lab_group(id),
            "lab group",
        )
        .await
    }

    pub async fn list_lab_groups(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<LabGroup>> {
        fetch_page(
            self.api.list_lab_groups(search, limit, offset),
            |group| self.db.cache_lab_group(group),
            || {
                Ok(Page::offline(
                    self.db.count_lab_groups(search)?,
                    self.db.list_lab_groups(search, limit, offset)?,
                ))
            },
            "lab groups",
        )
        .await
    }

    pub async fn create_lab_group(&self, req: &LabGroupRequest) -> ServiceResult<LabGroup> {
        mutate(
            self.api.create_lab_group(req),
            |group| self.db.cache_lab_group(group),
            "lab group",
        )
        .await
    }

    pub async fn update_lab_group(&self, id: i64, req: &LabGroupRequest) -> ServiceResult<LabGroup> {
        mutate(
            self.api.update_lab_group(id, req),
            |group| self.db.cache_lab_group(group),
            "lab group",
        )
        .await
    }

    pub async fn delete_lab_group(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_lab_group(id),
            || self.db.evict_lab_group(id),
            "lab group",
        )
        .await
    }
}
