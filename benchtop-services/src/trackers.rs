//! Import-tracker service. Trackers are created by server-side import
//! jobs; the client only reads and deletes them.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{ImportTracker, Page};
use std::sync::Arc;

pub struct ImportTrackerService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl ImportTrackerService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_import_tracker(&self, id: i64) -> ServiceResult<ImportTracker> {
        fetch_one(
            self.api.get_import_tracker(id),
            |tracker| self.db.cache_import_tracker(tracker),
            || self.db.get_import_tracker(id),
            "import tracker",
        )
        .await
    }

    pub async fn list_import_trackers(
        &self,
        user: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<ImportTracker>> {
        fetch_page(
            self.api.list_import_trackers(user, limit, offset),
            |tracker| self.db.cache_import_tracker(tracker),
            || {
                Ok(Page::offline(
                    self.db.count_import_trackers(user)?,
                    self.db.list_import_trackers(user, limit, offset)?,
                ))
            },
            "import trackers",
        )
        .await
    }

    pub async fn delete_import_tracker(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_import_tracker(id),
            || self.db.evict_import_tracker(id),
            "import tracker",
        )
        .await
    }
}
