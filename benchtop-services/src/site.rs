//! Site-settings service — a remote singleton.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, mutate};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{SiteSettings, SiteSettingsRequest};
use std::sync::Arc;

pub struct SiteService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl SiteService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_site_settings(&self) -> ServiceResult<SiteSettings> {
        fetch_one(
            self.api.get_site_settings(),
            |settings| self.db.cache_site_settings(settings),
            || self.db.get_site_settings(),
            "site settings",
        )
        .await
    }

    pub async fn update_site_settings(
        &self,
        req: &SiteSettingsRequest,
    ) -> ServiceResult<SiteSettings> {
        mutate(
            self.api.update_site_settings(req),
            |settings| self.db.cache_site_settings(settings),
            "site settings",
        )
        .await
    }
}
