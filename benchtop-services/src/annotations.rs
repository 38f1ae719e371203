//! Annotation service.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{Annotation, AnnotationRequest, Page};
use std::sync::Arc;

pub struct AnnotationService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl AnnotationService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    pub async fn get_annotation(&self, id: i64) -> ServiceResult<Annotation> {
        fetch_one(
            self.api.get_annotation(id),
            |annotation| self.db.cache_annotation(annotation),
            || self.db.get_annotation(id),
            "annotation",
        )
        .await
    }

    /// Lists annotations for a step and/or session, newest first.
    pub async fn list_annotations(
        &self,
        step: Option<i64>,
        session: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Annotation>> {
        fetch_page(
            self.api.list_annotations(step, session, limit, offset),
            |annotation| self.db.cache_annotation(annotation),
            || {
                Ok(Page::offline(
                    self.db.count_annotations(step, session)?,
                    self.db.list_annotations(step, session, limit, offset)?,
                ))
            },
            "annotations",
        )
        .await
    }

    pub async fn create_annotation(&self, req: &AnnotationRequest) -> ServiceResult<Annotation> {
        mutate(
            self.api.create_annotation(req),
            |annotation| self.db.cache_annotation(annotation),
            "annotation",
        )
        .await
    }

    pub async fn update_annotation(
        &self,
        id: i64,
        req: &AnnotationRequest,
    ) -> ServiceResult<Annotation> {
        mutate(
            self.api.update_annotation(id, req),
            |annotation| self.db.cache_annotation(annotation),
            "annotation",
        )
        .await
    }

    pub async fn delete_annotation(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_annotation(id),
            || self.db.evict_annotation(id),
            "annotation",
        )
        .await
    }
}
