//! Protocol service: the protocol aggregate plus granular step and
//! section operations, and tag association management.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{
    Page, Protocol, ProtocolRequest, ProtocolSection, ProtocolSectionRequest, ProtocolStep,
    ProtocolStepRequest,
};
use std::sync::Arc;

pub struct ProtocolService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl ProtocolService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    // ── Protocols ────────────────────────────────────────────────

    pub async fn get_protocol(&self, id: i64) -> ServiceResult<Protocol> {
        fetch_one(
            self.api.get_protocol(id),
            |protocol| self.db.cache_protocol(protocol),
            || self.db.get_protocol(id),
            "protocol",
        )
        .await
    }

    pub async fn list_protocols(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Protocol>> {
        fetch_page(
            self.api.list_protocols(search, limit, offset),
            |protocol| self.db.cache_protocol(protocol),
            || {
                Ok(Page::offline(
                    self.db.count_protocols(search)?,
                    self.db.list_protocols(search, limit, offset)?,
                ))
            },
            "protocols",
        )
        .await
    }

    pub async fn create_protocol(&self, req: &ProtocolRequest) -> ServiceResult<Protocol> {
        mutate(
            self.api.create_protocol(req),
            |protocol| self.db.cache_protocol(protocol),
            "protocol",
        )
        .await
    }

    pub async fn update_protocol(&self, id: i64, req: &ProtocolRequest) -> ServiceResult<Protocol> {
        mutate(
            self.api.update_protocol(id, req),
            |protocol| self.db.cache_protocol(protocol),
            "protocol",
        )
        .await
    }

    pub async fn delete_protocol(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_protocol(id),
            || self.db.evict_protocol(id),
            "protocol",
        )
        .await
    }

    /// Attaches a tag; the remote returns the updated protocol, which
    /// refreshes the cached association set wholesale.
    pub async fn add_tag(&self, protocol_id: i64, tag_id: i64) -> ServiceResult<Protocol> {
        mutate(
            self.api.add_protocol_tag(protocol_id, tag_id),
            |protocol| self.db.cache_protocol(protocol),
            "protocol tag",
        )
        .await
    }

    pub async fn remove_tag(&self, protocol_id: i64, tag_id: i64) -> ServiceResult<Protocol> {
        mutate(
            self.api.remove_protocol_tag(protocol_id, tag_id),
            |protocol| self.db.cache_protocol(protocol),
            "protocol tag",
        )
        .await
    }

    // ── Steps ────────────────────────────────────────────────────

    pub async fn get_step(&self, id: i64) -> ServiceResult<ProtocolStep> {
        fetch_one(
            self.api.get_step(id),
            |step| self.db.cache_protocol_step(step),
            || self.db.get_protocol_step(id),
            "protocol step",
        )
        .await
    }

    pub async fn create_step(&self, req: &ProtocolStepRequest) -> ServiceResult<ProtocolStep> {
        mutate(
            self.api.create_step(req),
            |step| self.db.cache_protocol_step(step),
            "protocol step",
        )
        .await
    }

    pub async fn update_step(
        &self,
        id: i64,
        req: &ProtocolStepRequest,
    ) -> ServiceResult<ProtocolStep> {
        mutate(
            self.api.update_step(id, req),
            |step| self.db.cache_protocol_step(step),
            "protocol step",
        )
        .await
    }

    pub async fn delete_step(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_step(id),
            || self.db.evict_protocol_step(id),
            "protocol step",
        )
        .await
    }

    // ── Sections ─────────────────────────────────────────────────

    pub async fn get_section(&self, id: i64) -> ServiceResult<ProtocolSection> {
        fetch_one(
            self.api.get_section(id),
            |section| self.db.cache_protocol_section(section),
            || self.db.get_protocol_section(id),
            "protocol section",
        )
        .await
    }

    pub async fn create_section(
        &self,
        req: &ProtocolSectionRequest,
    ) -> ServiceResult<ProtocolSection> {
        mutate(
            self.api.create_section(req),
            |section| self.db.cache_protocol_section(section),
            "protocol section",
        )
        .await
    }

    pub async fn update_section(
        &self,
        id: i64,
        req: &ProtocolSectionRequest,
    ) -> ServiceResult<ProtocolSection> {
        mutate(
            self.api.update_section(id, req),
            |section| self.db.cache_protocol_section(section),
            "protocol section",
        )
        .await
    }

    pub async fn delete_section(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_section(id),
            || self.db.evict_protocol_section(id),
            "protocol section",
        )
        .await
    }
}
