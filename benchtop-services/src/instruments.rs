//! Instrument domain service: instruments, usage bookings, maintenance
//! logs and support information.

use crate::error::ServiceResult;
use crate::reconcile::{fetch_one, fetch_page, mutate, mutate_delete};
use benchtop_cloud::ApiClient;
use benchtop_store::CacheDb;
use benchtop_types::{
    Instrument, InstrumentRequest, InstrumentUsage, InstrumentUsageRequest, MaintenanceLog,
    MaintenanceLogRequest, Page, SupportInformation, SupportInformationRequest,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct InstrumentService {
    api: Arc<ApiClient>,
    db: CacheDb,
}

impl InstrumentService {
    pub fn new(api: Arc<ApiClient>, db: CacheDb) -> Self {
        Self { api, db }
    }

    // ── Instruments ──────────────────────────────────────────────

    pub async fn get_instrument(&self, id: i64) -> ServiceResult<Instrument> {
        fetch_one(
            self.api.get_instrument(id),
            |instrument| self.db.cache_instrument(instrument),
            || self.db.get_instrument_by_id(id),
            "instrument",
        )
        .await
    }

    pub async fn list_instruments(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<Instrument>> {
        fetch_page(
            self.api.list_instruments(search, limit, offset),
            |instrument| self.db.cache_instrument(instrument),
            || {
                Ok(Page::offline(
                    self.db.count_instruments(search)?,
                    self.db.list_instruments(search, limit, offset)?,
                ))
            },
            "instruments",
        )
        .await
    }

    pub async fn create_instrument(&self, req: &InstrumentRequest) -> ServiceResult<Instrument> {
        mutate(
            self.api.create_instrument(req),
            |instrument| self.db.cache_instrument(instrument),
            "instrument",
        )
        .await
    }

    pub async fn update_instrument(
        &self,
        id: i64,
        req: &InstrumentRequest,
    ) -> ServiceResult<Instrument> {
        mutate(
            self.api.update_instrument(id, req),
            |instrument| self.db.cache_instrument(instrument),
            "instrument",
        )
        .await
    }

    pub async fn delete_instrument(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_instrument(id),
            || self.db.evict_instrument(id),
            "instrument",
        )
        .await
    }

    // ── Usage bookings ───────────────────────────────────────────

    pub async fn get_usage(&self, id: i64) -> ServiceResult<InstrumentUsage> {
        fetch_one(
            self.api.get_instrument_usage(id),
            |usage| self.db.cache_instrument_usage(usage),
            || self.db.get_instrument_usage(id),
            "instrument usage",
        )
        .await
    }

    /// Lists usage windows for the booking calendar, optionally scoped to
    /// one instrument and/or a start-time range.
    pub async fn list_usage(
        &self,
        instrument: Option<i64>,
        started_after: Option<DateTime<Utc>>,
        started_before: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<InstrumentUsage>> {
        fetch_page(
            self.api
                .list_instrument_usage(instrument, started_after, started_before, limit, offset),
            |usage| self.db.cache_instrument_usage(usage),
            || {
                Ok(Page::offline(
                    self.db
                        .count_instrument_usage(instrument, started_after, started_before)?,
                    self.db.list_instrument_usage(
                        instrument,
                        started_after,
                        started_before,
                        limit,
                        offset,
                    )?,
                ))
            },
            "instrument usage",
        )
        .await
    }

    pub async fn create_usage(&self, req: &InstrumentUsageRequest) -> ServiceResult<InstrumentUsage> {
        mutate(
            self.api.create_instrument_usage(req),
            |usage| self.db.cache_instrument_usage(usage),
            "instrument usage",
        )
        .await
    }

    pub async fn update_usage(
        &self,
        id: i64,
        req: &InstrumentUsageRequest,
    ) -> ServiceResult<InstrumentUsage> {
        mutate(
            self.api.update_instrument_usage(id, req),
            |usage| self.db.cache_instrument_usage(usage),
            "instrument usage",
        )
        .await
    }

    pub async fn delete_usage(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_instrument_usage(id),
            || self.db.evict_instrument_usage(id),
            "instrument usage",
        )
        .await
    }

    // ── Maintenance logs ─────────────────────────────────────────

    pub async fn get_maintenance_log(&self, id: i64) -> ServiceResult<MaintenanceLog> {
        fetch_one(
            self.api.get_maintenance_log(id),
            |log| self.db.cache_maintenance_log(log),
            || self.db.get_maintenance_log(id),
            "maintenance log",
        )
        .await
    }

    pub async fn list_maintenance_logs(
        &self,
        instrument: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<MaintenanceLog>> {
        fetch_page(
            self.api.list_maintenance_logs(instrument, limit, offset),
            |log| self.db.cache_maintenance_log(log),
            || {
                Ok(Page::offline(
                    self.db.count_maintenance_logs(instrument)?,
                    self.db.list_maintenance_logs(instrument, limit, offset)?,
                ))
            },
            "maintenance logs",
        )
        .await
    }

    pub async fn create_maintenance_log(
        &self,
        req: &MaintenanceLogRequest,
    ) -> ServiceResult<MaintenanceLog> {
        mutate(
            self.api.create_maintenance_log(req),
            |log| self.db.cache_maintenance_log(log),
            "maintenance log",
        )
        .await
    }

    pub async fn update_maintenance_log(
        &self,
        id: i64,
        req: &MaintenanceLogRequest,
    ) -> ServiceResult<MaintenanceLog> {
        mutate(
            self.api.update_maintenance_log(id, req),
            |log| self.db.cache_maintenance_log(log),
            "maintenance log",
        )
        .await
    }

    pub async fn delete_maintenance_log(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_maintenance_log(id),
            || self.db.evict_maintenance_log(id),
            "maintenance log",
        )
        .await
    }

    // ── Support information ──────────────────────────────────────

    pub async fn get_support_information(&self, id: i64) -> ServiceResult<SupportInformation> {
        fetch_one(
            self.api.get_support_information(id),
            |info| self.db.cache_support_information(info),
            || self.db.get_support_information(id),
            "support information",
        )
        .await
    }

    pub async fn list_support_information(
        &self,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Page<SupportInformation>> {
        fetch_page(
            self.api.list_support_information(limit, offset),
            |info| self.db.cache_support_information(info),
            || {
                Ok(Page::offline(
                    self.db.count_support_information()?,
                    self.db.list_support_information(limit, offset)?,
                ))
            },
            "support information",
        )
        .await
    }

    pub async fn create_support_information(
        &self,
        req: &SupportInformationRequest,
    ) -> ServiceResult<SupportInformation> {
        mutate(
            self.api.create_support_information(req),
            |info| self.db.cache_support_information(info),
            "support information",
        )
        .await
    }

    pub async fn update_support_information(
        &self,
        id: i64,
        req: &SupportInformationRequest,
    ) -> ServiceResult<SupportInformation> {
        mutate(
            self.api.update_support_information(id, req),
            |info| self.db.cache_support_information(info),
            "support information",
        )
        .await
    }

    pub async fn delete_support_information(&self, id: i64) -> ServiceResult<()> {
        mutate_delete(
            self.api.delete_support_information(id),
            || self.db.evict_support_information(id),
            "support information",
        )
        .await
    }
}
