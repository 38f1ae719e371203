//! HTTP client for the Benchtop REST API.
//!
//! One method per remote endpoint; list endpoints return the shared
//! [`Page`] envelope. Authentication is a pre-set bearer token — session
//! establishment lives outside this layer.

use crate::config::ApiConfig;
use crate::error::{RemoteError, RemoteResult};
use benchtop_types::*;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// HTTP client for the Benchtop control plane.
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets the bearer token (restored from the platform keystore).
    pub async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn get_token(&self) -> RemoteResult<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(RemoteError::AuthRequired)
    }

    // ── Request helpers ──────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> RemoteResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let token = self.get_token().await?;
        debug!("GET {path}");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RemoteError::Api(e.to_string()))?;
        Ok(resp.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> RemoteResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let token = self.get_token().await?;
        debug!("POST {path}");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RemoteError::Api(e.to_string()))?;
        Ok(resp.json().await?)
    }

    async fn patch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> RemoteResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let token = self.get_token().await?;
        debug!("PATCH {path}");
        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RemoteError::Api(e.to_string()))?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, path: &str) -> RemoteResult<()> {
        let url = format!("{}{}", self.config.base_url, path);
        let token = self.get_token().await?;
        debug!("DELETE {path}");
        self.client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| RemoteError::Api(e.to_string()))?;
        Ok(())
    }

    // ── Tags ─────────────────────────────────────────────────────

    pub async fn list_tags(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Tag>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/tag/", &query).await
    }

    pub async fn get_tag(&self, id: i64) -> RemoteResult<Tag> {
        self.get_json(&format!("/api/tag/{id}/"), &[]).await
    }

    pub async fn create_tag(&self, req: &TagRequest) -> RemoteResult<Tag> {
        self.post_json("/api/tag/", req).await
    }

    pub async fn update_tag(&self, id: i64, req: &TagRequest) -> RemoteResult<Tag> {
        self.patch_json(&format!("/api/tag/{id}/"), req).await
    }

    pub async fn delete_tag(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/tag/{id}/")).await
    }

    // ── Reagents ─────────────────────────────────────────────────

    pub async fn list_reagents(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Reagent>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/reagent/", &query).await
    }

    pub async fn get_reagent(&self, id: i64) -> RemoteResult<Reagent> {
        self.get_json(&format!("/api/reagent/{id}/"), &[]).await
    }

    pub async fn create_reagent(&self, req: &ReagentRequest) -> RemoteResult<Reagent> {
        self.post_json("/api/reagent/", req).await
    }

    pub async fn update_reagent(&self, id: i64, req: &ReagentRequest) -> RemoteResult<Reagent> {
        self.patch_json(&format!("/api/reagent/{id}/"), req).await
    }

    pub async fn delete_reagent(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/reagent/{id}/")).await
    }

    // ── Stored reagents ──────────────────────────────────────────

    pub async fn list_stored_reagents(
        &self,
        storage_object: Option<i64>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<StoredReagent>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "storage_object", storage_object.map(|v| v.to_string()));
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/stored_reagent/", &query).await
    }

    pub async fn get_stored_reagent(&self, id: i64) -> RemoteResult<StoredReagent> {
        self.get_json(&format!("/api/stored_reagent/{id}/"), &[]).await
    }

    pub async fn create_stored_reagent(
        &self,
        req: &StoredReagentRequest,
    ) -> RemoteResult<StoredReagent> {
        self.post_json("/api/stored_reagent/", req).await
    }

    pub async fn update_stored_reagent(
        &self,
        id: i64,
        req: &StoredReagentRequest,
    ) -> RemoteResult<StoredReagent> {
        self.patch_json(&format!("/api/stored_reagent/{id}/"), req).await
    }

    pub async fn delete_stored_reagent(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/stored_reagent/{id}/")).await
    }

    // ── Storage objects ──────────────────────────────────────────

    pub async fn list_storage_objects(
        &self,
        stored_at: Option<i64>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<StorageObject>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "stored_at", stored_at.map(|v| v.to_string()));
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/storage_object/", &query).await
    }

    pub async fn get_storage_object(&self, id: i64) -> RemoteResult<StorageObject> {
        self.get_json(&format!("/api/storage_object/{id}/"), &[]).await
    }

    pub async fn create_storage_object(
        &self,
        req: &StorageObjectRequest,
    ) -> RemoteResult<StorageObject> {
        self.post_json("/api/storage_object/", req).await
    }

    pub async fn update_storage_object(
        &self,
        id: i64,
        req: &StorageObjectRequest,
    ) -> RemoteResult<StorageObject> {
        self.patch_json(&format!("/api/storage_object/{id}/"), req).await
    }

    pub async fn delete_storage_object(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/storage_object/{id}/")).await
    }

    // ── Protocols ────────────────────────────────────────────────

    pub async fn list_protocols(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Protocol>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/protocol/", &query).await
    }

    pub async fn get_protocol(&self, id: i64) -> RemoteResult<Protocol> {
        self.get_json(&format!("/api/protocol/{id}/"), &[]).await
    }

    pub async fn create_protocol(&self, req: &ProtocolRequest) -> RemoteResult<Protocol> {
        self.post_json("/api/protocol/", req).await
    }

    pub async fn update_protocol(&self, id: i64, req: &ProtocolRequest) -> RemoteResult<Protocol> {
        self.patch_json(&format!("/api/protocol/{id}/"), req).await
    }

    pub async fn delete_protocol(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/protocol/{id}/")).await
    }

    pub async fn add_protocol_tag(&self, protocol_id: i64, tag_id: i64) -> RemoteResult<Protocol> {
        self.post_json(
            &format!("/api/protocol/{protocol_id}/add_tag/"),
            &serde_json::json!({ "tag": tag_id }),
        )
        .await
    }

    pub async fn remove_protocol_tag(
        &self,
        protocol_id: i64,
        tag_id: i64,
    ) -> RemoteResult<Protocol> {
        self.post_json(
            &format!("/api/protocol/{protocol_id}/remove_tag/"),
            &serde_json::json!({ "tag": tag_id }),
        )
        .await
    }

    // ── Protocol steps & sections ────────────────────────────────

    pub async fn get_step(&self, id: i64) -> RemoteResult<ProtocolStep> {
        self.get_json(&format!("/api/step/{id}/"), &[]).await
    }

    pub async fn create_step(&self, req: &ProtocolStepRequest) -> RemoteResult<ProtocolStep> {
        self.post_json("/api/step/", req).await
    }

    pub async fn update_step(
        &self,
        id: i64,
        req: &ProtocolStepRequest,
    ) -> RemoteResult<ProtocolStep> {
        self.patch_json(&format!("/api/step/{id}/"), req).await
    }

    pub async fn delete_step(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/step/{id}/")).await
    }

    pub async fn get_section(&self, id: i64) -> RemoteResult<ProtocolSection> {
        self.get_json(&format!("/api/section/{id}/"), &[]).await
    }

    pub async fn create_section(
        &self,
        req: &ProtocolSectionRequest,
    ) -> RemoteResult<ProtocolSection> {
        self.post_json("/api/section/", req).await
    }

    pub async fn update_section(
        &self,
        id: i64,
        req: &ProtocolSectionRequest,
    ) -> RemoteResult<ProtocolSection> {
        self.patch_json(&format!("/api/section/{id}/"), req).await
    }

    pub async fn delete_section(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/section/{id}/")).await
    }

    // ── Annotations ──────────────────────────────────────────────

    pub async fn list_annotations(
        &self,
        step: Option<i64>,
        session: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Annotation>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "step", step.map(|v| v.to_string()));
        push_opt(&mut query, "session", session.map(str::to_string));
        self.get_json("/api/annotation/", &query).await
    }

    pub async fn get_annotation(&self, id: i64) -> RemoteResult<Annotation> {
        self.get_json(&format!("/api/annotation/{id}/"), &[]).await
    }

    pub async fn create_annotation(&self, req: &AnnotationRequest) -> RemoteResult<Annotation> {
        self.post_json("/api/annotation/", req).await
    }

    pub async fn update_annotation(
        &self,
        id: i64,
        req: &AnnotationRequest,
    ) -> RemoteResult<Annotation> {
        self.patch_json(&format!("/api/annotation/{id}/"), req).await
    }

    pub async fn delete_annotation(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/annotation/{id}/")).await
    }

    // ── Sessions ─────────────────────────────────────────────────

    pub async fn list_sessions(
        &self,
        protocol: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Session>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "protocol", protocol.map(|v| v.to_string()));
        self.get_json("/api/session/", &query).await
    }

    pub async fn get_session(&self, unique_id: &str) -> RemoteResult<Session> {
        self.get_json(&format!("/api/session/{unique_id}/"), &[]).await
    }

    pub async fn create_session(&self, req: &SessionRequest) -> RemoteResult<Session> {
        self.post_json("/api/session/", req).await
    }

    pub async fn update_session(
        &self,
        unique_id: &str,
        req: &SessionRequest,
    ) -> RemoteResult<Session> {
        self.patch_json(&format!("/api/session/{unique_id}/"), req).await
    }

    pub async fn delete_session(&self, unique_id: &str) -> RemoteResult<()> {
        self.delete(&format!("/api/session/{unique_id}/")).await
    }

    // ── Instruments ──────────────────────────────────────────────

    pub async fn list_instruments(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Instrument>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/instrument/", &query).await
    }

    pub async fn get_instrument(&self, id: i64) -> RemoteResult<Instrument> {
        self.get_json(&format!("/api/instrument/{id}/"), &[]).await
    }

    pub async fn create_instrument(&self, req: &InstrumentRequest) -> RemoteResult<Instrument> {
        self.post_json("/api/instrument/", req).await
    }

    pub async fn update_instrument(
        &self,
        id: i64,
        req: &InstrumentRequest,
    ) -> RemoteResult<Instrument> {
        self.patch_json(&format!("/api/instrument/{id}/"), req).await
    }

    pub async fn delete_instrument(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/instrument/{id}/")).await
    }

    // ── Instrument usage ─────────────────────────────────────────

    pub async fn list_instrument_usage(
        &self,
        instrument: Option<i64>,
        started_after: Option<DateTime<Utc>>,
        started_before: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<InstrumentUsage>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "instrument", instrument.map(|v| v.to_string()));
        push_opt(&mut query, "time_started_after", started_after.map(|t| t.to_rfc3339()));
        push_opt(&mut query, "time_started_before", started_before.map(|t| t.to_rfc3339()));
        self.get_json("/api/instrument_usage/", &query).await
    }

    pub async fn get_instrument_usage(&self, id: i64) -> RemoteResult<InstrumentUsage> {
        self.get_json(&format!("/api/instrument_usage/{id}/"), &[]).await
    }

    pub async fn create_instrument_usage(
        &self,
        req: &InstrumentUsageRequest,
    ) -> RemoteResult<InstrumentUsage> {
        self.post_json("/api/instrument_usage/", req).await
    }

    pub async fn update_instrument_usage(
        &self,
        id: i64,
        req: &InstrumentUsageRequest,
    ) -> RemoteResult<InstrumentUsage> {
        self.patch_json(&format!("/api/instrument_usage/{id}/"), req).await
    }

    pub async fn delete_instrument_usage(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/instrument_usage/{id}/")).await
    }

    // ── Maintenance logs ─────────────────────────────────────────

    pub async fn list_maintenance_logs(
        &self,
        instrument: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<MaintenanceLog>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "instrument", instrument.map(|v| v.to_string()));
        self.get_json("/api/maintenance_log/", &query).await
    }

    pub async fn get_maintenance_log(&self, id: i64) -> RemoteResult<MaintenanceLog> {
        self.get_json(&format!("/api/maintenance_log/{id}/"), &[]).await
    }

    pub async fn create_maintenance_log(
        &self,
        req: &MaintenanceLogRequest,
    ) -> RemoteResult<MaintenanceLog> {
        self.post_json("/api/maintenance_log/", req).await
    }

    pub async fn update_maintenance_log(
        &self,
        id: i64,
        req: &MaintenanceLogRequest,
    ) -> RemoteResult<MaintenanceLog> {
        self.patch_json(&format!("/api/maintenance_log/{id}/"), req).await
    }

    pub async fn delete_maintenance_log(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/maintenance_log/{id}/")).await
    }

    // ── Support information ──────────────────────────────────────

    pub async fn list_support_information(
        &self,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<SupportInformation>> {
        let query = slice_query(limit, offset);
        self.get_json("/api/support_information/", &query).await
    }

    pub async fn get_support_information(&self, id: i64) -> RemoteResult<SupportInformation> {
        self.get_json(&format!("/api/support_information/{id}/"), &[]).await
    }

    pub async fn create_support_information(
        &self,
        req: &SupportInformationRequest,
    ) -> RemoteResult<SupportInformation> {
        self.post_json("/api/support_information/", req).await
    }

    pub async fn update_support_information(
        &self,
        id: i64,
        req: &SupportInformationRequest,
    ) -> RemoteResult<SupportInformation> {
        self.patch_json(&format!("/api/support_information/{id}/"), req).await
    }

    pub async fn delete_support_information(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/support_information/{id}/")).await
    }

    // ── Lab groups ───────────────────────────────────────────────

    pub async fn list_lab_groups(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<LabGroup>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "search", search.map(str::to_string));
        self.get_json("/api/lab_group/", &query).await
    }

    pub async fn get_lab_group(&self, id: i64) -> RemoteResult<LabGroup> {
        self.get_json(&format!("/api/lab_group/{id}/"), &[]).await
    }

    pub async fn create_lab_group(&self, req: &LabGroupRequest) -> RemoteResult<LabGroup> {
        self.post_json("/api/lab_group/", req).await
    }

    pub async fn update_lab_group(&self, id: i64, req: &LabGroupRequest) -> RemoteResult<LabGroup> {
        self.patch_json(&format!("/api/lab_group/{id}/"), req).await
    }

    pub async fn delete_lab_group(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/lab_group/{id}/")).await
    }

    // ── Messaging ────────────────────────────────────────────────

    pub async fn list_threads(&self, limit: i64, offset: i64) -> RemoteResult<Page<MessageThread>> {
        let query = slice_query(limit, offset);
        self.get_json("/api/message_thread/", &query).await
    }

    pub async fn get_thread(&self, id: i64) -> RemoteResult<MessageThread> {
        self.get_json(&format!("/api/message_thread/{id}/"), &[]).await
    }

    pub async fn create_thread(&self, req: &ThreadRequest) -> RemoteResult<MessageThread> {
        self.post_json("/api/message_thread/", req).await
    }

    pub async fn delete_thread(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/message_thread/{id}/")).await
    }

    pub async fn list_messages(
        &self,
        thread: i64,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<Message>> {
        let mut query = slice_query(limit, offset);
        query.push(("thread", thread.to_string()));
        self.get_json("/api/message/", &query).await
    }

    pub async fn get_message(&self, id: i64) -> RemoteResult<Message> {
        self.get_json(&format!("/api/message/{id}/"), &[]).await
    }

    pub async fn send_message(&self, req: &MessageRequest) -> RemoteResult<Message> {
        self.post_json("/api/message/", req).await
    }

    pub async fn mark_message_read(&self, id: i64) -> RemoteResult<Message> {
        self.post_json(&format!("/api/message/{id}/mark_as_read/"), &serde_json::json!({}))
            .await
    }

    pub async fn mark_message_unread(&self, id: i64) -> RemoteResult<Message> {
        self.post_json(&format!("/api/message/{id}/mark_as_unread/"), &serde_json::json!({}))
            .await
    }

    // ── Import trackers ──────────────────────────────────────────

    pub async fn list_import_trackers(
        &self,
        user: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> RemoteResult<Page<ImportTracker>> {
        let mut query = slice_query(limit, offset);
        push_opt(&mut query, "user", user.map(|v| v.to_string()));
        self.get_json("/api/import_tracker/", &query).await
    }

    pub async fn get_import_tracker(&self, id: i64) -> RemoteResult<ImportTracker> {
        self.get_json(&format!("/api/import_tracker/{id}/"), &[]).await
    }

    pub async fn delete_import_tracker(&self, id: i64) -> RemoteResult<()> {
        self.delete(&format!("/api/import_tracker/{id}/")).await
    }

    // ── Site settings ────────────────────────────────────────────

    pub async fn get_site_settings(&self) -> RemoteResult<SiteSettings> {
        self.get_json("/api/site_settings/", &[]).await
    }

    pub async fn update_site_settings(
        &self,
        req: &SiteSettingsRequest,
    ) -> RemoteResult<SiteSettings> {
        self.patch_json("/api/site_settings/", req).await
    }
}

fn slice_query(limit: i64, offset: i64) -> Vec<(&'static str, String)> {
    vec![("limit", limit.to_string()), ("offset", offset.to_string())]
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        query.push((key, value));
    }
}
