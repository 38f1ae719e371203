//! Read-path behavior: write-through caching, offline fallback, error
//! masking and pagination emulation, exercised end to end against a mock
//! server and a shared in-memory cache.

use benchtop_cloud::{ApiClient, ApiConfig};
use benchtop_services::*;
use benchtop_store::CacheDb;
use benchtop_types::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn online_client(server: &MockServer) -> Arc<ApiClient> {
    let client = ApiClient::new(ApiConfig::new(server.uri()));
    client.set_token("test-token".into()).await;
    Arc::new(client)
}

/// A client pointed at a dead endpoint — every call fails fast, which is
/// exactly what the offline fallback path needs.
async fn offline_client() -> Arc<ApiClient> {
    let client = ApiClient::new(ApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout_secs: 1,
    });
    client.set_token("test-token".into()).await;
    Arc::new(client)
}

fn stored_reagent(id: i64) -> StoredReagent {
    StoredReagent {
        id,
        reagent: Reagent {
            id: 10,
            name: "Ethanol".into(),
            unit: "mL".into(),
            created_at: None,
            updated_at: None,
        },
        storage_object: StorageObjectBasic {
            id: 5,
            object_name: "Freezer A".into(),
        },
        quantity: 250.0,
        notes: String::new(),
        user: Some(UserBasic {
            id: 42,
            username: "ada".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }),
        barcode: None,
        expiration_date: None,
        shareable: false,
        created_at: None,
        updated_at: None,
    }
}

fn page_json<T: serde::Serialize>(count: i64, next: Option<&str>, results: Vec<T>) -> serde_json::Value {
    serde_json::json!({
        "count": count,
        "next": next,
        "previous": null,
        "results": results,
    })
}

// ── Fallback triggering & exhaustion ─────────────────────────────

#[tokio::test]
async fn get_falls_back_to_cache_when_remote_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stored_reagent/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::to_value(stored_reagent(1)).unwrap()))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let online = StoredReagentService::new(online_client(&server).await, db.clone());
    let fetched = online.get_stored_reagent(1).await.unwrap();

    let offline = StoredReagentService::new(offline_client().await, db);
    let rehydrated = offline.get_stored_reagent(1).await.unwrap();
    assert_eq!(rehydrated, fetched);
}

#[tokio::test]
async fn get_propagates_remote_error_when_cache_is_empty() {
    let db = CacheDb::open_in_memory().unwrap();
    let offline = StoredReagentService::new(offline_client().await, db);

    let result = offline.get_stored_reagent(1).await;
    assert!(matches!(result, Err(ServiceError::Remote(_))));
}

#[tokio::test]
async fn caller_cannot_distinguish_cache_hit_from_fresh_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3, "tag": "dna", "created_at": null, "updated_at": null
        })))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let online = TagService::new(online_client(&server).await, db.clone());
    let fresh = online.get_tag(3).await.unwrap();

    let offline = TagService::new(offline_client().await, db);
    let masked = offline.get_tag(3).await.unwrap();
    // Same shape, same success type — offline-ness is invisible
    assert_eq!(fresh, masked);
}

// ── Remote result passthrough ────────────────────────────────────

#[tokio::test]
async fn remote_page_is_returned_verbatim() {
    let server = MockServer::start().await;
    let body = page_json(
        100,
        Some("https://api.example.org/api/stored_reagent/?limit=2&offset=2"),
        vec![stored_reagent(1), stored_reagent(2)],
    );
    Mock::given(method("GET"))
        .and(path("/api/stored_reagent/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let service = StoredReagentService::new(online_client(&server).await, db);
    let page = service.list_stored_reagents(None, None, 2, 0).await.unwrap();

    // Cache writes never alter what the caller sees: remote count and
    // cursors survive even though only two rows were cached locally.
    assert_eq!(page.count, 100);
    assert!(page.next.is_some());
    assert_eq!(page.results.len(), 2);
}

// ── Pagination emulation ─────────────────────────────────────────

#[tokio::test]
async fn offline_page_reports_local_count_and_no_cursors() {
    let server = MockServer::start().await;
    let results: Vec<StoredReagent> = (1..=25).map(stored_reagent).collect();
    Mock::given(method("GET"))
        .and(path("/api/stored_reagent/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(999, Some("next"), results)))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let online = StoredReagentService::new(online_client(&server).await, db.clone());
    online.list_stored_reagents(None, None, 25, 0).await.unwrap();

    let offline = StoredReagentService::new(offline_client().await, db);
    let page = offline.list_stored_reagents(None, None, 10, 10).await.unwrap();

    assert_eq!(page.count, 25); // local rows, not the remote total
    assert_eq!(page.next, None);
    assert_eq!(page.previous, None);
    let ids: Vec<i64> = page.results.iter().map(|s| s.id).collect();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
}

#[tokio::test]
async fn offline_list_with_empty_cache_is_an_empty_page() {
    let db = CacheDb::open_in_memory().unwrap();
    let offline = StoredReagentService::new(offline_client().await, db);

    let page = offline.list_stored_reagents(None, None, 10, 0).await.unwrap();
    assert_eq!(page.count, 0);
    assert!(page.results.is_empty());
}

// ── Partial-failure isolation ────────────────────────────────────

#[tokio::test]
async fn one_bad_aggregate_does_not_stop_the_rest_of_the_page() {
    let clean = Protocol {
        id: 1,
        protocol_title: "PCR".into(),
        protocol_description: String::new(),
        enabled: true,
        user: None,
        sections: vec![],
        steps: vec![],
        tags: vec![],
        reagents: vec![],
        created_at: None,
        updated_at: None,
    };
    // Duplicate reagent-list ids violate the primary key mid-transaction,
    // so decomposing this aggregate fails and rolls back.
    let broken = Protocol {
        id: 2,
        reagents: vec![
            ProtocolReagent {
                id: 7,
                protocol: 2,
                reagent: Reagent {
                    id: 70,
                    name: "a".into(),
                    unit: "g".into(),
                    created_at: None,
                    updated_at: None,
                },
                quantity: 1.0,
            },
            ProtocolReagent {
                id: 7,
                protocol: 2,
                reagent: Reagent {
                    id: 71,
                    name: "b".into(),
                    unit: "g".into(),
                    created_at: None,
                    updated_at: None,
                },
                quantity: 2.0,
            },
        ],
        ..clean.clone()
    };

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/protocol/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            2,
            None,
            vec![clean.clone(), broken],
        )))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let service = ProtocolService::new(online_client(&server).await, db.clone());

    // The service call still succeeds with the full remote page
    let page = service.list_protocols(None, 10, 0).await.unwrap();
    assert_eq!(page.results.len(), 2);

    // The clean aggregate was cached; the broken one rolled back cleanly
    assert!(db.get_protocol(1).unwrap().is_some());
    assert!(db.get_protocol(2).unwrap().is_none());
}

// ── Write path ───────────────────────────────────────────────────

#[tokio::test]
async fn create_caches_the_confirmed_aggregate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tag/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 8, "tag": "rna", "created_at": null, "updated_at": null
        })))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let service = TagService::new(online_client(&server).await, db.clone());
    let created = service
        .create_tag(&TagRequest { tag: Some("rna".into()) })
        .await
        .unwrap();
    assert_eq!(created.id, 8);

    assert_eq!(db.get_tag(8).unwrap().unwrap().tag, "rna");
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3, "tag": "dna", "created_at": null, "updated_at": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    let service = TagService::new(online_client(&server).await, db.clone());
    service.get_tag(3).await.unwrap();

    let result = service
        .update_tag(3, &TagRequest { tag: Some("edited".into()) })
        .await;
    assert!(result.is_err());

    // No optimistic local mutation happened
    assert_eq!(db.get_tag(3).unwrap().unwrap().tag, "dna");
}

#[tokio::test]
async fn delete_evicts_only_after_remote_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3, "tag": "dna", "created_at": null, "updated_at": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();

    // A failed remote delete leaves the row in place
    let offline = TagService::new(offline_client().await, db.clone());
    let online = TagService::new(online_client(&server).await, db.clone());
    online.get_tag(3).await.unwrap();
    assert!(offline.delete_tag(3).await.is_err());
    assert!(db.get_tag(3).unwrap().is_some());

    // A confirmed delete evicts
    online.delete_tag(3).await.unwrap();
    assert!(db.get_tag(3).unwrap().is_none());
}
