//! Two-phase read receipts: the local flag applies immediately with a
//! pending marker, and unconfirmed receipts flush when the remote is
//! reachable again.

use benchtop_cloud::{ApiClient, ApiConfig};
use benchtop_services::MessagingService;
use benchtop_store::CacheDb;
use benchtop_types::*;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn online_client(server: &MockServer) -> Arc<ApiClient> {
    let client = ApiClient::new(ApiConfig::new(server.uri()));
    client.set_token("test-token".into()).await;
    Arc::new(client)
}

async fn offline_client() -> Arc<ApiClient> {
    let client = ApiClient::new(ApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout_secs: 1,
    });
    client.set_token("test-token".into()).await;
    Arc::new(client)
}

fn message(id: i64, read: bool) -> Message {
    Message {
        id,
        thread: 1,
        sender: None,
        content: "hello".into(),
        message_type: MessageType::UserMessage,
        priority: MessagePriority::Normal,
        recipients: vec![MessageRecipient {
            user: UserBasic {
                id: 2,
                username: "grace".into(),
                first_name: String::new(),
                last_name: String::new(),
            },
            is_read: read,
            read_at: None,
        }],
        attachments: vec![],
        created_at: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn mark_read_offline_applies_locally_and_stays_pending() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_message(&message(1, false)).unwrap();

    let offline = MessagingService::new(offline_client().await, db.clone());
    // Succeeds despite the dead remote — responsiveness over consistency
    offline.mark_read(1, 2).await.unwrap();

    let cached = db.get_message(1).unwrap().unwrap();
    assert!(cached.recipients[0].is_read);
    assert_eq!(db.pending_read_receipts().unwrap().len(), 1);
}

#[tokio::test]
async fn mark_read_online_confirms_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/message/1/mark_as_read/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::to_value(message(1, true)).unwrap()))
        .mount(&server)
        .await;

    let db = CacheDb::open_in_memory().unwrap();
    db.cache_message(&message(1, false)).unwrap();

    let online = MessagingService::new(online_client(&server).await, db.clone());
    online.mark_read(1, 2).await.unwrap();

    assert!(db.pending_read_receipts().unwrap().is_empty());
    assert!(db.get_message(1).unwrap().unwrap().recipients[0].is_read);
}

#[tokio::test]
async fn flush_retries_deferred_receipts() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_message(&message(1, false)).unwrap();
    db.cache_message(&message(2, false)).unwrap();

    let offline = MessagingService::new(offline_client().await, db.clone());
    offline.mark_read(1, 2).await.unwrap();
    offline.mark_unread(2, 2).await.unwrap();
    assert_eq!(db.pending_read_receipts().unwrap().len(), 2);

    // Connectivity returns
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/message/1/mark_as_read/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::to_value(message(1, true)).unwrap()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/message/2/mark_as_unread/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::to_value(message(2, false)).unwrap()))
        .mount(&server)
        .await;

    let online = MessagingService::new(online_client(&server).await, db.clone());
    let flushed = online.flush_pending_read_receipts().await.unwrap();
    assert_eq!(flushed, 2);
    assert!(db.pending_read_receipts().unwrap().is_empty());
}

#[tokio::test]
async fn flush_keeps_receipts_that_fail_again() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_message(&message(1, false)).unwrap();

    let offline = MessagingService::new(offline_client().await, db.clone());
    offline.mark_read(1, 2).await.unwrap();

    let flushed = offline.flush_pending_read_receipts().await.unwrap();
    assert_eq!(flushed, 0);
    assert_eq!(db.pending_read_receipts().unwrap().len(), 1);
}
