use benchtop_cloud::{ApiClient, ApiConfig, RemoteError};
use benchtop_types::*;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(server: &MockServer) -> ApiClient {
    let client = ApiClient::new(ApiConfig::new(server.uri()));
    client.set_token("at-test".into()).await;
    client
}

fn tag_json(id: i64, tag: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "tag": tag, "created_at": null, "updated_at": null })
}

// --- Auth state ---

#[tokio::test]
async fn not_authenticated_initially() {
    let client = ApiClient::new(ApiConfig::new("http://localhost"));
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn set_token_makes_authenticated() {
    let client = ApiClient::new(ApiConfig::new("http://localhost"));
    client.set_token("at".into()).await;
    assert!(client.is_authenticated().await);
    client.clear_token().await;
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn request_without_token_fails_before_network() {
    let client = ApiClient::new(ApiConfig::new("http://localhost"));
    let result = client.get_tag(1).await;
    assert!(matches!(result, Err(RemoteError::AuthRequired)));
}

// --- Decoding ---

#[tokio::test]
async fn get_tag_decodes_aggregate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tag_json(3, "dna")))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let tag = client.get_tag(3).await.unwrap();
    assert_eq!(tag.id, 3);
    assert_eq!(tag.tag, "dna");
}

#[tokio::test]
async fn list_tags_sends_slice_and_filter_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .and(query_param("search", "dn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 1, "next": null, "previous": null, "results": [tag_json(3, "dna")]
        })))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let page = client.list_tags(Some("dn"), 10, 20).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results.len(), 1);
}

#[tokio::test]
async fn page_envelope_preserves_cursors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 40,
            "next": "http://x/api/tag/?limit=10&offset=10",
            "previous": null,
            "results": [],
        })))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let page: Page<Tag> = client.list_tags(None, 10, 0).await.unwrap();
    assert_eq!(page.count, 40);
    assert!(page.next.is_some());
    assert!(page.previous.is_none());
}

// --- Error mapping ---

#[tokio::test]
async fn non_success_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let result = client.get_tag(3).await;
    assert!(matches!(result, Err(RemoteError::Api(_))));
}

#[tokio::test]
async fn malformed_body_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let result = client.get_tag(3).await;
    assert!(matches!(result, Err(RemoteError::Http(_))));
}

// --- Untagged instrument references ---

#[tokio::test]
async fn usage_decodes_both_instrument_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/instrument_usage/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "instrument": { "id": 4, "instrument_name": "Plate reader", "enabled": true },
            "time_started": null, "time_ended": null,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/instrument_usage/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 2,
            "instrument": 4,
        })))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let full = client.get_instrument_usage(1).await.unwrap();
    assert_eq!(full.instrument.id(), 4);
    assert!(full.instrument.as_full().is_some());

    let bare = client.get_instrument_usage(2).await.unwrap();
    assert_eq!(bare.instrument, InstrumentRef::Id(4));
}

// --- Mutations ---

#[tokio::test]
async fn delete_succeeds_on_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tag/3/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    client.delete_tag(3).await.unwrap();
}

#[tokio::test]
async fn update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/tag/3/"))
        .and(wiremock::matchers::body_json(serde_json::json!({ "tag": "rna" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tag_json(3, "rna")))
        .mount(&server)
        .await;

    let client = setup(&server).await;
    let updated = client
        .update_tag(3, &TagRequest { tag: Some("rna".into()) })
        .await
        .unwrap();
    assert_eq!(updated.tag, "rna");
}
