//! ApiClient against a local stub of the property endpoints.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use batchscope::{
    Address, ApiClient, ApiToken, ClientConfig, ExplorerError, LookupOutcome, LookupRequest, QuicklistMode,
    SearchCriteria, SearchRequest, SkipTraceOutcome, SkipTraceRequest,
};

const TOKEN: &str = "test-token";

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn respond(State(stub): State<Stub>, uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, String) {
    stub.seen.lock().expect("stub lock").push((uri.path().to_string(), body));

    let auth = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if auth != Some("Bearer test-token") {
        let body = json!({"status": {"code": 401, "message": "Invalid API token"}});
        return (StatusCode::UNAUTHORIZED, body.to_string());
    }

    (stub.status, stub.body.clone())
}

async fn start_stub(status: StatusCode, body: impl Into<String>) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body: body.into(),
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/api/v1/property/search", post(respond))
        .route("/api/v1/property/lookup/all-attributes", post(respond))
        .route("/api/v1/property/skip-trace", post(respond))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });

    (format!("http://{addr}/api/v1"), seen)
}

fn client(base_url: &str, token: &str) -> ApiClient {
    let config = ClientConfig::new(ApiToken::new(token)).with_base_url(base_url).expect("base url");
    ApiClient::new(config).expect("client")
}

fn count_request() -> SearchRequest {
    let mut criteria = SearchCriteria::new();
    criteria.add_quicklist("vacant", QuicklistMode::All).unwrap();
    SearchRequest::count(&criteria, "Phoenix", "AZ", None).unwrap()
}

#[tokio::test]
async fn count_reads_results_and_quicklist_counts() {
    let body = json!({
        "results": {
            "meta": {"results": {"resultsFound": 1234}},
            "quicklistCounts": [{"name": "vacant", "count": 12}]
        }
    });
    let (base_url, seen) = start_stub(StatusCode::OK, body.to_string()).await;

    let outcome = client(&base_url, TOKEN).count(&count_request()).await.unwrap();
    assert_eq!(outcome.results_found, 1234);
    assert_eq!(outcome.quicklist_counts[0].count, 12);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/api/v1/property/search");
    assert_eq!(seen[0].1["searchCriteria"]["query"], json!("Phoenix, AZ"));
    assert_eq!(seen[0].1["options"]["quicklistCounts"], json!(true));
}

#[tokio::test]
async fn status_message_is_preferred_for_errors() {
    let (base_url, _seen) = start_stub(StatusCode::OK, "{}").await;

    let err = client(&base_url, "wrong-token").count(&count_request()).await.unwrap_err();
    match err {
        ExplorerError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API token");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn top_level_message_is_used_next() {
    let (base_url, _seen) = start_stub(StatusCode::TOO_MANY_REQUESTS, json!({"message": "Rate limit exceeded"}).to_string()).await;

    let err = client(&base_url, TOKEN).count(&count_request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Rate limit exceeded");
    assert!(!err.is_client_side());
}

#[tokio::test]
async fn unreadable_error_bodies_fall_back_to_the_status() {
    let (base_url, _seen) = start_stub(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;

    let err = client(&base_url, TOKEN).count(&count_request()).await.unwrap_err();
    assert_eq!(err.to_string(), "API request failed with status 500");
}

#[tokio::test]
async fn success_without_results_found_is_unexpected() {
    let (base_url, _seen) = start_stub(StatusCode::OK, json!({"results": {}}).to_string()).await;

    let err = client(&base_url, TOKEN).count(&count_request()).await.unwrap_err();
    assert!(matches!(err, ExplorerError::UnexpectedResponse { .. }));

    let (base_url, _seen) = start_stub(StatusCode::OK, "<html>").await;
    let err = client(&base_url, TOKEN).count(&count_request()).await.unwrap_err();
    assert!(matches!(err, ExplorerError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn list_derives_the_page_from_skip_and_take() {
    let body = json!({
        "results": {
            "properties": [{"address": {"street": "1 Main St"}}, {"address": {"street": "2 Main St"}}],
            "meta": {"results": {"resultsFound": 120}}
        }
    });
    let (base_url, seen) = start_stub(StatusCode::OK, body.to_string()).await;

    let request = SearchRequest::list(&SearchCriteria::new(), "Phoenix", "AZ", 2, 50, None).unwrap();
    let page = client(&base_url, TOKEN).list(&request).await.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.properties.len(), 2);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(seen.lock().unwrap()[0].1["options"], json!({"skip": 50, "take": 50}));
}

#[tokio::test]
async fn lookup_without_properties_is_no_match() {
    let (base_url, seen) = start_stub(StatusCode::OK, json!({"results": {"properties": []}}).to_string()).await;

    let request = LookupRequest::by_apn("119-20-012", "AZ", "Maricopa").unwrap();
    let outcome = client(&base_url, TOKEN).lookup(&request).await.unwrap();
    assert_eq!(outcome, LookupOutcome::NoMatch);
    assert_eq!(seen.lock().unwrap()[0].0, "/api/v1/property/lookup/all-attributes");
}

#[tokio::test]
async fn skip_trace_returns_the_first_person() {
    let body = json!({
        "results": {
            "persons": [{"name": {"full": "Ann Lee"}, "litigator": false}],
            "meta": {"matched": 1}
        }
    });
    let (base_url, seen) = start_stub(StatusCode::OK, body.to_string()).await;

    let request = SkipTraceRequest::by_address(Address::new("1 Main St", "", "AZ", "")).unwrap();
    match client(&base_url, TOKEN).skip_trace(&request).await.unwrap() {
        SkipTraceOutcome::Match { person, meta } => {
            assert_eq!(person["name"]["full"], json!("Ann Lee"));
            assert_eq!(meta, Some(json!({"matched": 1})));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        seen.lock().unwrap()[0].1,
        json!({"requests": [{"propertyAddress": {"street": "1 Main St", "state": "AZ"}}]})
    );
}

#[tokio::test]
async fn invalid_additional_criteria_never_reaches_the_network() {
    let (base_url, seen) = start_stub(StatusCode::OK, "{}").await;
    let api = client(&base_url, TOKEN);

    let result = match SearchRequest::count(&SearchCriteria::new(), "Phoenix", "AZ", Some("\"intel\": {")) {
        Ok(request) => api.count(&request).await.map(|_| ()),
        Err(err) => Err(err),
    };

    assert!(matches!(result, Err(ExplorerError::AdditionalCriteria { .. })));
    assert!(seen.lock().unwrap().is_empty());
}
