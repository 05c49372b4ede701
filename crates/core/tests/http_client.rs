//! `HttpSearchClient` against an in-process axum stub of the search service.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use hotel_search_core::backend::{RecommendationSource, SearchBackend};
use hotel_search_core::{
    CommitSource, DomainFilter, HttpSearchClient, OrchestratorConfig, SearchConfig, SearchError,
    SearchOrchestrator, SearchRequest,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorded {
    params: Arc<Mutex<Vec<HashMap<String, String>>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

async fn smart(
    State(rec): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    rec.auth.lock().unwrap().push(auth);
    rec.params.lock().unwrap().push(params.clone());

    let q = params.get("q").cloned().unwrap_or_default();
    match q.as_str() {
        "down" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        "fail" => Json(json!({ "code": 500, "msg": "index unavailable", "data": null }))
            .into_response(),
        _ => Json(json!({
            "code": 200,
            "msg": "ok",
            "data": {
                "keyword": q,
                "total": 42,
                "durationMs": 5,
                "hotels": [{
                    "hotelId": 7,
                    "nameCn": "巴黎歌剧院酒店",
                    "nameEn": "Paris Opera Hotel",
                    "highlightedNameCn": "<em>巴黎</em>歌剧院酒店",
                    "cityCn": "巴黎",
                    "lat": 48.87,
                    "lon": 2.33
                }]
            }
        }))
        .into_response(),
    }
}

async fn cities() -> Json<Value> {
    Json(json!({
        "code": 200,
        "msg": "ok",
        "data": [
            { "nameCn": "北京", "nameEn": "Beijing", "countryCn": "中国", "countryEn": "China", "lat": 39.9, "lon": 116.4 },
            { "nameCn": "上海", "nameEn": "Shanghai", "countryCn": "中国", "countryEn": "China", "lat": 31.2, "lon": 121.5 }
        ]
    }))
}

async fn hotels() -> Json<Value> {
    Json(json!({
        "code": 200,
        "msg": "ok",
        "data": [
            { "cityCn": "南京", "cityEn": "Nanjing", "countryCn": "中国", "countryEn": "China",
              "nameCn": "南京金陵饭店", "nameEn": "Jinling Hotel Nanjing", "lat": 32.06, "lon": 118.79 }
        ]
    }))
}

async fn start_stub() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/search/smart", get(smart))
        .route("/search/cities", get(cities))
        .route("/search/hotels", get(hotels))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), recorded)
}

fn client(base_url: &str, token: Option<&str>) -> HttpSearchClient {
    let config = SearchConfig {
        base_url: base_url.to_string(),
        auth_token: token.map(str::to_string),
        ..SearchConfig::default()
    };
    HttpSearchClient::new(&config).unwrap()
}

#[tokio::test]
async fn search_decodes_page_and_omits_tag_for_all() {
    let (base, rec) = start_stub().await;
    let c = client(&base, None);

    let page = c.search(&SearchRequest::new("paris", DomainFilter::All, 8)).await.unwrap();
    assert_eq!(page.total, Some(42));
    assert_eq!(page.hotels.len(), 1);
    assert_eq!(page.hotels[0].hotel_id, Some(7));
    assert_eq!(page.hotels[0].coordinates(), Some((48.87, 2.33)));

    let params = rec.params.lock().unwrap()[0].clone();
    assert_eq!(params.get("q").map(String::as_str), Some("paris"));
    assert_eq!(params.get("size").map(String::as_str), Some("8"));
    assert!(!params.contains_key("tag"));
    assert_eq!(rec.auth.lock().unwrap()[0], None);
}

#[tokio::test]
async fn search_sends_tag_hints_and_raw_token() {
    let (base, rec) = start_stub().await;
    let c = client(&base, Some("tok-123"));

    let mut request = SearchRequest::new("paris", DomainFilter::Intl, 20);
    request.city = Some("Paris".into());
    c.search(&request).await.unwrap();

    let params = rec.params.lock().unwrap()[0].clone();
    assert_eq!(params.get("tag").map(String::as_str), Some("INTL"));
    assert_eq!(params.get("city").map(String::as_str), Some("Paris"));
    assert_eq!(rec.auth.lock().unwrap()[0].as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn non_success_code_is_an_api_error() {
    let (base, _) = start_stub().await;
    let err = client(&base, None)
        .search(&SearchRequest::new("fail", DomainFilter::All, 8))
        .await
        .unwrap_err();
    match err {
        SearchError::Api { code, message } => {
            assert_eq!(code, 500);
            assert_eq!(message, "index unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_failure_is_a_status_error() {
    let (base, _) = start_stub().await;
    let err = client(&base, None)
        .search(&SearchRequest::new("down", DomainFilter::All, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Status { status: 503, .. }), "got {err:?}");
    assert_eq!(err.category(), "transport");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"), None)
        .search(&SearchRequest::new("paris", DomainFilter::All, 8))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn remote_recommendations_combine_both_endpoints() {
    let (base, _) = start_stub().await;
    let recs = client(&base, None).recommendations().await.unwrap();

    assert_eq!(recs.popular_regions.len(), 2);
    assert_eq!(recs.popular_regions[0].name, "北京");
    assert_eq!(recs.popular_regions[0].name_en.as_deref(), Some("Beijing"));
    assert_eq!(recs.popular_regions[0].count, None);

    assert_eq!(recs.popular_hotels.len(), 1);
    assert_eq!(recs.popular_hotels[0].id, 1);
    assert_eq!(recs.popular_hotels[0].name, "南京金陵饭店");
    assert_eq!(recs.popular_hotels[0].city, "南京");
}

#[tokio::test]
async fn orchestrator_over_http_commits_and_renders_results() {
    let (base, rec) = start_stub().await;
    let c = Arc::new(client(&base, None));
    let o = SearchOrchestrator::new(
        c.clone(),
        c,
        OrchestratorConfig {
            debounce: Duration::from_millis(10),
            ..OrchestratorConfig::default()
        },
    );
    let mut rx = o.subscribe();

    o.on_query_change("paris");
    assert!(o.on_commit(CommitSource::Enter));

    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(result) = rx.borrow_and_update().search.clone() {
                return result;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("search result within timeout");

    assert_eq!(result.issued_query, "paris");
    assert_eq!(result.total_count, 42);
    assert_eq!(result.items[0].display_name(), "巴黎歌剧院酒店");
    assert_eq!(rec.params.lock().unwrap()[0].get("size").map(String::as_str), Some("20"));
}
