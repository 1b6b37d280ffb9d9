mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use quran_roots::{api, AnalyticsConfig, AppState, SqliteCorpusSource};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(db: &common::CorpusDb) -> axum::Router {
    let state = AppState::from_source(&SqliteCorpusSource::new(db.path()), AnalyticsConfig::default()).unwrap();
    api::router(Arc::new(state))
}

/// Percent-encode a query value byte by byte.
fn encode(value: &str) -> String {
    value.bytes().map(|b| format!("%{b:02X}")).collect()
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_corpus_size() {
    let db = common::create_corpus_db();
    let (status, body) = get(app(&db), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["verses"], 5);
    assert_eq!(body["chapters"], 2);
}

#[tokio::test]
async fn root_analytics_returns_flattened_statistics() {
    let db = common::create_corpus_db();
    let uri = format!("/roots/analytics?root={}", encode("رحم"));
    let (status, body) = get(app(&db), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["root"], "رحم");
    assert_eq!(body["totalOccurrences"], 3);
    assert_eq!(body["totalVerses"], 2);
    assert_eq!(body["era"]["meccan"], 2);
    assert_eq!(body["network"]["nodes"][0]["id"], "رحم");
    assert_eq!(body["network"]["nodes"][0]["group"], 0);
    assert_eq!(body["timeline"][0]["chapterNo"], 1);
}

#[tokio::test]
async fn timeline_can_follow_revelation_order() {
    let db = common::create_corpus_db();
    let uri = format!("/roots/analytics?root={}&order=revelation", encode("رحم"));
    let (status, body) = get(app(&db), &uri).await;

    assert_eq!(status, StatusCode::OK);
    let orders: Vec<u64> = body["timeline"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["revelationOrder"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, vec![5, 87]);
}

#[tokio::test]
async fn empty_root_is_bad_request() {
    let db = common::create_corpus_db();
    let (status, body) = get(app(&db), "/roots/analytics?root=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid argument"));
}

#[tokio::test]
async fn root_verses_page_through_matches() {
    let db = common::create_corpus_db();
    let uri = format!("/roots/verses?root={}&facet=surah&value=1", encode("رحم"));
    let (status, body) = get(app(&db), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["verses"][0]["globalId"], 1);
    assert_eq!(body["verses"][0]["matchedTokens"].as_array().unwrap().len(), 2);

    let uri = format!("/roots/verses?root={}&facet=page&value=abc", encode("رحم"));
    let (status, _) = get(app(&db), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lexicon_routes() {
    let db = common::create_corpus_db();

    let (status, body) = get(app(&db), "/roots/by-length/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roots"][0]["root"], "رحم");
    assert_eq!(body["roots"][0]["count"], 3);

    let (status, body) = get(app(&db), "/chapters/2/profile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "البقرة");
    assert_eq!(body["verseCount"], 3);

    let (status, _) = get(app(&db), "/chapters/999/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mushaf_lookups() {
    let db = common::create_corpus_db();

    let (status, body) = get(app(&db), "/mushaf/by-page/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(app(&db), "/mushaf/by-section/7").await;
    assert!(body.as_array().unwrap().is_empty());
}
