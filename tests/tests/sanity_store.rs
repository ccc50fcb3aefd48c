use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use postviews_gateway::backend::SanityStore;
use postviews_kernel::{ContentStore, PostId, StoreError};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the fake Content Lake saw.
#[derive(Default)]
struct Seen {
    queries: Vec<HashMap<String, String>>,
    query_auth: Vec<Option<String>>,
    mutations: Vec<(Option<String>, Value)>,
}

type Shared = Arc<Mutex<Seen>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn query(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let q = params.get("query").cloned().unwrap_or_default();
    let post = params.get("$postId").cloned();
    {
        let mut seen = seen.lock().unwrap();
        seen.queries.push(params);
        seen.query_auth.push(bearer(&headers));
    }

    let result = if q.contains("_id == $postId") {
        match post.as_deref() {
            Some("\"counted\"") => json!({ "views": 41 }),
            Some("\"fresh\"") => json!({}),
            _ => Value::Null,
        }
    } else {
        json!([
            { "_id": "a", "title": "A", "slug": "a", "views": 9, "publishedAt": "2025-05-01T08:00:00Z" },
            { "_id": "no slug", "title": "Broken", "slug": "x", "views": 3 },
            { "_id": "draft", "title": "Draft", "views": 0 }
        ])
    };
    Json(json!({ "ms": 1, "query": q, "result": result }))
}

async fn mutate(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = bearer(&headers);
    let ok = auth.as_deref() == Some("Bearer sk-write");
    seen.lock().unwrap().mutations.push((auth, body));
    if ok {
        (StatusCode::OK, Json(json!({ "transactionId": "tx-1", "results": [] })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
    }
}

async fn fake_lake() -> (String, Shared) {
    let seen = Shared::default();
    let app = Router::new()
        .route("/v2024-01-01/data/query/production", get(query))
        .route("/v2024-01-01/data/mutate/production", post(mutate))
        .with_state(seen.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v2024-01-01"), seen)
}

fn store(base: &str, token: Option<&str>) -> SanityStore {
    SanityStore::with_bases(
        reqwest::Client::new(),
        base,
        base,
        "production",
        token.map(str::to_string),
    )
}

fn id(s: &str) -> PostId {
    PostId::parse(s).unwrap()
}

#[tokio::test]
async fn fetch_views_decodes_present_absent_and_missing() {
    let (base, seen) = fake_lake().await;
    let store = store(&base, Some("sk-write"));

    let rec = store.fetch_views(&id("counted")).await.unwrap().unwrap();
    assert_eq!(rec.current(), 41);

    let rec = store.fetch_views(&id("fresh")).await.unwrap().unwrap();
    assert_eq!(rec.views, None);
    assert_eq!(rec.current(), 0);

    assert!(store.fetch_views(&id("ghost")).await.unwrap().is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.queries[0]["$postId"], "\"counted\"");
    assert_eq!(seen.query_auth[0].as_deref(), Some("Bearer sk-write"));
}

#[tokio::test]
async fn set_views_sends_single_patch_with_token() {
    let (base, seen) = fake_lake().await;
    store(&base, Some("sk-write"))
        .set_views(&id("abc123"), 7)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let (auth, body) = &seen.mutations[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-write"));
    assert_eq!(
        *body,
        json!({ "mutations": [ { "patch": { "id": "abc123", "set": { "views": 7 } } } ] })
    );
}

#[tokio::test]
async fn writes_without_token_fail_locally() {
    let (base, seen) = fake_lake().await;
    let err = store(&base, None)
        .set_views(&id("abc123"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingCredential));
    assert!(seen.lock().unwrap().mutations.is_empty());
}

#[tokio::test]
async fn rejected_mutation_is_upstream_error() {
    let (base, _) = fake_lake().await;
    let err = store(&base, Some("sk-wrong"))
        .set_views(&id("abc123"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Upstream { status: 401, .. }));
}

#[tokio::test]
async fn batch_is_one_request() {
    let (base, seen) = fake_lake().await;
    let updates = vec![(id("a"), 10), (id("b"), 20), (id("c"), 30)];
    store(&base, Some("sk-write"))
        .set_views_batch(&updates)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.mutations.len(), 1);
    assert_eq!(seen.mutations[0].1["mutations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn listing_skips_unusable_documents() {
    let (base, seen) = fake_lake().await;
    let posts = store(&base, Some("sk-write")).list_posts().await.unwrap();

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["a"]);
    assert_eq!(posts[0].views, 9);
    assert!(posts[0].published_at.is_some());

    // Listings are public reads.
    assert_eq!(seen.lock().unwrap().query_auth[0], None);
}
