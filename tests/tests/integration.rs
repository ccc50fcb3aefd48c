use postviews_client::{MemoryStorage, ViewClient, ViewGate, ViewStorage, view_key};
use postviews_kernel::ManualClock;
use postviews_kernel::wire::{
    DEBUG_VIEWS_PATH, ErrorBody, INCREMENT_VIEWS_PATH, POPULAR_POSTS_PATH, PopularPostsResponse,
    SeedResponse,
};
use postviews_testing::{MockStore, StoreCall, TestGateway, assert_store_calls};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Browser {
    client: ViewClient,
    storage: Arc<MemoryStorage>,
    clock: ManualClock,
}

impl Browser {
    fn new(gateway: &TestGateway) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::new(1_700_000_000_000);
        let gate = ViewGate::new(storage.clone()).with_clock(Arc::new(clock.clone()));
        let client = ViewClient::new(&gateway.base_url(), Arc::new(gate)).unwrap();
        Self {
            client,
            storage,
            clock,
        }
    }

    fn marked(&self, id: &str) -> bool {
        self.storage.get(&view_key(id)).unwrap().is_some()
    }
}

#[tokio::test]
async fn first_view_counts_and_cooldown_suppresses_repeat() {
    let store = MockStore::new().with_post("abc123", None);
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();
    let browser = Browser::new(&gateway);

    assert!(browser.client.gate().should_count_view("abc123"));
    assert!(browser.client.increment_post_views("abc123").await);
    assert_eq!(store.views_of("abc123"), Some(Some(1)));
    assert!(browser.marked("abc123"));
    assert_eq!(
        store.history().await,
        [
            StoreCall::FetchViews("abc123".into()),
            StoreCall::SetViews("abc123".into(), 1),
        ]
    );

    browser.clock.advance(Duration::from_secs(5 * 60));
    assert!(!browser.client.increment_post_views("abc123").await);
    assert_store_calls!(store, 2);

    browser.clock.advance(Duration::from_secs(25 * 60));
    assert!(browser.client.increment_post_views("abc123").await);
    assert_eq!(store.views_of("abc123"), Some(Some(2)));
}

#[tokio::test]
async fn server_rate_limit_marks_viewed_but_reports_failure() {
    let mut store = MockStore::new();
    for i in 0..11 {
        store = store.with_post(&format!("post-{i}"), None);
    }
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();
    let browser = Browser::new(&gateway);

    for i in 0..10 {
        assert!(browser.client.increment_post_views(&format!("post-{i}")).await);
    }
    let calls = store.call_count().await;

    assert!(!browser.client.increment_post_views("post-10").await);
    assert!(browser.marked("post-10"));
    assert_eq!(store.views_of("post-10"), Some(None));
    assert_store_calls!(store, calls);

    // A new bucket admits the address again.
    gateway.clock.advance(Duration::from_secs(30 * 60));
    browser.clock.advance(Duration::from_secs(30 * 60));
    assert!(browser.client.increment_post_views("post-10").await);
}

#[tokio::test]
async fn invalid_id_is_rejected_before_the_store() {
    let store = MockStore::new();
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();
    let browser = Browser::new(&gateway);

    assert!(!browser.client.increment_post_views("../etc/passwd").await);
    assert!(!browser.marked("../etc/passwd"));
    assert_store_calls!(store, 0);

    let resp = reqwest::Client::new()
        .post(gateway.url(INCREMENT_VIEWS_PATH))
        .json(&json!({ "postId": "x".repeat(201) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.error, "Invalid post ID format");
    assert_store_calls!(store, 0);
}

#[tokio::test]
async fn missing_post_is_not_marked() {
    let store = MockStore::new();
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();
    let browser = Browser::new(&gateway);

    assert!(!browser.client.increment_post_views("ghost").await);
    assert!(!browser.marked("ghost"));
    assert_eq!(store.history().await, [StoreCall::FetchViews("ghost".into())]);
}

#[tokio::test]
async fn slow_lookup_times_out_without_writing() {
    let store = MockStore::new().with_post("slow", Some(3));
    store.set_lookup_delay(Duration::from_secs(2)).await;
    let config = postviews_gateway::GatewayConfig {
        lookup_timeout_ms: 100,
        ..TestGateway::config()
    };
    let gateway = TestGateway::spawn_with(Arc::new(store.clone()), config)
        .await
        .unwrap();

    let resp = reqwest::Client::new()
        .post(gateway.url(INCREMENT_VIEWS_PATH))
        .json(&json!({ "postId": "slow" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.error, "Internal server error");

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(store.views_of("slow"), Some(Some(3)));
    assert_eq!(store.history().await, [StoreCall::FetchViews("slow".into())]);
}

#[tokio::test]
async fn upstream_failure_is_opaque_and_retryable() {
    let store = MockStore::new().with_post("p", None);
    store.fail_with("dataset production: token sk-live-123 revoked").await;
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();
    let browser = Browser::new(&gateway);

    assert!(!browser.client.increment_post_views("p").await);
    assert!(!browser.marked("p"));

    let resp = reqwest::Client::new()
        .post(gateway.url(INCREMENT_VIEWS_PATH))
        .json(&json!({ "postId": "p" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let text = resp.text().await.unwrap();
    assert!(!text.contains("sk-live-123"));
    assert!(!text.contains("\"p\""));
}

#[tokio::test]
async fn view_ceiling_marks_viewed() {
    let store = MockStore::new().with_post("viral", Some(1_000_000));
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();
    let browser = Browser::new(&gateway);

    assert!(!browser.client.increment_post_views("viral").await);
    assert!(browser.marked("viral"));
    assert_eq!(store.views_of("viral"), Some(Some(1_000_000)));
}

#[tokio::test]
async fn get_is_method_not_allowed() {
    let gateway = TestGateway::spawn(Arc::new(MockStore::new())).await.unwrap();
    let resp = reqwest::get(gateway.url(INCREMENT_VIEWS_PATH)).await.unwrap();
    assert_eq!(resp.status(), 405);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.error, "Method not allowed");
}

#[tokio::test]
async fn popular_posts_degrade_to_empty_on_store_failure() {
    let store = MockStore::new().with_post("a", Some(3)).with_post("b", Some(8));
    let gateway = TestGateway::spawn(Arc::new(store.clone())).await.unwrap();

    let resp: PopularPostsResponse = reqwest::get(gateway.url(POPULAR_POSTS_PATH))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = resp.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);

    store.fail_with("down").await;
    let resp = reqwest::get(gateway.url(&format!("{POPULAR_POSTS_PATH}?limit=3")))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp: PopularPostsResponse = resp.json().await.unwrap();
    assert!(resp.posts.is_empty());
    assert_eq!(store.history().await.last(), Some(&StoreCall::MostViewed(3)));
}

#[tokio::test]
async fn debug_seeding_commits_one_batch() {
    let store = MockStore::new().with_post("a", None).with_post("b", Some(2));
    let config = postviews_gateway::GatewayConfig {
        enable_debug_routes: true,
        ..TestGateway::config()
    };
    let gateway = TestGateway::spawn_with(Arc::new(store.clone()), config)
        .await
        .unwrap();

    let resp = reqwest::Client::new()
        .post(gateway.url(DEBUG_VIEWS_PATH))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: SeedResponse = resp.json().await.unwrap();
    assert_eq!(body.message, "Updated 2 posts with mock view counts");
    for update in &body.updates {
        assert!((1..=1000).contains(&update.views));
        assert_eq!(store.views_of(&update.id), Some(Some(update.views)));
    }
    assert_eq!(
        store.history().await,
        [StoreCall::ListPosts, StoreCall::SetViewsBatch(2)]
    );
}

#[tokio::test]
async fn debug_seeding_failure_reports_500() {
    let store = MockStore::new().with_post("a", None);
    store.fail_with("mutation rejected").await;
    let config = postviews_gateway::GatewayConfig {
        enable_debug_routes: true,
        ..TestGateway::config()
    };
    let gateway = TestGateway::spawn_with(Arc::new(store.clone()), config)
        .await
        .unwrap();

    let resp = reqwest::Client::new()
        .post(gateway.url(DEBUG_VIEWS_PATH))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": false, "error": "Failed to update views" })
    );
    assert_eq!(store.views_of("a"), Some(None));
}
