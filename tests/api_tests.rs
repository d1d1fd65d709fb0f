use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use listen_reco_api::{
    db::{
        store::{
            CommunityRow, ListenParams, ListenRow, ProjectionRow, ScoredItemRow, UserOverlapRow,
        },
        Catalog, GraphStore, MemoryGraphStore,
    },
    error::{AppError, AppResult},
    models::CatalogItem,
    routes::{create_router, AppState},
    services::Recommender,
};

/// Store whose every call fails, as when the database is unreachable
struct UnreachableStore;

fn refused<T>() -> AppResult<T> {
    Err(AppError::Dependency("Connection refused".to_string()))
}

#[async_trait]
impl GraphStore for UnreachableStore {
    async fn record_listen(&self, _: &ListenParams) -> AppResult<Option<ListenRow>> {
        refused()
    }

    async fn topic_overlap(&self, _: &str) -> AppResult<Vec<ScoredItemRow>> {
        refused()
    }

    async fn user_overlap(&self, _: &str) -> AppResult<Vec<UserOverlapRow>> {
        refused()
    }

    async fn neighbor_items(&self, _: &str, _: &[String]) -> AppResult<Vec<ScoredItemRow>> {
        refused()
    }

    async fn projection_exists(&self, _: &str) -> AppResult<bool> {
        refused()
    }

    async fn drop_projection(&self, _: &str) -> AppResult<()> {
        refused()
    }

    async fn project_listen_graph(&self, _: &str) -> AppResult<ProjectionRow> {
        refused()
    }

    async fn stream_communities(&self, _: &str) -> AppResult<Vec<CommunityRow>> {
        refused()
    }

    fn backend(&self) -> &'static str {
        "unreachable"
    }
}

fn create_failing_server() -> TestServer {
    let recommender = Recommender::new(Arc::new(UnreachableStore), Duration::from_secs(2));
    TestServer::new(create_router(AppState::new(recommender, "test_communities"))).unwrap()
}

async fn create_test_server() -> (TestServer, Arc<MemoryGraphStore>) {
    let store = Arc::new(MemoryGraphStore::new());
    for item in [
        CatalogItem::new("t1", "AI Trends 2024", ["ai"]),
        CatalogItem::new("t2", "Healthcare Innovations", ["ai", "science"]),
        CatalogItem::new("t3", "Financial Markets", ["finance"]),
        CatalogItem::new("t4", "Sports Weekly", ["sports"]),
    ] {
        store.upsert_item(&item).await.unwrap();
    }

    let recommender = Recommender::new(store.clone(), Duration::from_secs(2));
    let app = create_router(AppState::new(recommender, "test_communities"));
    (TestServer::new(app).unwrap(), store)
}

async fn listen(server: &TestServer, user_id: &str, transcription_id: &str) {
    server
        .post("/listen")
        .json(&json!({
            "user_id": user_id,
            "transcription_id": transcription_id
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_listen_stores_relationship() {
    let (server, store) = create_test_server().await;

    let response = server
        .post("/listen")
        .json(&json!({
            "user_id": "u1",
            "transcription_id": "t1",
            "weight": 3,
            "user_name": "Alice"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Listen relationship stored.");
    assert_eq!(store.listen_edge("u1", "t1").await.unwrap().weight, 3.0);
    assert_eq!(store.user_name("u1").await.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_listen_requires_ids() {
    let (server, _) = create_test_server().await;

    let response = server
        .post("/listen")
        .json(&json!({ "user_id": "u1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "user_id and transcription_id are required.");
}

#[tokio::test]
async fn test_listen_rejects_non_positive_weight() {
    let (server, _) = create_test_server().await;

    let response = server
        .post("/listen")
        .json(&json!({ "user_id": "u1", "transcription_id": "t1", "weight": 0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listen_rejects_non_numeric_weight() {
    let (server, store) = create_test_server().await;

    let response = server
        .post("/listen")
        .json(&json!({ "user_id": "u1", "transcription_id": "t1", "weight": "heavy" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("weight"));
    assert_eq!(store.listen_count().await, 0);
}

#[tokio::test]
async fn test_store_failure_returns_server_error() {
    let server = create_failing_server();

    let response = server
        .post("/listen")
        .json(&json!({ "user_id": "u1", "transcription_id": "t1" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Connection refused");

    let response = server.get("/communities").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Connection refused");
}

#[tokio::test]
async fn test_listen_to_missing_item_creates_no_edge() {
    let (server, store) = create_test_server().await;

    listen(&server, "u9", "missing_item").await;

    assert_eq!(store.listen_count().await, 0);
    let content: Vec<Value> = server.get("/content/u9").await.json();
    let collab: Vec<Value> = server.get("/collab/u9").await.json();
    assert!(content.is_empty());
    assert!(collab.is_empty());
}

#[tokio::test]
async fn test_unknown_user_gets_empty_results() {
    let (server, _) = create_test_server().await;

    for path in ["/content/ghost", "/collab/ghost", "/hybrid/ghost", "/similar/ghost"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert!(body.is_empty(), "{} should be empty", path);
    }
}

#[tokio::test]
async fn test_content_recommendations_by_shared_topic() {
    let (server, _) = create_test_server().await;
    listen(&server, "u1", "t1").await;

    let response = server.get("/content/u1").await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(
        body,
        json!([{ "id": "t2", "title": "Healthcare Innovations", "score": 1 }])
    );
}

#[tokio::test]
async fn test_collaborative_and_similar_users() {
    let (server, _) = create_test_server().await;
    for (user, item) in [("u1", "t1"), ("u2", "t1"), ("u2", "t3"), ("u3", "t1"), ("u3", "t3"), ("u3", "t4")] {
        listen(&server, user, item).await;
    }

    let collab: Vec<Value> = server.get("/collab/u1").await.json();
    assert_eq!(collab[0]["id"], "t3");
    assert_eq!(collab[0]["score"], 2);

    let similar: Vec<Value> = server.get("/similar/u1").await.json();
    assert_eq!(similar.len(), 2);
    assert!(similar.iter().all(|u| u["weight"] == 1));

    let limited: Vec<Value> = server
        .get("/similar/u1")
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_hybrid_merges_both_signals() {
    let (server, _) = create_test_server().await;
    for (user, item) in [("u1", "t1"), ("u2", "t1"), ("u2", "t2"), ("u2", "t3")] {
        listen(&server, user, item).await;
    }

    let response = server.get("/hybrid/u1").await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();

    // t2 is both a topic match and a neighbour listen; t3 only the latter
    assert_eq!(body[0]["id"], "t2");
    assert_eq!(body[0]["score"], 2.0);
    assert_eq!(body[0]["title"], "Healthcare Innovations");
    assert_eq!(body[1]["id"], "t3");
    assert_eq!(body[1]["score"], 1.0);
}

#[tokio::test]
async fn test_communities_default_and_named_projection() {
    let (server, store) = create_test_server().await;
    for (user, item) in [("u1", "t1"), ("u2", "t1"), ("u3", "t3"), ("u4", "t3")] {
        listen(&server, user, item).await;
    }

    let response = server.get("/communities").await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 4);
    assert!(body
        .windows(2)
        .all(|w| w[0]["community_id"].as_i64() <= w[1]["community_id"].as_i64()));

    let community = |user: &str| {
        body.iter()
            .find(|a| a["user_id"] == user)
            .map(|a| a["community_id"].clone())
            .unwrap()
    };
    assert_eq!(community("u1"), community("u2"));
    assert_ne!(community("u1"), community("u3"));

    server
        .get("/communities")
        .add_query_param("graph_name", "adhoc")
        .await
        .assert_status_ok();

    assert_eq!(
        store.projection_names().await,
        vec!["adhoc".to_string(), "test_communities".to_string()]
    );
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-abc-123"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "trace-abc-123");
}
