use async_trait::async_trait;

use crate::{error::AppResult, models::CatalogItem};

/// Parameters for the listen upsert
#[derive(Debug, Clone, PartialEq)]
pub struct ListenParams {
    pub user_id: String,
    /// Name applied only when the user node is created
    pub user_name: String,
    pub item_id: String,
    pub weight: Option<f64>,
}

/// Row returned by a listen upsert that matched an existing item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenRow {
    pub user_id: String,
    pub item_id: String,
}

/// Candidate item with its raw aggregated count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredItemRow {
    pub id: String,
    pub title: String,
    pub score: u64,
}

/// Another user and the number of distinct items shared with the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOverlapRow {
    pub id: String,
    pub shared: u64,
}

/// Summary of a freshly created projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionRow {
    pub name: String,
    pub node_count: u64,
    pub relationship_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityRow {
    pub user_id: String,
    pub community_id: i64,
}

/// Read/write access to the user-interaction graph.
///
/// Implementations match patterns and aggregate counts. They do not order or
/// truncate results; ranking belongs to the caller. Every method maps a
/// backend failure to `AppError::Dependency`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Upserts the user, then merges a LISTENED_TO edge to the existing item.
    /// Returns `None` when the item does not exist.
    async fn record_listen(&self, params: &ListenParams) -> AppResult<Option<ListenRow>>;

    /// Items sharing a topic with the user's history, excluding items already
    /// listened to. Score counts every (listened item, topic) path.
    async fn topic_overlap(&self, user_id: &str) -> AppResult<Vec<ScoredItemRow>>;

    /// Every other user with at least one item in common with `user_id`.
    async fn user_overlap(&self, user_id: &str) -> AppResult<Vec<UserOverlapRow>>;

    /// Items listened to by `neighbor_ids` and not by `user_id`. Score is the
    /// number of neighbours who listened to the item.
    async fn neighbor_items(
        &self,
        user_id: &str,
        neighbor_ids: &[String],
    ) -> AppResult<Vec<ScoredItemRow>>;

    async fn projection_exists(&self, name: &str) -> AppResult<bool>;

    /// Fails if no projection with `name` exists.
    async fn drop_projection(&self, name: &str) -> AppResult<()>;

    /// Projects the listen graph as undirected. Fails if `name` is taken.
    async fn project_listen_graph(&self, name: &str) -> AppResult<ProjectionRow>;

    /// Runs Louvain over the projection and streams user assignments.
    async fn stream_communities(&self, name: &str) -> AppResult<Vec<CommunityRow>>;

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}

/// Catalog ingestion side of the graph: keeps item and topic nodes in step
/// with the external document store.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Creates uniqueness constraints. Safe to call repeatedly.
    async fn ensure_schema(&self) -> AppResult<()>;

    /// Creates or retitles an item and links it to its topics.
    async fn upsert_item(&self, item: &CatalogItem) -> AppResult<()>;
}
