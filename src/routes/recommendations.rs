use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{HybridRecommendation, Recommendation, SimilarUser},
    routes::AppState,
    services::DEFAULT_LIMIT,
};

/// Largest `limit` a caller may ask for
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    fn resolve(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

/// Handler for content-based recommendations
pub async fn content(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::info!(request_id = %request_id, user_id = %user_id, "Content recommendations requested");
    let recs = state
        .recommender
        .recommend_by_content(&user_id, params.resolve())
        .await?;
    Ok(Json(recs))
}

/// Handler for collaborative recommendations
pub async fn collaborative(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    tracing::info!(request_id = %request_id, user_id = %user_id, "Collaborative recommendations requested");
    let recs = state
        .recommender
        .recommend_by_collaboration(&user_id, params.resolve())
        .await?;
    Ok(Json(recs))
}

/// Handler for hybrid recommendations
pub async fn hybrid(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<HybridRecommendation>>> {
    tracing::info!(request_id = %request_id, user_id = %user_id, "Hybrid recommendations requested");
    let recs = state.recommender.recommend_hybrid(&user_id).await?;
    Ok(Json(recs))
}

/// Handler for similar users
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<SimilarUser>>> {
    tracing::info!(request_id = %request_id, user_id = %user_id, "Similar users requested");
    let users = state
        .recommender
        .similar_users(&user_id, params.resolve())
        .await?;
    Ok(Json(users))
}
