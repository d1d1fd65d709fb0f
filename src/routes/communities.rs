use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult, middleware::RequestId, models::CommunityAssignment, routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CommunityQuery {
    graph_name: Option<String>,
}

/// Handler for community detection
pub async fn communities(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<CommunityQuery>,
) -> AppResult<Json<Vec<CommunityAssignment>>> {
    let graph_name = params
        .graph_name
        .unwrap_or_else(|| state.default_graph_name.clone());

    tracing::info!(request_id = %request_id, graph_name = %graph_name, "Community detection requested");

    let assignments = state.recommender.detect_communities(&graph_name).await?;
    Ok(Json(assignments))
}
