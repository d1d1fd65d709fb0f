use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::Recommender,
};

pub mod communities;
pub mod listen;
pub mod recommendations;

/// Shared handler state
pub struct AppState {
    pub recommender: Recommender,
    /// Projection name used by `/communities` when none is given
    pub default_graph_name: String,
}

impl AppState {
    pub fn new(recommender: Recommender, default_graph_name: impl Into<String>) -> Self {
        Self {
            recommender,
            default_graph_name: default_graph_name.into(),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/listen", post(listen::listen))
        .route("/content/:user_id", get(recommendations::content))
        .route("/collab/:user_id", get(recommendations::collaborative))
        .route("/hybrid/:user_id", get(recommendations::hybrid))
        .route("/similar/:user_id", get(recommendations::similar))
        .route("/communities", get(communities::communities))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
