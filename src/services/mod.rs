use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    db::GraphStore,
    error::{AppError, AppResult},
};

use communities::ProjectionCleanup;

pub mod communities;
pub mod hybrid;
pub mod interactions;
pub mod recommendations;
pub mod similar_users;

/// Result size used when a caller does not pass a limit
pub const DEFAULT_LIMIT: usize = 5;

/// Recommendation engine over the user-interaction graph.
///
/// Holds no mutable state: every operation is a fresh set of graph store
/// queries followed by in-process ranking, so one instance is shared across
/// all request handlers.
#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn GraphStore>,
    query_timeout: Duration,
    projection_cleanup: ProjectionCleanup,
}

impl Recommender {
    pub fn new(store: Arc<dyn GraphStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
            projection_cleanup: ProjectionCleanup::default(),
        }
    }

    pub fn with_projection_cleanup(mut self, cleanup: ProjectionCleanup) -> Self {
        self.projection_cleanup = cleanup;
        self
    }

    pub fn projection_cleanup(&self) -> ProjectionCleanup {
        self.projection_cleanup
    }

    /// Runs one store call under the query deadline.
    ///
    /// On expiry the call's future is dropped, which abandons the in-flight
    /// query. Nothing is retried.
    async fn bounded<T, F>(&self, query: &'static str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(query, backend = self.store.backend(), error = %e, "Graph query failed");
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    query,
                    backend = self.store.backend(),
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "Graph query timed out"
                );
                Err(AppError::Dependency(format!(
                    "Graph query `{}` timed out after {}ms",
                    query,
                    self.query_timeout.as_millis()
                )))
            }
        }
    }
}

/// Trims an identifier and rejects it if nothing is left
fn require_id<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}
