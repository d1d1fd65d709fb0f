use serde::Deserialize;

use crate::{error::AppResult, models::CommunityAssignment};

use super::{require_id, Recommender};

/// What happens to the named projection after a successful detection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionCleanup {
    /// Leave it in place; the next run on the same name drops it first.
    #[default]
    Lazy,
    /// Drop it as soon as the assignments have been streamed.
    DropAfterUse,
}

impl Recommender {
    /// Clusters users by their listening graph.
    ///
    /// Any existing projection named `projection_name` is dropped, a fresh
    /// undirected projection of the LISTENED_TO graph is created and Louvain
    /// is streamed over it. Assignments come back ordered by community id.
    /// Store failures surface as-is; a half-finished lifecycle is never
    /// retried.
    pub async fn detect_communities(
        &self,
        projection_name: &str,
    ) -> AppResult<Vec<CommunityAssignment>> {
        let name = require_id("graph_name", projection_name)?;

        if self
            .bounded("projection_exists", self.store.projection_exists(name))
            .await?
        {
            tracing::debug!(graph_name = name, "Dropping previous projection");
            self.bounded("drop_projection", self.store.drop_projection(name))
                .await?;
        }

        let projection = self
            .bounded("project_listen_graph", self.store.project_listen_graph(name))
            .await?;
        tracing::info!(
            graph_name = %projection.name,
            nodes = projection.node_count,
            relationships = projection.relationship_count,
            "Listen graph projected"
        );

        let rows = self
            .bounded("stream_communities", self.store.stream_communities(name))
            .await?;

        if self.projection_cleanup == ProjectionCleanup::DropAfterUse {
            self.bounded("drop_projection", self.store.drop_projection(name))
                .await?;
            tracing::debug!(graph_name = name, "Projection dropped after use");
        }

        let mut assignments: Vec<CommunityAssignment> =
            rows.into_iter().map(CommunityAssignment::from).collect();
        assignments.sort_by_key(|a| a.community_id);

        tracing::info!(
            graph_name = name,
            users = assignments.len(),
            "Communities detected"
        );
        Ok(assignments)
    }
}
