use crate::{
    db::store::{ScoredItemRow, UserOverlapRow},
    error::AppResult,
    models::Recommendation,
};

use super::{require_id, Recommender};

/// Most neighbours the collaborative scorer draws candidates from
pub const NEIGHBOR_CAP: usize = 10;

impl Recommender {
    /// Ranks unheard items by topic overlap with the user's history.
    ///
    /// An item's score is the number of (listened item, shared topic) paths
    /// leading to it, so overlap with several listened items accumulates.
    pub async fn recommend_by_content(
        &self,
        user_id: &str,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let user_id = require_id("user_id", user_id)?;

        let rows = self
            .bounded("topic_overlap", self.store.topic_overlap(user_id))
            .await?;
        let candidates = rows.len();
        let ranked = rank_items(rows, limit);

        tracing::debug!(user_id, candidates, returned = ranked.len(), "Content recommendations ranked");
        Ok(ranked)
    }

    /// Ranks unheard items by how many of the user's nearest listeners heard them.
    ///
    /// Neighbours are the [`NEIGHBOR_CAP`] users sharing the most items with
    /// `user_id`; an item's score is the number of those neighbours who
    /// listened to it.
    pub async fn recommend_by_collaboration(
        &self,
        user_id: &str,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let user_id = require_id("user_id", user_id)?;

        let overlap = self
            .bounded("user_overlap", self.store.user_overlap(user_id))
            .await?;
        let neighbors: Vec<String> = rank_users(overlap)
            .into_iter()
            .take(NEIGHBOR_CAP)
            .map(|row| row.id)
            .collect();

        if neighbors.is_empty() {
            tracing::debug!(user_id, "No overlapping listeners, skipping collaborative scoring");
            return Ok(Vec::new());
        }

        let rows = self
            .bounded(
                "neighbor_items",
                self.store.neighbor_items(user_id, &neighbors),
            )
            .await?;
        let ranked = rank_items(rows, limit);

        tracing::debug!(
            user_id,
            neighbors = neighbors.len(),
            returned = ranked.len(),
            "Collaborative recommendations ranked"
        );
        Ok(ranked)
    }
}

/// Orders by score descending, keeping store order among equal scores
pub(crate) fn rank_items(mut rows: Vec<ScoredItemRow>, limit: usize) -> Vec<Recommendation> {
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.into_iter().take(limit).map(Recommendation::from).collect()
}

/// Orders by shared item count descending, keeping store order among ties
pub(crate) fn rank_users(mut rows: Vec<UserOverlapRow>) -> Vec<UserOverlapRow> {
    rows.sort_by(|a, b| b.shared.cmp(&a.shared));
    rows
}
