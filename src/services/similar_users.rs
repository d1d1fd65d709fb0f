use crate::{error::AppResult, models::SimilarUser};

use super::{recommendations::rank_users, require_id, Recommender};

impl Recommender {
    /// Other users ranked by the number of distinct items they share with `user_id`
    pub async fn similar_users(&self, user_id: &str, limit: usize) -> AppResult<Vec<SimilarUser>> {
        let user_id = require_id("user_id", user_id)?;

        let rows = self
            .bounded("user_overlap", self.store.user_overlap(user_id))
            .await?;
        let similar: Vec<SimilarUser> = rank_users(rows)
            .into_iter()
            .take(limit)
            .map(SimilarUser::from)
            .collect();

        tracing::debug!(user_id, returned = similar.len(), "Similar users ranked");
        Ok(similar)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::db::{store::Catalog, MemoryGraphStore};
    use crate::models::{CatalogItem, ListenEvent};

    async fn recommender_with_history() -> Recommender {
        let store = Arc::new(MemoryGraphStore::new());
        for id in ["t1", "t2", "t3", "t4"] {
            store
                .upsert_item(&CatalogItem::new(id, id, Vec::<String>::new()))
                .await
                .unwrap();
        }
        let recommender = Recommender::new(store, Duration::from_secs(1));
        for (user, item) in [
            ("u1", "t1"),
            ("u1", "t2"),
            ("u1", "t3"),
            ("u2", "t1"),
            ("u3", "t1"),
            ("u3", "t2"),
            ("u3", "t3"),
            ("u4", "t4"),
        ] {
            recommender.record(ListenEvent::new(user, item)).await.unwrap();
        }
        recommender
    }

    #[tokio::test]
    async fn test_ranks_by_shared_items() {
        let recommender = recommender_with_history().await;
        let similar = recommender.similar_users("u1", 5).await.unwrap();

        assert_eq!(
            similar,
            vec![
                SimilarUser { id: "u3".to_string(), weight: 3 },
                SimilarUser { id: "u2".to_string(), weight: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_repeat_listens_do_not_inflate_weight() {
        let recommender = recommender_with_history().await;
        recommender
            .record(ListenEvent::new("u2", "t1").with_weight(4.0))
            .await
            .unwrap();

        let similar = recommender.similar_users("u1", 5).await.unwrap();
        let u2 = similar.iter().find(|u| u.id == "u2").unwrap();
        assert_eq!(u2.weight, 1);
    }

    #[tokio::test]
    async fn test_respects_limit_and_excludes_self() {
        let recommender = recommender_with_history().await;
        let similar = recommender.similar_users("u1", 1).await.unwrap();

        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].id, "u3");
        assert!(recommender
            .similar_users("u1", 5)
            .await
            .unwrap()
            .iter()
            .all(|u| u.id != "u1" && u.id != "u4"));
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_similar_users() {
        let recommender = recommender_with_history().await;
        assert!(recommender.similar_users("ghost", 5).await.unwrap().is_empty());
    }
}
