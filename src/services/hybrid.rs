use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{HybridRecommendation, Recommendation},
};

use super::{Recommender, DEFAULT_LIMIT};

impl Recommender {
    /// Blends the content and collaborative rankings for `user_id`.
    ///
    /// Both scorers run concurrently with the default limit. If either fails
    /// the whole call fails; no partial merge is returned.
    pub async fn recommend_hybrid(&self, user_id: &str) -> AppResult<Vec<HybridRecommendation>> {
        let (content, collaborative) = tokio::try_join!(
            self.recommend_by_content(user_id, DEFAULT_LIMIT),
            self.recommend_by_collaboration(user_id, DEFAULT_LIMIT),
        )?;

        let merged = merge(&content, &collaborative);
        tracing::debug!(
            user_id,
            content = content.len(),
            collaborative = collaborative.len(),
            merged = merged.len(),
            "Hybrid recommendations merged"
        );
        Ok(merged)
    }
}

/// Scales each score by the set's own maximum. A zero maximum maps every
/// entry to 0.0.
pub fn normalise(items: &[Recommendation]) -> HashMap<&str, f64> {
    let max = items.iter().map(|item| item.score).max().unwrap_or(0);
    items
        .iter()
        .map(|item| {
            let score = if max == 0 {
                0.0
            } else {
                item.score as f64 / max as f64
            };
            (item.id.as_str(), score)
        })
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn title_of<'a>(items: &'a [Recommendation], id: &str) -> Option<&'a str> {
    items
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.title.as_str())
        .filter(|title| !title.is_empty())
}

/// Sums the separately normalised scores over the union of both sets.
///
/// Titles come from the content set first. Output is ordered by merged score
/// descending; equal scores keep content order, then collaborative order.
pub fn merge(content: &[Recommendation], collaborative: &[Recommendation]) -> Vec<HybridRecommendation> {
    let content_scores = normalise(content);
    let collaborative_scores = normalise(collaborative);

    let mut universe: Vec<&str> = Vec::with_capacity(content.len() + collaborative.len());
    for item in content.iter().chain(collaborative) {
        if !universe.contains(&item.id.as_str()) {
            universe.push(item.id.as_str());
        }
    }

    let mut merged: Vec<HybridRecommendation> = universe
        .into_iter()
        .map(|id| {
            let score = content_scores.get(id).copied().unwrap_or(0.0)
                + collaborative_scores.get(id).copied().unwrap_or(0.0);
            let title = title_of(content, id)
                .or_else(|| title_of(collaborative, id))
                .unwrap_or_default();
            HybridRecommendation {
                id: id.to_string(),
                title: title.to_string(),
                score: round3(score),
            }
        })
        .collect();

    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::db::store::{MockGraphStore, ScoredItemRow, UserOverlapRow};
    use crate::error::AppError;

    fn rec(id: &str, title: &str, score: u64) -> Recommendation {
        Recommendation {
            id: id.to_string(),
            title: title.to_string(),
            score,
        }
    }

    fn score_of(items: &[HybridRecommendation], id: &str) -> f64 {
        items.iter().find(|item| item.id == id).unwrap().score
    }

    #[test]
    fn test_normalise_divides_by_set_maximum() {
        let items = [rec("a", "", 4), rec("b", "", 2), rec("c", "", 1)];
        let scores = normalise(&items);
        assert_eq!(scores["a"], 1.0);
        assert_eq!(scores["b"], 0.5);
        assert_eq!(scores["c"], 0.25);
    }

    #[test]
    fn test_normalise_zero_maximum_is_zero_not_nan() {
        let items = [rec("a", "", 0), rec("b", "", 0)];
        let scores = normalise(&items);
        assert!(scores.values().all(|&s| s == 0.0));
    }

    #[test]
    fn test_normalise_empty() {
        assert!(normalise(&[]).is_empty());
    }

    #[test]
    fn test_merge_sums_and_rounds() {
        let content = vec![rec("t2", "Second", 3), rec("t4", "Fourth", 1)];
        let collaborative = vec![rec("t4", "Fourth (collab)", 3), rec("t5", "Fifth", 2)];

        let merged = merge(&content, &collaborative);

        assert_eq!(score_of(&merged, "t4"), 1.333);
        assert_eq!(score_of(&merged, "t2"), 1.0);
        assert_eq!(score_of(&merged, "t5"), 0.667);
        assert_eq!(merged[0].id, "t4");
        assert_eq!(merged[0].title, "Fourth");
    }

    #[test]
    fn test_merge_does_not_let_scale_dominate() {
        let content = vec![rec("big", "Big", 100)];
        let collaborative = vec![rec("small", "Small", 1)];

        let merged = merge(&content, &collaborative);
        assert_eq!(score_of(&merged, "big"), score_of(&merged, "small"));
    }

    #[test]
    fn test_merge_is_order_independent_per_item() {
        let content = vec![rec("a", "A", 5), rec("b", "B", 2), rec("c", "C", 1)];
        let collaborative = vec![rec("c", "C", 4), rec("d", "D", 3), rec("a", "A", 1)];

        let forward = merge(&content, &collaborative);
        let reverse = merge(&collaborative, &content);

        assert_eq!(forward.len(), reverse.len());
        for item in &forward {
            assert_eq!(item.score, score_of(&reverse, &item.id));
        }
    }

    #[test]
    fn test_merge_title_fallbacks() {
        let content = vec![rec("a", "", 2)];
        let collaborative = vec![rec("a", "From collab", 1), rec("b", "", 1)];

        let merged = merge(&content, &collaborative);
        let title = |id: &str| merged.iter().find(|m| m.id == id).unwrap().title.clone();

        assert_eq!(title("a"), "From collab");
        assert_eq!(title("b"), "");
    }

    #[test]
    fn test_merge_scores_are_non_increasing() {
        let content = vec![rec("a", "A", 1), rec("b", "B", 3)];
        let collaborative = vec![rec("c", "C", 2), rec("b", "B", 1)];

        let merged = merge(&content, &collaborative);
        assert!(merged.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_hybrid_aborts_when_collaborative_fails() {
        let mut store = MockGraphStore::new();
        store.expect_backend().return_const("mock");
        store.expect_topic_overlap().returning(|_| {
            Ok(vec![ScoredItemRow {
                id: "t2".to_string(),
                title: "Second".to_string(),
                score: 4,
            }])
        });
        store
            .expect_user_overlap()
            .returning(|_| Err(AppError::Dependency("Neo.ClientError.Procedure".to_string())));

        let recommender = Recommender::new(Arc::new(store), Duration::from_secs(1));
        let result = recommender.recommend_hybrid("u1").await;

        assert!(matches!(result, Err(AppError::Dependency(_))));
    }

    #[tokio::test]
    async fn test_hybrid_with_only_content_signal() {
        let mut store = MockGraphStore::new();
        store.expect_topic_overlap().returning(|_| {
            Ok(vec![
                ScoredItemRow { id: "t2".to_string(), title: "Second".to_string(), score: 4 },
                ScoredItemRow { id: "t3".to_string(), title: "Third".to_string(), score: 2 },
            ])
        });
        store.expect_user_overlap().returning(|_| Ok(Vec::<UserOverlapRow>::new()));

        let recommender = Recommender::new(Arc::new(store), Duration::from_secs(1));
        let merged = recommender.recommend_hybrid("u1").await.unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "t2");
        assert_eq!(merged[0].score, 1.0);
        assert_eq!(merged[1].score, 0.5);
    }
}
