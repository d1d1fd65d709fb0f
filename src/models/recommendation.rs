use serde::{Deserialize, Serialize};

use crate::db::store::{ScoredItemRow, UserOverlapRow};

/// An item ranked by a single signal (content or collaborative)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    /// Raw path/occurrence count from the graph
    pub score: u64,
}

impl From<ScoredItemRow> for Recommendation {
    fn from(row: ScoredItemRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            score: row.score,
        }
    }
}

/// An item ranked by the merged, normalised content + collaborative score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridRecommendation {
    pub id: String,
    pub title: String,
    /// Sum of both normalised scores, in `[0.0, 2.0]`, rounded to 3 decimals
    pub score: f64,
}

/// Another user ranked by listening overlap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarUser {
    pub id: String,
    /// Number of distinct items both users listened to
    pub weight: u64,
}

impl From<UserOverlapRow> for SimilarUser {
    fn from(row: UserOverlapRow) -> Self {
        Self {
            id: row.id,
            weight: row.shared,
        }
    }
}
