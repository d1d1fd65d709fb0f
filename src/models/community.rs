use serde::{Deserialize, Serialize};

use crate::db::store::CommunityRow;

/// A user's cluster in the most recent community detection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityAssignment {
    pub user_id: String,
    pub community_id: i64,
}

impl From<CommunityRow> for CommunityAssignment {
    fn from(row: CommunityRow) -> Self {
        Self {
            user_id: row.user_id,
            community_id: row.community_id,
        }
    }
}
