use serde::{Deserialize, Serialize};

/// A single user interaction with a catalog item
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListenEvent {
    pub user_id: String,
    pub item_id: String,
    /// Display name stored only when the user node is first created
    pub user_name: Option<String>,
    /// Edge weight; `None` keeps the weight already on the edge
    pub weight: Option<f64>,
}

impl ListenEvent {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            user_name: None,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }
}

/// Result of recording a listen.
///
/// `item_id` is `None` when no item with the requested id exists, in which
/// case no edge was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenOutcome {
    pub user_id: String,
    pub item_id: Option<String>,
}

impl ListenOutcome {
    pub fn matched(&self) -> bool {
        self.item_id.is_some()
    }
}
