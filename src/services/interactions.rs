use crate::{
    db::store::ListenParams,
    error::{AppError, AppResult},
    models::{ListenEvent, ListenOutcome},
};

use super::{require_id, Recommender};

impl Recommender {
    /// Records that a user listened to an item.
    ///
    /// The user is created on first sight, named after `user_name` or, failing
    /// that, the user id. An unknown item is not an error: the outcome carries
    /// no `item_id` and no edge is written. Repeat listens refresh the single
    /// edge for the pair, replacing its weight only when one is given.
    pub async fn record(&self, event: ListenEvent) -> AppResult<ListenOutcome> {
        let user_id = require_id("user_id", &event.user_id)?.to_string();
        let item_id = require_id("item_id", &event.item_id)?.to_string();

        if let Some(weight) = event.weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(AppError::Validation(format!(
                    "weight must be a positive number, got {}",
                    weight
                )));
            }
        }

        let user_name = event
            .user_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| user_id.clone());

        let params = ListenParams {
            user_id,
            user_name,
            item_id,
            weight: event.weight,
        };

        let row = self
            .bounded("record_listen", self.store.record_listen(&params))
            .await?;

        match &row {
            Some(_) => tracing::info!(
                user_id = %params.user_id,
                item_id = %params.item_id,
                weight = ?params.weight,
                "Listen relationship stored"
            ),
            None => tracing::warn!(
                user_id = %params.user_id,
                item_id = %params.item_id,
                "Item not found, no listen relationship created"
            ),
        }

        Ok(ListenOutcome {
            user_id: params.user_id,
            item_id: row.map(|r| r.item_id),
        })
    }
}
