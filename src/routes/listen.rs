use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::ListenEvent,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListenRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub transcription_id: Option<String>,
    pub weight: Option<f64>,
    pub user_name: Option<String>,
}

/// Accepts ids sent as JSON strings or numbers; anything else counts as absent
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Handler for recording a listen event
pub async fn listen(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ListenRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (Some(user_id), Some(item_id)) = (
        non_empty(request.user_id),
        non_empty(request.transcription_id),
    ) else {
        return Err(AppError::Validation(
            "user_id and transcription_id are required.".to_string(),
        ));
    };

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        transcription_id = %item_id,
        "Recording listen event"
    );

    let event = ListenEvent {
        user_id,
        item_id,
        user_name: request.user_name,
        weight: request.weight,
    };
    state.recommender.record(event).await?;

    Ok(Json(json!({ "message": "Listen relationship stored." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_become_strings() {
        let request: ListenRequest =
            serde_json::from_value(json!({"user_id": 42, "transcription_id": "t1"})).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("42"));
        assert_eq!(request.transcription_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_missing_and_null_ids_are_absent() {
        let request: ListenRequest =
            serde_json::from_value(json!({"user_id": null, "weight": 2.5})).unwrap();
        assert!(request.user_id.is_none());
        assert!(request.transcription_id.is_none());
        assert_eq!(request.weight, Some(2.5));
    }
}
