//! 在线状态上报端点。

use std::str::FromStr;
use std::sync::Arc;

use academia_code_api_types::PresenceUpdateRequest;
use academia_code_core::domain::UserId;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::state::AppState;
use super::ApiError;
use crate::watch::{ChangeKind, StoreCollection, StoreEvent};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/updateStatus", post(update_status))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// `POST /api/updateStatus?userId=<id>`，body `{status, lastSeen}`。
/// 缺参数返回 400；存储失败返回 500。
async fn update_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
    Json(body): Json<PresenceUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(user_id) = query.user_id else {
        return Err(ApiError::bad_request("missing userId"));
    };
    let (Some(status), Some(last_seen)) = (body.status, body.last_seen) else {
        return Err(ApiError::bad_request("missing status or lastSeen"));
    };

    let user_id =
        UserId::from_str(&user_id).map_err(|_| ApiError::bad_request("invalid userId"))?;
    let last_seen = chrono::DateTime::parse_from_rfc3339(&last_seen)
        .map(|parsed| parsed.naive_utc())
        .map_err(|_| ApiError::bad_request("lastSeen must be an RFC 3339 timestamp"))?;

    let found = state
        .users
        .update_presence(user_id, status, last_seen)
        .await
        .map_err(ApiError::internal)?;
    if !found {
        return Err(ApiError::not_found("user not found"));
    }

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Users,
        entity_id: user_id.to_string(),
        kind: ChangeKind::Updated,
    });

    Ok(Json(serde_json::json!({ "ok": true })))
}
