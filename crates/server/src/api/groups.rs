//! 分组管理路由。

use std::str::FromStr;
use std::sync::Arc;

use academia_code_core::domain::{AccessScope, GroupId, Role, Schedule, WeeklySchedule};
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::{ApiError, caller_scope};
use crate::repository::{GroupRecord, NewGroup};
use crate::watch::{ChangeKind, StoreCollection, StoreEvent};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/{id}/schedule", patch(update_schedule))
        .route("/api/groups/{id}", delete(delete_group))
}

#[derive(Debug, Deserialize)]
struct CallerQuery {
    caller: String,
}

/// Either the structured weekly form or the legacy free-text string older
/// admin screens still submit.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScheduleInput {
    Weekly {
        days: Vec<String>,
        #[serde(rename = "startTime")]
        start_time: String,
        #[serde(rename = "endTime")]
        end_time: String,
    },
    Legacy(String),
}

impl ScheduleInput {
    fn into_schedule(self) -> Result<Schedule, ApiError> {
        match self {
            Self::Weekly {
                days,
                start_time,
                end_time,
            } => {
                if days.is_empty() {
                    return Err(ApiError::bad_request("schedule needs at least one day"));
                }
                let weekly = WeeklySchedule::new(days, &start_time, &end_time)
                    .map_err(|err| ApiError::bad_request(err.to_string()))?;
                Ok(Schedule::Weekly(weekly))
            }
            Self::Legacy(text) => {
                if text.trim().is_empty() {
                    return Err(ApiError::bad_request("schedule is required"));
                }
                Ok(Schedule::Legacy(text))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateGroupRequest {
    caller: String,
    name: String,
    schedule: ScheduleInput,
}

#[derive(Debug, Deserialize)]
struct UpdateScheduleRequest {
    caller: String,
    schedule: ScheduleInput,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupResponse {
    pub id: String,
    pub name: String,
    /// Structured object for weekly schedules, plain string for legacy rows.
    pub schedule: serde_json::Value,
}

fn to_response(record: GroupRecord) -> Result<GroupResponse, ApiError> {
    let schedule = match record.schedule {
        Schedule::Weekly(weekly) => {
            serde_json::to_value(weekly).map_err(|err| ApiError::internal(err.into()))?
        }
        Schedule::Legacy(text) => serde_json::Value::String(text),
    };

    Ok(GroupResponse {
        id: record.id.to_string(),
        name: record.name,
        schedule,
    })
}

async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let scope = caller_scope(&state, &request.caller).await?;
    if scope.role() != Role::SuperAdmin {
        return Err(ApiError::forbidden("group creation"));
    }

    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let schedule = request.schedule.into_schedule()?;

    let record = state
        .groups
        .create(NewGroup {
            name: request.name,
            schedule,
        })
        .await
        .map_err(ApiError::internal)?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Groups,
        entity_id: record.id.to_string(),
        kind: ChangeKind::Created,
    });

    to_response(record).map(Json)
}

async fn list_groups(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    let groups = list_for_scope(&state, &scope).await?;
    Ok(Json(groups))
}

pub(crate) async fn list_for_scope(
    state: &AppState,
    scope: &AccessScope,
) -> Result<Vec<GroupResponse>, ApiError> {
    let records = state
        .groups
        .list(&scope.group_filter())
        .await
        .map_err(ApiError::internal)?;

    records.into_iter().map(to_response).collect()
}

async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group_id =
        GroupId::from_str(&id).map_err(|_| ApiError::bad_request("invalid group id"))?;

    let scope = caller_scope(&state, &request.caller).await?;
    let may_edit = match &scope {
        AccessScope::SuperAdmin => true,
        AccessScope::Teacher { managed_group_ids } => managed_group_ids.contains(&group_id),
        AccessScope::Student { .. } => false,
    };
    if !may_edit {
        return Err(ApiError::forbidden("schedule update"));
    }

    let schedule = request.schedule.into_schedule()?;
    let updated = state
        .groups
        .update_schedule(group_id, schedule)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("group not found"))?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Groups,
        entity_id: updated.id.to_string(),
        kind: ChangeKind::Updated,
    });

    to_response(updated).map(Json)
}

async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    if scope.role() != Role::SuperAdmin {
        return Err(ApiError::forbidden("group deletion"));
    }

    let group_id =
        GroupId::from_str(&id).map_err(|_| ApiError::bad_request("invalid group id"))?;

    let deleted = state
        .groups
        .delete(group_id)
        .await
        .map_err(ApiError::internal)?;
    if !deleted {
        return Err(ApiError::not_found("group not found"));
    }

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Groups,
        entity_id: id,
        kind: ChangeKind::Deleted,
    });

    Ok(Json(serde_json::json!({ "deleted": true })))
}
