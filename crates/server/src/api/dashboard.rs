//! 角色仪表盘路由。

use std::sync::Arc;

use academia_code_core::domain::{AccessScope, Role};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::assignments::{AssignmentResponse, to_responses};
use super::state::AppState;
use super::users::role_label;
use super::{ApiError, caller_scope, resolve_assignment_visibility};

const RECENT_LIMIT: u64 = 5;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

#[derive(Debug, Deserialize)]
struct CallerQuery {
    caller: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardCounts {
    pub students: usize,
    pub groups: usize,
    pub challenges: usize,
    pub assignments: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardResponse {
    pub role: String,
    pub counts: DashboardCounts,
    pub recent_assignments: Vec<AssignmentResponse>,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    build(&state, &scope).await.map(Json)
}

/// 仪表盘是多集合的组合视图；各集合独立查询，互无顺序保证。
pub(crate) async fn build(
    state: &AppState,
    scope: &AccessScope,
) -> Result<DashboardResponse, ApiError> {
    let profiles = state
        .users
        .list(&scope.user_filter())
        .await
        .map_err(ApiError::internal)?;
    let students = profiles
        .iter()
        .filter(|profile| profile.membership.role() == Role::Student)
        .count();

    let groups = state
        .groups
        .list(&scope.group_filter())
        .await
        .map_err(ApiError::internal)?
        .len();

    let challenges = state.challenges.list().await.map_err(ApiError::internal)?.len();

    let visibility = resolve_assignment_visibility(state, scope).await?;
    let assignments = state
        .assignments
        .list(&visibility)
        .await
        .map_err(ApiError::internal)?
        .len();

    let recent_records = state
        .assignments
        .list_recent(&visibility, RECENT_LIMIT)
        .await
        .map_err(ApiError::internal)?;
    let recent_assignments = to_responses(state, recent_records).await?;

    Ok(DashboardResponse {
        role: role_label(scope.role()).to_string(),
        counts: DashboardCounts {
            students,
            groups,
            challenges,
            assignments,
        },
        recent_assignments,
    })
}
