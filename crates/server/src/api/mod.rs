//! API 路由模块。
//!
//! 按调用者角色的可见范围提供平台的全部数据操作。

pub mod assignments;
pub mod challenges;
pub mod dashboard;
pub mod error;
pub mod groups;
pub mod presence;
pub mod review;
pub mod state;
pub mod users;
pub mod workspace;
pub mod ws;

pub use error::ApiError;
pub use state::AppState;
pub use ws::websocket_handler;

use std::str::FromStr;
use std::sync::Arc;

use academia_code_api_types::HealthCheckResponse;
use academia_code_core::domain::{AccessScope, AssignmentVisibility, UserId};
use axum::{Json, Router, routing::get};

/// 创建完整的 API 路由。
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .merge(users::router())
        .merge(groups::router())
        .merge(challenges::router())
        .merge(assignments::router())
        .merge(dashboard::router())
        .merge(presence::router())
        .merge(review::router())
        .merge(workspace::router())
        .route("/ws", get(ws::websocket_handler))
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}

/// 解析调用者 uid 并从其资料构造访问范围。
pub(crate) async fn caller_scope(state: &AppState, caller: &str) -> Result<AccessScope, ApiError> {
    let user_id =
        UserId::from_str(caller).map_err(|_| ApiError::bad_request("invalid caller id"))?;

    let profile = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::forbidden("unknown caller"))?;

    Ok(AccessScope::for_membership(profile.id, &profile.membership))
}

/// 为调用者解析作业可见范围。
///
/// 教师范围需要先查出所管分组里的学生 uid，直接指派给这些学生的作业
/// 才会落入可见集合。
pub(crate) async fn resolve_assignment_visibility(
    state: &AppState,
    scope: &AccessScope,
) -> Result<AssignmentVisibility, ApiError> {
    let group_member_ids = match scope {
        AccessScope::Teacher { managed_group_ids } if !managed_group_ids.is_empty() => state
            .users
            .list_ids_in_groups(managed_group_ids)
            .await
            .map_err(ApiError::internal)?,
        _ => Vec::new(),
    };

    Ok(scope.assignment_visibility(group_member_ids))
}
