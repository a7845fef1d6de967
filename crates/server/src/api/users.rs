//! 用户资料路由与特权建号流程。

use std::str::FromStr;
use std::sync::Arc;

use academia_code_core::domain::{AccessScope, GroupId, Role, RoleMembership, UserId};
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use identity_directory::{DirectoryError, NewAccount};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::{ApiError, caller_scope};
use crate::repository::{NewUserProfile, UserProfileRecord};
use crate::watch::{ChangeKind, StoreCollection, StoreEvent};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}/membership", patch(update_membership))
        .route("/api/users/{id}", delete(delete_user))
}

pub(crate) fn parse_role(raw: &str) -> Option<Role> {
    match raw {
        "student" => Some(Role::Student),
        "teacher" => Some(Role::Teacher),
        "super_admin" => Some(Role::SuperAdmin),
        _ => None,
    }
}

pub(crate) fn role_label(role: Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Teacher => "teacher",
        Role::SuperAdmin => "super_admin",
    }
}

#[derive(Debug, Deserialize)]
struct CallerQuery {
    caller: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    caller: String,
    email: String,
    password: String,
    display_name: String,
    role: String,
    #[serde(default)]
    group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMembershipRequest {
    caller: String,
    role: String,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    managed_group_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserProfileResponse {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
}

impl From<UserProfileRecord> for UserProfileResponse {
    fn from(record: UserProfileRecord) -> Self {
        let role = role_label(record.membership.role()).to_string();
        let group_id = record.membership.group_id().map(|id| id.to_string());
        let managed_group_ids = match &record.membership {
            RoleMembership::Teacher { managed_group_ids } => {
                Some(managed_group_ids.iter().map(ToString::to_string).collect())
            }
            _ => None,
        };

        Self {
            id: record.id.to_string(),
            display_name: record.display_name,
            email: record.email,
            role,
            group_id,
            managed_group_ids,
            presence_status: record.presence_status,
            last_seen: record
                .last_seen
                .map(|seen| seen.and_utc().to_rfc3339()),
        }
    }
}

fn parse_group_id(raw: &str) -> Result<GroupId, ApiError> {
    GroupId::from_str(raw).map_err(|_| ApiError::bad_request(format!("invalid group id '{raw}'")))
}

fn membership_from_parts(
    role: Role,
    group_id: Option<String>,
    managed_group_ids: Option<Vec<String>>,
) -> Result<RoleMembership, ApiError> {
    match role {
        Role::Student => {
            let group_id = group_id.as_deref().map(parse_group_id).transpose()?;
            Ok(RoleMembership::Student { group_id })
        }
        Role::Teacher => {
            let managed_group_ids = managed_group_ids
                .unwrap_or_default()
                .iter()
                .map(|id| parse_group_id(id))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RoleMembership::Teacher { managed_group_ids })
        }
        Role::SuperAdmin => Ok(RoleMembership::SuperAdmin),
    }
}

/// 特权建号：先在外部目录创建凭据并写入角色声明，再落本地资料文档。
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let scope = caller_scope(&state, &request.caller).await?;
    if scope.role() != Role::SuperAdmin {
        return Err(ApiError::forbidden("user creation"));
    }

    if request.email.trim().is_empty()
        || request.password.trim().is_empty()
        || request.display_name.trim().is_empty()
    {
        return Err(ApiError::bad_request(
            "email, password and displayName are required",
        ));
    }

    let role =
        parse_role(&request.role).ok_or_else(|| ApiError::bad_request("unknown role"))?;
    let membership = membership_from_parts(role, request.group_id, None)?;

    if let Some(group_id) = membership.group_id() {
        let group = state
            .groups
            .find_by_id(group_id)
            .await
            .map_err(ApiError::internal)?;
        if group.is_none() {
            return Err(ApiError::bad_request(format!("unknown group '{group_id}'")));
        }
    }

    // The directory rejects duplicates too, but a no-op directory cannot;
    // the profile store stays the authority on the conflict either way.
    let existing = state
        .users
        .find_by_email(&request.email)
        .await
        .map_err(ApiError::internal)?;
    if existing.is_some() {
        return Err(DirectoryError::EmailTaken {
            email: request.email,
        }
        .into());
    }

    let account = state
        .directory
        .create_account(NewAccount {
            email: request.email.clone(),
            password: request.password,
            display_name: request.display_name.clone(),
        })
        .await?;
    state
        .directory
        .set_role_claim(&account.uid, role_label(role))
        .await?;

    let user_id = UserId::from_str(&account.uid).map_err(|_| {
        ApiError::internal(anyhow::anyhow!(
            "directory returned a non-uuid account id: {}",
            account.uid
        ))
    })?;

    let profile = state
        .users
        .create(NewUserProfile {
            id: user_id,
            display_name: request.display_name,
            email: request.email,
            membership,
        })
        .await
        .map_err(ApiError::internal)?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Users,
        entity_id: profile.id.to_string(),
        kind: ChangeKind::Created,
    });

    Ok(Json(profile.into()))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<Vec<UserProfileResponse>>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    let profiles = list_for_scope(&state, &scope).await?;
    Ok(Json(profiles))
}

pub(crate) async fn list_for_scope(
    state: &AppState,
    scope: &AccessScope,
) -> Result<Vec<UserProfileResponse>, ApiError> {
    let records = state
        .users
        .list(&scope.user_filter())
        .await
        .map_err(ApiError::internal)?;

    Ok(records.into_iter().map(UserProfileResponse::from).collect())
}

async fn update_membership(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMembershipRequest>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let scope = caller_scope(&state, &request.caller).await?;
    if scope.role() != Role::SuperAdmin {
        return Err(ApiError::forbidden("membership update"));
    }

    let user_id =
        UserId::from_str(&id).map_err(|_| ApiError::bad_request("invalid user id"))?;
    let role =
        parse_role(&request.role).ok_or_else(|| ApiError::bad_request("unknown role"))?;
    let membership = membership_from_parts(role, request.group_id, request.managed_group_ids)?;

    let updated = state
        .users
        .update_membership(user_id, membership)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Users,
        entity_id: updated.id.to_string(),
        kind: ChangeKind::Updated,
    });

    Ok(Json(updated.into()))
}

/// 只删除资料文档；外部目录中的登录凭据仍然保留。
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    if scope.role() != Role::SuperAdmin {
        return Err(ApiError::forbidden("user deletion"));
    }

    let user_id =
        UserId::from_str(&id).map_err(|_| ApiError::bad_request("invalid user id"))?;

    let deleted = state
        .users
        .delete(user_id)
        .await
        .map_err(ApiError::internal)?;
    if !deleted {
        return Err(ApiError::not_found("user not found"));
    }

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Users,
        entity_id: id,
        kind: ChangeKind::Deleted,
    });

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::{parse_role, role_label};
    use academia_code_core::domain::Role;

    #[test]
    fn role_labels_round_trip() {
        for role in [Role::Student, Role::Teacher, Role::SuperAdmin] {
            assert_eq!(parse_role(role_label(role)), Some(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(parse_role("principal"), None);
    }
}
