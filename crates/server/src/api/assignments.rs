//! 作业分发路由。
//!
//! 作业只有创建与按范围查询两种操作；没有修改或撤销。

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use academia_code_core::domain::{
    AccessScope, AssignmentTarget, ChallengeId, GroupId, Role, UserId,
};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::challenges::language_label;
use super::state::AppState;
use super::{ApiError, caller_scope, resolve_assignment_visibility};
use crate::repository::{AssignmentRecord, NewAssignment};
use crate::watch::{ChangeKind, StoreCollection, StoreEvent};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/assignments", get(list_assignments).post(create_assignment))
}

/// 逾期是读取时派生的状态；没有截止日期的作业永远不会逾期。
pub(crate) fn is_overdue(due_date: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    due_date.is_some_and(|due| due < now)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    caller: String,
    #[serde(default)]
    group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssignmentRequest {
    caller: String,
    challenge_id: String,
    target_kind: String,
    target_id: String,
    #[serde(default)]
    due_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChallengeSummary {
    pub id: String,
    pub title: String,
    pub language: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentResponse {
    pub id: String,
    pub challenge_id: String,
    pub target_kind: String,
    pub target_id: String,
    pub assigned_by: String,
    pub assigned_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub overdue: bool,
    /// `None` when the referenced challenge has not arrived or was deleted;
    /// the row still renders.
    pub challenge: Option<ChallengeSummary>,
}

fn parse_target(kind: &str, target_id: &str) -> Result<AssignmentTarget, ApiError> {
    match kind {
        "group" => GroupId::from_str(target_id)
            .map(AssignmentTarget::Group)
            .map_err(|_| ApiError::bad_request("invalid target id")),
        "student" => UserId::from_str(target_id)
            .map(AssignmentTarget::Student)
            .map_err(|_| ApiError::bad_request("invalid target id")),
        other => Err(ApiError::bad_request(format!(
            "unknown target kind '{other}'"
        ))),
    }
}

fn target_kind_label(target: &AssignmentTarget) -> &'static str {
    match target {
        AssignmentTarget::Group(_) => "group",
        AssignmentTarget::Student(_) => "student",
    }
}

fn parse_due_date(raw: &str) -> Result<NaiveDateTime, ApiError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.naive_utc())
        .map_err(|_| ApiError::bad_request("dueDate must be an RFC 3339 timestamp"))
}

async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assigned_by = UserId::from_str(&request.caller)
        .map_err(|_| ApiError::bad_request("invalid caller id"))?;
    let scope = caller_scope(&state, &request.caller).await?;
    if scope.role() == Role::Student {
        return Err(ApiError::forbidden("assignment creation"));
    }

    let challenge_id = ChallengeId::from_str(&request.challenge_id)
        .map_err(|_| ApiError::bad_request("invalid challenge id"))?;
    let target = parse_target(&request.target_kind, &request.target_id)?;
    let due_date = request.due_date.as_deref().map(parse_due_date).transpose()?;

    let challenge = state
        .challenges
        .find_by_id(challenge_id)
        .await
        .map_err(ApiError::internal)?;
    if challenge.is_none() {
        return Err(ApiError::bad_request("unknown challenge"));
    }

    // The target must resolve to an existing entity of its kind.
    match target {
        AssignmentTarget::Group(group_id) => {
            let group = state
                .groups
                .find_by_id(group_id)
                .await
                .map_err(ApiError::internal)?;
            if group.is_none() {
                return Err(ApiError::bad_request("unknown target group"));
            }
        }
        AssignmentTarget::Student(user_id) => {
            let student = state
                .users
                .find_by_id(user_id)
                .await
                .map_err(ApiError::internal)?;
            if student.is_none() {
                return Err(ApiError::bad_request("unknown target student"));
            }
        }
    }

    // Teachers can only address targets already inside their own scope.
    if scope.role() == Role::Teacher {
        let visibility = resolve_assignment_visibility(&state, &scope).await?;
        if !visibility.allows(&target) {
            return Err(ApiError::forbidden("assignment outside managed groups"));
        }
    }

    let record = state
        .assignments
        .create(NewAssignment {
            challenge_id,
            target,
            assigned_by,
            due_date,
        })
        .await
        .map_err(ApiError::internal)?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Assignments,
        entity_id: record.id.to_string(),
        kind: ChangeKind::Created,
    });

    let mut responses = to_responses(&state, vec![record]).await?;
    responses
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::internal(anyhow::anyhow!("created assignment vanished")))
}

async fn list_assignments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    let group_filter = query
        .group_id
        .as_deref()
        .map(GroupId::from_str)
        .transpose()
        .map_err(|_| ApiError::bad_request("invalid group id"))?;

    let assignments = list_for_scope(&state, &scope, group_filter).await?;
    Ok(Json(assignments))
}

pub(crate) async fn list_for_scope(
    state: &AppState,
    scope: &AccessScope,
    group_filter: Option<GroupId>,
) -> Result<Vec<AssignmentResponse>, ApiError> {
    let visibility = resolve_assignment_visibility(state, scope).await?;
    let mut records = state
        .assignments
        .list(&visibility)
        .await
        .map_err(ApiError::internal)?;

    // The store-side filter already matched, but the rows are checked again
    // before leaving the server.
    records.retain(|record| visibility.allows(&record.target));

    if let Some(group_id) = group_filter {
        records.retain(|record| record.target == AssignmentTarget::Group(group_id));
    }

    to_responses(state, records).await
}

/// 组装作业响应：合并挑战摘要并派生逾期标记。
///
/// 挑战与作业是独立到达的集合；引用的挑战缺席时照常渲染该行。
pub(crate) async fn to_responses(
    state: &AppState,
    records: Vec<AssignmentRecord>,
) -> Result<Vec<AssignmentResponse>, ApiError> {
    let mut challenge_ids: Vec<ChallengeId> =
        records.iter().map(|record| record.challenge_id).collect();
    challenge_ids.sort_unstable_by_key(ToString::to_string);
    challenge_ids.dedup();

    let challenges = state
        .challenges
        .find_many(&challenge_ids)
        .await
        .map_err(ApiError::internal)?;
    let summaries: HashMap<String, ChallengeSummary> = challenges
        .into_iter()
        .map(|challenge| {
            (
                challenge.id.to_string(),
                ChallengeSummary {
                    id: challenge.id.to_string(),
                    title: challenge.title,
                    language: language_label(challenge.language).to_string(),
                    category: challenge.category,
                },
            )
        })
        .collect();

    let now = Utc::now().naive_utc();
    let responses = records
        .into_iter()
        .map(|record| {
            let challenge = summaries.get(&record.challenge_id.to_string()).cloned();

            AssignmentResponse {
                id: record.id.to_string(),
                challenge_id: record.challenge_id.to_string(),
                target_kind: target_kind_label(&record.target).to_string(),
                target_id: record.target.id_string(),
                assigned_by: record.assigned_by.to_string(),
                assigned_at: record.assigned_at.and_utc().to_rfc3339(),
                due_date: record.due_date.map(|due| due.and_utc().to_rfc3339()),
                overdue: is_overdue(record.due_date, now),
                challenge,
            }
        })
        .collect();

    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::is_overdue;
    use chrono::{Duration, Utc};

    #[test]
    fn past_due_date_is_overdue() {
        let now = Utc::now().naive_utc();

        assert!(is_overdue(Some(now - Duration::hours(1)), now));
        assert!(!is_overdue(Some(now + Duration::hours(1)), now));
    }

    #[test]
    fn missing_due_date_is_never_overdue() {
        let now = Utc::now().naive_utc();

        assert!(!is_overdue(None, now));
    }
}
