//! 挑战题库路由。

use std::str::FromStr;
use std::sync::Arc;

use academia_code_core::domain::{ChallengeId, ChallengeLanguage, Role, TestCase};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::{ApiError, caller_scope};
use crate::repository::{ChallengeRecord, NewChallenge, UpdateChallenge};
use crate::watch::{ChangeKind, StoreCollection, StoreEvent};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/challenges", get(list_challenges).post(create_challenge))
        .route(
            "/api/challenges/{id}",
            get(get_challenge).put(update_challenge).delete(delete_challenge),
        )
}

pub(crate) fn parse_language(raw: &str) -> Option<ChallengeLanguage> {
    match raw {
        "python" => Some(ChallengeLanguage::Python),
        "javascript" => Some(ChallengeLanguage::JavaScript),
        "typescript" => Some(ChallengeLanguage::TypeScript),
        "java" => Some(ChallengeLanguage::Java),
        "cpp" => Some(ChallengeLanguage::Cpp),
        "sql" => Some(ChallengeLanguage::Sql),
        _ => None,
    }
}

pub(crate) fn language_label(language: ChallengeLanguage) -> &'static str {
    match language {
        ChallengeLanguage::Python => "python",
        ChallengeLanguage::JavaScript => "javascript",
        ChallengeLanguage::TypeScript => "typescript",
        ChallengeLanguage::Java => "java",
        ChallengeLanguage::Cpp => "cpp",
        ChallengeLanguage::Sql => "sql",
    }
}

#[derive(Debug, Deserialize)]
struct CallerQuery {
    caller: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeBody {
    caller: String,
    title: String,
    language: String,
    category: String,
    description: String,
    #[serde(default)]
    test_cases: Vec<TestCase>,
    #[serde(default)]
    allow_interactive_apis: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChallengeResponse {
    pub id: String,
    pub title: String,
    pub language: String,
    pub category: String,
    pub description: String,
    pub test_cases: Vec<TestCase>,
    pub allow_interactive_apis: bool,
}

impl From<ChallengeRecord> for ChallengeResponse {
    fn from(record: ChallengeRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title,
            language: language_label(record.language).to_string(),
            category: record.category,
            description: record.description,
            test_cases: record.test_cases,
            allow_interactive_apis: record.allow_interactive_apis,
        }
    }
}

struct ValidatedBody {
    title: String,
    language: ChallengeLanguage,
    category: String,
    description: String,
    test_cases: Vec<TestCase>,
    allow_interactive_apis: bool,
}

async fn validate_body(
    state: &AppState,
    body: ChallengeBody,
) -> Result<ValidatedBody, ApiError> {
    let scope = caller_scope(state, &body.caller).await?;
    if scope.role() == Role::Student {
        return Err(ApiError::forbidden("challenge editing"));
    }

    if body.title.trim().is_empty() || body.description.trim().is_empty() {
        return Err(ApiError::bad_request("title and description are required"));
    }
    let language = parse_language(&body.language)
        .ok_or_else(|| ApiError::bad_request(format!("unknown language '{}'", body.language)))?;

    Ok(ValidatedBody {
        title: body.title,
        language,
        category: body.category,
        description: body.description,
        test_cases: body.test_cases,
        allow_interactive_apis: body.allow_interactive_apis,
    })
}

async fn create_challenge(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChallengeBody>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let body = validate_body(&state, body).await?;

    let record = state
        .challenges
        .create(NewChallenge {
            title: body.title,
            language: body.language,
            category: body.category,
            description: body.description,
            test_cases: body.test_cases,
            allow_interactive_apis: body.allow_interactive_apis,
        })
        .await
        .map_err(ApiError::internal)?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Challenges,
        entity_id: record.id.to_string(),
        kind: ChangeKind::Created,
    });

    Ok(Json(record.into()))
}

async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<Vec<ChallengeResponse>>, ApiError> {
    // The library is shared; the caller just has to be a known profile.
    caller_scope(&state, &query.caller).await?;
    list_all(&state).await.map(Json)
}

pub(crate) async fn list_all(state: &AppState) -> Result<Vec<ChallengeResponse>, ApiError> {
    let records = state.challenges.list().await.map_err(ApiError::internal)?;
    Ok(records.into_iter().map(ChallengeResponse::from).collect())
}

async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    caller_scope(&state, &query.caller).await?;

    let challenge_id =
        ChallengeId::from_str(&id).map_err(|_| ApiError::bad_request("invalid challenge id"))?;

    let record = state
        .challenges
        .find_by_id(challenge_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("challenge not found"))?;

    Ok(Json(record.into()))
}

async fn update_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ChallengeBody>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let challenge_id =
        ChallengeId::from_str(&id).map_err(|_| ApiError::bad_request("invalid challenge id"))?;
    let body = validate_body(&state, body).await?;

    let updated = state
        .challenges
        .update(
            challenge_id,
            UpdateChallenge {
                title: body.title,
                language: body.language,
                category: body.category,
                description: body.description,
                test_cases: body.test_cases,
                allow_interactive_apis: body.allow_interactive_apis,
            },
        )
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("challenge not found"))?;

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Challenges,
        entity_id: updated.id.to_string(),
        kind: ChangeKind::Updated,
    });

    Ok(Json(updated.into()))
}

async fn delete_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = caller_scope(&state, &query.caller).await?;
    if scope.role() == Role::Student {
        return Err(ApiError::forbidden("challenge deletion"));
    }

    let challenge_id =
        ChallengeId::from_str(&id).map_err(|_| ApiError::bad_request("invalid challenge id"))?;

    let deleted = state
        .challenges
        .delete(challenge_id)
        .await
        .map_err(ApiError::internal)?;
    if !deleted {
        return Err(ApiError::not_found("challenge not found"));
    }

    state.changes.emit(StoreEvent {
        collection: StoreCollection::Challenges,
        entity_id: id,
        kind: ChangeKind::Deleted,
    });

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::{language_label, parse_language};
    use academia_code_core::domain::ChallengeLanguage;

    #[test]
    fn language_labels_round_trip() {
        for language in [
            ChallengeLanguage::Python,
            ChallengeLanguage::JavaScript,
            ChallengeLanguage::TypeScript,
            ChallengeLanguage::Java,
            ChallengeLanguage::Cpp,
            ChallengeLanguage::Sql,
        ] {
            assert_eq!(parse_language(language_label(language)), Some(language));
        }
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert_eq!(parse_language("cobol"), None);
    }
}
