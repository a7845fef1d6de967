//! AI 评审桥接路由。
//!
//! 评审本身完全由外部托管模型完成；这里只负责取出挑战的测试用例、
//! 组装请求并转发结果。模型响应不合规时整个操作失败，没有部分结果。

use std::str::FromStr;
use std::sync::Arc;

use academia_code_core::domain::ChallengeId;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use review_delegate::{ReviewRequest, ReviewVerdict};
use serde::Deserialize;

use super::state::AppState;
use super::{ApiError, caller_scope};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/review", post(review_submission))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewSubmissionRequest {
    caller: String,
    challenge_id: String,
    source_code: String,
    #[serde(default)]
    exam_context: String,
    #[serde(default)]
    capture_refs: Vec<String>,
}

async fn review_submission(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReviewSubmissionRequest>,
) -> Result<Json<ReviewVerdict>, ApiError> {
    caller_scope(&state, &request.caller).await?;

    let Some(client) = state.review.clone() else {
        return Err(ApiError::unavailable("review delegate is not configured"));
    };

    if request.source_code.trim().is_empty() {
        return Err(ApiError::bad_request("sourceCode is required"));
    }

    let challenge_id = ChallengeId::from_str(&request.challenge_id)
        .map_err(|_| ApiError::bad_request("invalid challenge id"))?;
    let challenge = state
        .challenges
        .find_by_id(challenge_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("challenge not found"))?;

    let review_request = ReviewRequest {
        source_code: request.source_code,
        exam_context: request.exam_context,
        test_cases: challenge.test_cases,
        capture_refs: request.capture_refs,
        allow_interactive_apis: challenge.allow_interactive_apis,
    };

    let verdict = client.review(&review_request).await?;
    Ok(Json(verdict))
}
