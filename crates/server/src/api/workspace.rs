//! 练习工作台路由。

use std::sync::Arc;

use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/workspace/run", post(run_code))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest {
    source_code: String,
}

#[derive(Debug, Serialize)]
struct RunResponse {
    output: String,
}

/// 工作台没有解释器；“运行”把提交的源码原样回显为输出。
async fn run_code(Json(request): Json<RunRequest>) -> Json<RunResponse> {
    Json(RunResponse {
        output: request.source_code,
    })
}

#[cfg(test)]
mod tests {
    use super::{RunRequest, run_code};
    use axum::Json;

    #[tokio::test]
    async fn run_echoes_the_source_back() {
        let Json(response) = run_code(Json(RunRequest {
            source_code: "print('hola')".to_string(),
        }))
        .await;

        assert_eq!(response.output, "print('hola')");
    }
}
