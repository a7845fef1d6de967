//! 托管模型 HTTP 客户端。
//!
//! 通过一次 HTTP 请求把整个评审任务交给外部生成模型，
//! 本地只负责拼装提示词和校验返回的 JSON 结构。

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ReviewConfig;
use crate::error::{ReviewError, Result};
use crate::prompt::{ReviewRequest, build_prompt};
use crate::verdict::ReviewVerdict;

/// 评审客户端。
///
/// 每次评审都是单次请求-响应；没有重试，也没有部分结果。
pub struct ReviewClient {
    client: Client,
    config: ReviewConfig,
    api_key: Option<String>,
}

/// 模型生成请求。
#[derive(Debug, Serialize)]
struct ModelRequest {
    model: String,
    prompt: String,
}

/// 模型生成响应。
#[derive(Debug, Deserialize)]
struct ModelResponse {
    #[serde(default)]
    output: String,
}

impl ReviewClient {
    /// 创建评审客户端，并从进程环境解析 API key。
    pub fn new(config: ReviewConfig) -> Self {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            tracing::warn!(
                api_key_env = %config.api_key_env,
                "review api key not present in environment, requests will be unauthenticated"
            );
        }

        Self {
            client: Client::new(),
            config,
            api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// 执行一次评审。
    #[tracing::instrument(skip(self, request))]
    pub async fn review(&self, request: &ReviewRequest) -> Result<ReviewVerdict> {
        let prompt = build_prompt(request)?;
        info!(
            model = %self.config.model,
            test_cases = request.test_cases.len(),
            captures = request.capture_refs.len(),
            "sending review request to hosted model"
        );

        let body = ModelRequest {
            model: self.config.model.clone(),
            prompt,
        };

        let mut http_request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await?.error_for_status()?;
        let payload: ModelResponse = response.json().await?;

        let cleaned = strip_code_fences(&payload.output);
        if cleaned.is_empty() {
            return Err(ReviewError::EmptyOutput);
        }

        ReviewVerdict::from_model_json(cleaned)
    }
}

/// 去掉模型答案外层的 Markdown 代码围栏。
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::{ModelRequest, ModelResponse, strip_code_fences};

    #[test]
    fn bare_json_passes_through_untouched() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let fenced = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"a\": 1}");

        let plain_fence = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(plain_fence), "{\"a\": 1}");
    }

    #[test]
    fn model_request_serializes_expected_fields() {
        let request = ModelRequest {
            model: "tutor-review-large".to_string(),
            prompt: "grade this".to_string(),
        };

        let json = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(json["model"], "tutor-review-large");
        assert_eq!(json["prompt"], "grade this");
    }

    #[test]
    fn model_response_tolerates_missing_output() {
        let response: ModelResponse = serde_json::from_str("{}").expect("should deserialize");
        assert!(response.output.is_empty());
    }
}
