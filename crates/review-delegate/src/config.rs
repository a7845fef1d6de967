use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// HTTP endpoint of the hosted generative model.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key. The key itself never lives
    /// in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl ReviewConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize review config")
    }

    /// Resolves the API key from the process environment. Absent credentials
    /// are not an error here; the caller decides how to degrade.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }
}

fn default_api_key_env() -> String {
    "REVIEW_API_KEY".to_string()
}

#[cfg(test)]
mod tests {
    use super::ReviewConfig;

    #[test]
    fn test_parse_config() {
        let raw = r#"
endpoint = "https://models.example.com/v1/generate"
model = "tutor-review-large"
api_key_env = "ACADEMIA_REVIEW_KEY"
"#;

        let config = ReviewConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.endpoint, "https://models.example.com/v1/generate");
        assert_eq!(config.model, "tutor-review-large");
        assert_eq!(config.api_key_env, "ACADEMIA_REVIEW_KEY");
    }

    #[test]
    fn api_key_env_has_a_default() {
        let raw = r#"
endpoint = "https://models.example.com/v1/generate"
model = "tutor-review-large"
"#;

        let config = ReviewConfig::from_str(raw).expect("config should parse");
        assert_eq!(config.api_key_env, "REVIEW_API_KEY");
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        assert!(ReviewConfig::from_str("model = \"m\"").is_err());
    }
}
