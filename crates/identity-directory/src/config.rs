use std::env;

/// Connection settings for the external auth provider's admin API.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub api_url: String,
    pub api_token: String,
}

impl DirectoryConfig {
    pub const URL_ENV: &str = "DIRECTORY_API_URL";
    pub const TOKEN_ENV: &str = "DIRECTORY_API_TOKEN";

    /// Reads credentials from the process environment. `None` means the
    /// deployment runs without privileged directory access and account
    /// provisioning degrades to a no-op.
    pub fn from_env() -> Option<Self> {
        let api_url = env::var(Self::URL_ENV).ok()?;
        let api_token = env::var(Self::TOKEN_ENV).ok()?;
        Some(Self::from_parts(api_url, api_token))
    }

    pub fn from_parts(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DirectoryConfig;

    #[test]
    fn from_parts_keeps_the_values() {
        let config = DirectoryConfig::from_parts("https://auth.example.com", "secret");

        assert_eq!(config.api_url, "https://auth.example.com");
        assert_eq!(config.api_token, "secret");
    }
}
