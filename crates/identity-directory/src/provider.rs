use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, Result};

/// Input of the privileged account-creation flow. The password never touches
/// the local store; it goes straight to the auth provider.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub uid: String,
}

/// Seam over the external auth provider's admin surface.
///
/// Implementations provision the credential and attach the role claim; the
/// parallel profile document is written by the caller afterwards.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, account: NewAccount) -> Result<AccountRecord>;

    async fn set_role_claim(&self, uid: &str, role: &str) -> Result<()>;
}

/// HTTP implementation against the provider's admin API.
pub struct HttpDirectory {
    client: Client,
    config: DirectoryConfig,
}

#[derive(Debug, Serialize)]
struct RoleClaimRequest<'a> {
    role: &'a str,
}

impl HttpDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpDirectory {
    #[tracing::instrument(skip(self, account), fields(email = %account.email))]
    async fn create_account(&self, account: NewAccount) -> Result<AccountRecord> {
        let response = self
            .client
            .post(format!("{}/accounts", self.config.api_url))
            .bearer_auth(&self.config.api_token)
            .json(&account)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(DirectoryError::EmailTaken {
                email: account.email,
            });
        }

        let response = response.error_for_status()?;
        let record: AccountRecord = response
            .json()
            .await
            .map_err(|err| DirectoryError::InvalidResponse(err.to_string()))?;

        info!(uid = %record.uid, "directory account created");
        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    async fn set_role_claim(&self, uid: &str, role: &str) -> Result<()> {
        self.client
            .post(format!("{}/accounts/{uid}/claims", self.config.api_url))
            .bearer_auth(&self.config.api_token)
            .json(&RoleClaimRequest { role })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Stand-in used when no directory credentials are configured. Provisioning
/// becomes a logged no-op with a synthesized uid so profile creation still
/// works in development deployments.
pub struct NoopDirectory;

#[async_trait]
impl IdentityProvider for NoopDirectory {
    async fn create_account(&self, account: NewAccount) -> Result<AccountRecord> {
        let uid = Uuid::new_v4().to_string();
        warn!(
            email = %account.email,
            uid = %uid,
            "directory credentials absent, skipping account provisioning"
        );
        Ok(AccountRecord { uid })
    }

    async fn set_role_claim(&self, uid: &str, role: &str) -> Result<()> {
        warn!(uid, role, "directory credentials absent, skipping role claim");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountRecord, IdentityProvider, NewAccount, NoopDirectory};

    fn sample_account() -> NewAccount {
        NewAccount {
            email: "ana@example.com".to_string(),
            password: "s3creta".to_string(),
            display_name: "Ana Pérez".to_string(),
        }
    }

    #[test]
    fn new_account_serializes_display_name_in_camel_case() {
        let json = serde_json::to_value(sample_account()).expect("account should serialize");

        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["displayName"], "Ana Pérez");
    }

    #[test]
    fn account_record_parses_provider_payload() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"uid":"abc-123"}"#).expect("record should parse");

        assert_eq!(record.uid, "abc-123");
    }

    #[tokio::test]
    async fn noop_directory_synthesizes_distinct_uids() {
        let directory = NoopDirectory;

        let first = directory
            .create_account(sample_account())
            .await
            .expect("noop create should succeed");
        let second = directory
            .create_account(sample_account())
            .await
            .expect("noop create should succeed");

        assert_ne!(first.uid, second.uid);
        directory
            .set_role_claim(&first.uid, "student")
            .await
            .expect("noop claim should succeed");
    }
}
