use crate::entity::challenge;
use academia_code_core::domain::{ChallengeId, ChallengeLanguage, TestCase};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ChallengeRecord {
    pub id: ChallengeId,
    pub title: String,
    pub language: ChallengeLanguage,
    pub category: String,
    pub description: String,
    pub test_cases: Vec<TestCase>,
    pub allow_interactive_apis: bool,
}

#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub title: String,
    pub language: ChallengeLanguage,
    pub category: String,
    pub description: String,
    pub test_cases: Vec<TestCase>,
    pub allow_interactive_apis: bool,
}

/// Full-record update; challenges are edited as one form.
#[derive(Debug, Clone)]
pub struct UpdateChallenge {
    pub title: String,
    pub language: ChallengeLanguage,
    pub category: String,
    pub description: String,
    pub test_cases: Vec<TestCase>,
    pub allow_interactive_apis: bool,
}

#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    async fn create(&self, new_challenge: NewChallenge) -> Result<ChallengeRecord>;
    async fn find_by_id(&self, challenge_id: ChallengeId) -> Result<Option<ChallengeRecord>>;
    async fn find_many(&self, challenge_ids: &[ChallengeId]) -> Result<Vec<ChallengeRecord>>;
    async fn list(&self) -> Result<Vec<ChallengeRecord>>;
    async fn update(
        &self,
        challenge_id: ChallengeId,
        update: UpdateChallenge,
    ) -> Result<Option<ChallengeRecord>>;
    async fn delete(&self, challenge_id: ChallengeId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmChallengeRepository {
    db: DatabaseConnection,
}

impl SeaOrmChallengeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_language(code: i16) -> Result<ChallengeLanguage> {
        match code {
            0 => Ok(ChallengeLanguage::Python),
            1 => Ok(ChallengeLanguage::JavaScript),
            2 => Ok(ChallengeLanguage::TypeScript),
            3 => Ok(ChallengeLanguage::Java),
            4 => Ok(ChallengeLanguage::Cpp),
            5 => Ok(ChallengeLanguage::Sql),
            _ => Err(anyhow!("invalid challenge.language code from database: {code}")),
        }
    }

    fn map_language_code(language: ChallengeLanguage) -> i16 {
        match language {
            ChallengeLanguage::Python => 0,
            ChallengeLanguage::JavaScript => 1,
            ChallengeLanguage::TypeScript => 2,
            ChallengeLanguage::Java => 3,
            ChallengeLanguage::Cpp => 4,
            ChallengeLanguage::Sql => 5,
        }
    }

    fn map_model(model: challenge::Model) -> Result<ChallengeRecord> {
        let id = ChallengeId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid challenge.id '{}' from database: {e}", model.id))?;
        let test_cases = TestCase::parse_set(&model.test_cases).map_err(|e| {
            anyhow!(
                "invalid challenge.test_cases for challenge '{}' from database: {e}",
                model.id
            )
        })?;

        Ok(ChallengeRecord {
            id,
            title: model.title,
            language: Self::map_language(model.language)?,
            category: model.category,
            description: model.description,
            test_cases,
            allow_interactive_apis: model.allow_interactive_apis,
        })
    }
}

#[async_trait]
impl ChallengeRepository for SeaOrmChallengeRepository {
    async fn create(&self, new_challenge: NewChallenge) -> Result<ChallengeRecord> {
        let id = ChallengeId::new();

        let active_model = challenge::ActiveModel {
            id: Set(id.to_string()),
            title: Set(new_challenge.title),
            language: Set(Self::map_language_code(new_challenge.language)),
            category: Set(new_challenge.category),
            description: Set(new_challenge.description),
            test_cases: Set(TestCase::serialize_set(&new_challenge.test_cases)?),
            allow_interactive_apis: Set(new_challenge.allow_interactive_apis),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, challenge_id: ChallengeId) -> Result<Option<ChallengeRecord>> {
        let model = challenge::Entity::find_by_id(challenge_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn find_many(&self, challenge_ids: &[ChallengeId]) -> Result<Vec<ChallengeRecord>> {
        if challenge_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = challenge::Entity::find()
            .filter(challenge::Column::Id.is_in(challenge_ids.iter().map(ToString::to_string)))
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list(&self) -> Result<Vec<ChallengeRecord>> {
        let models = challenge::Entity::find().all(&self.db).await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn update(
        &self,
        challenge_id: ChallengeId,
        update: UpdateChallenge,
    ) -> Result<Option<ChallengeRecord>> {
        let Some(model) = challenge::Entity::find_by_id(challenge_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: challenge::ActiveModel = model.into();
        active_model.title = Set(update.title);
        active_model.language = Set(Self::map_language_code(update.language));
        active_model.category = Set(update.category);
        active_model.description = Set(update.description);
        active_model.test_cases = Set(TestCase::serialize_set(&update.test_cases)?);
        active_model.allow_interactive_apis = Set(update.allow_interactive_apis);

        let updated = active_model.update(&self.db).await?;
        Self::map_model(updated).map(Some)
    }

    async fn delete(&self, challenge_id: ChallengeId) -> Result<bool> {
        let result = challenge::Entity::delete_by_id(challenge_id.to_string())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
