use crate::entity::study_group;
use academia_code_core::domain::{GroupFilter, GroupId, Schedule};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub schedule: Schedule,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub schedule: Schedule,
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, new_group: NewGroup) -> Result<GroupRecord>;
    async fn find_by_id(&self, group_id: GroupId) -> Result<Option<GroupRecord>>;
    async fn list(&self, filter: &GroupFilter) -> Result<Vec<GroupRecord>>;
    async fn update_schedule(
        &self,
        group_id: GroupId,
        schedule: Schedule,
    ) -> Result<Option<GroupRecord>>;
    async fn delete(&self, group_id: GroupId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmGroupRepository {
    db: DatabaseConnection,
}

impl SeaOrmGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: study_group::Model) -> Result<GroupRecord> {
        let id = GroupId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid study_group.id '{}' from database: {e}", model.id))?;

        Ok(GroupRecord {
            id,
            name: model.name,
            // Legacy rows hold free text here; both forms must survive reads.
            schedule: Schedule::from_stored(&model.schedule),
        })
    }
}

#[async_trait]
impl GroupRepository for SeaOrmGroupRepository {
    async fn create(&self, new_group: NewGroup) -> Result<GroupRecord> {
        let id = GroupId::new();

        let active_model = study_group::ActiveModel {
            id: Set(id.to_string()),
            name: Set(new_group.name),
            schedule: Set(new_group.schedule.to_stored()?),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, group_id: GroupId) -> Result<Option<GroupRecord>> {
        let model = study_group::Entity::find_by_id(group_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list(&self, filter: &GroupFilter) -> Result<Vec<GroupRecord>> {
        let models = match filter {
            GroupFilter::All => study_group::Entity::find().all(&self.db).await?,
            GroupFilter::Nothing => return Ok(Vec::new()),
            GroupFilter::Ids(group_ids) => {
                if group_ids.is_empty() {
                    return Ok(Vec::new());
                }
                study_group::Entity::find()
                    .filter(
                        study_group::Column::Id.is_in(group_ids.iter().map(ToString::to_string)),
                    )
                    .all(&self.db)
                    .await?
            }
        };

        models.into_iter().map(Self::map_model).collect()
    }

    async fn update_schedule(
        &self,
        group_id: GroupId,
        schedule: Schedule,
    ) -> Result<Option<GroupRecord>> {
        let Some(model) = study_group::Entity::find_by_id(group_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: study_group::ActiveModel = model.into();
        active_model.schedule = Set(schedule.to_stored()?);

        let updated = active_model.update(&self.db).await?;
        Self::map_model(updated).map(Some)
    }

    async fn delete(&self, group_id: GroupId) -> Result<bool> {
        let result = study_group::Entity::delete_by_id(group_id.to_string())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
