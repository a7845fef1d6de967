use crate::entity::user_profile;
use academia_code_core::domain::{GroupId, Role, RoleMembership, UserFilter, UserId};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct UserProfileRecord {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub membership: RoleMembership,
    pub presence_status: Option<String>,
    pub last_seen: Option<NaiveDateTime>,
}

/// The profile id comes from the auth provider, not from this store.
#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub membership: RoleMembership,
}

#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    async fn create(&self, new_profile: NewUserProfile) -> Result<UserProfileRecord>;
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserProfileRecord>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfileRecord>>;
    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserProfileRecord>>;
    async fn list_ids_in_groups(&self, group_ids: &[GroupId]) -> Result<Vec<UserId>>;
    async fn update_membership(
        &self,
        user_id: UserId,
        membership: RoleMembership,
    ) -> Result<Option<UserProfileRecord>>;
    async fn update_presence(
        &self,
        user_id: UserId,
        status: String,
        last_seen: NaiveDateTime,
    ) -> Result<bool>;
    /// Removes the profile document only; the auth credential stays behind.
    async fn delete(&self, user_id: UserId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmUserProfileRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_role(code: i16) -> Result<Role> {
        match code {
            0 => Ok(Role::Student),
            1 => Ok(Role::Teacher),
            2 => Ok(Role::SuperAdmin),
            _ => Err(anyhow!("invalid user_profile.role code from database: {code}")),
        }
    }

    fn map_role_code(role: Role) -> i16 {
        match role {
            Role::Student => 0,
            Role::Teacher => 1,
            Role::SuperAdmin => 2,
        }
    }

    /// Splits a membership into the three stored columns. The column not
    /// belonging to the role is always written as NULL.
    fn membership_columns(
        membership: &RoleMembership,
    ) -> Result<(i16, Option<String>, Option<String>)> {
        let role_code = Self::map_role_code(membership.role());
        match membership {
            RoleMembership::Student { group_id } => {
                Ok((role_code, group_id.map(|id| id.to_string()), None))
            }
            RoleMembership::Teacher { managed_group_ids } => {
                let ids: Vec<String> = managed_group_ids.iter().map(ToString::to_string).collect();
                Ok((role_code, None, Some(serde_json::to_string(&ids)?)))
            }
            RoleMembership::SuperAdmin => Ok((role_code, None, None)),
        }
    }

    fn map_membership(model: &user_profile::Model) -> Result<RoleMembership> {
        match Self::map_role(model.role)? {
            Role::Student => {
                let group_id = model
                    .group_id
                    .as_deref()
                    .map(GroupId::from_str)
                    .transpose()
                    .map_err(|e| {
                        anyhow!(
                            "invalid user_profile.group_id '{:?}' from database: {e}",
                            model.group_id
                        )
                    })?;
                Ok(RoleMembership::Student { group_id })
            }
            Role::Teacher => {
                let managed_group_ids = match model.managed_group_ids.as_deref() {
                    None => Vec::new(),
                    Some(raw) => {
                        let ids: Vec<String> = serde_json::from_str(raw).map_err(|e| {
                            anyhow!(
                                "invalid user_profile.managed_group_ids '{raw}' from database: {e}"
                            )
                        })?;
                        ids.iter()
                            .map(|id| {
                                GroupId::from_str(id).map_err(|e| {
                                    anyhow!("invalid managed group id '{id}' from database: {e}")
                                })
                            })
                            .collect::<Result<Vec<_>>>()?
                    }
                };
                Ok(RoleMembership::Teacher { managed_group_ids })
            }
            Role::SuperAdmin => Ok(RoleMembership::SuperAdmin),
        }
    }

    fn map_model(model: user_profile::Model) -> Result<UserProfileRecord> {
        let id = UserId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid user_profile.id '{}' from database: {e}", model.id))?;
        let membership = Self::map_membership(&model)?;

        Ok(UserProfileRecord {
            id,
            display_name: model.display_name,
            email: model.email,
            membership,
            presence_status: model.presence_status,
            last_seen: model.last_seen,
        })
    }
}

#[async_trait]
impl UserProfileRepository for SeaOrmUserProfileRepository {
    async fn create(&self, new_profile: NewUserProfile) -> Result<UserProfileRecord> {
        let (role, group_id, managed_group_ids) =
            Self::membership_columns(&new_profile.membership)?;

        let active_model = user_profile::ActiveModel {
            id: Set(new_profile.id.to_string()),
            display_name: Set(new_profile.display_name),
            email: Set(new_profile.email),
            role: Set(role),
            group_id: Set(group_id),
            managed_group_ids: Set(managed_group_ids),
            presence_status: Set(None),
            last_seen: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserProfileRecord>> {
        let model = user_profile::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfileRecord>> {
        let model = user_profile::Entity::find()
            .filter(user_profile::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<UserProfileRecord>> {
        let models = match filter {
            UserFilter::All => user_profile::Entity::find().all(&self.db).await?,
            UserFilter::InGroups(group_ids) => {
                // An empty managed set answers empty without a query; the
                // store rejects empty IN filters.
                if group_ids.is_empty() {
                    return Ok(Vec::new());
                }
                user_profile::Entity::find()
                    .filter(
                        user_profile::Column::GroupId
                            .is_in(group_ids.iter().map(ToString::to_string)),
                    )
                    .all(&self.db)
                    .await?
            }
            UserFilter::OwnProfile(user_id) => {
                return Ok(self.find_by_id(*user_id).await?.into_iter().collect());
            }
        };

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_ids_in_groups(&self, group_ids: &[GroupId]) -> Result<Vec<UserId>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = user_profile::Entity::find()
            .filter(user_profile::Column::GroupId.is_in(group_ids.iter().map(ToString::to_string)))
            .all(&self.db)
            .await?;

        models
            .iter()
            .map(|model| {
                UserId::from_str(&model.id).map_err(|e| {
                    anyhow!("invalid user_profile.id '{}' from database: {e}", model.id)
                })
            })
            .collect()
    }

    async fn update_membership(
        &self,
        user_id: UserId,
        membership: RoleMembership,
    ) -> Result<Option<UserProfileRecord>> {
        let Some(model) = user_profile::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let (role, group_id, managed_group_ids) = Self::membership_columns(&membership)?;

        let mut active_model: user_profile::ActiveModel = model.into();
        active_model.role = Set(role);
        active_model.group_id = Set(group_id);
        active_model.managed_group_ids = Set(managed_group_ids);

        let updated = active_model.update(&self.db).await?;
        Self::map_model(updated).map(Some)
    }

    async fn update_presence(
        &self,
        user_id: UserId,
        status: String,
        last_seen: NaiveDateTime,
    ) -> Result<bool> {
        let Some(model) = user_profile::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut active_model: user_profile::ActiveModel = model.into();
        active_model.presence_status = Set(Some(status));
        active_model.last_seen = Set(Some(last_seen));
        active_model.update(&self.db).await?;

        Ok(true)
    }

    async fn delete(&self, user_id: UserId) -> Result<bool> {
        let result = user_profile::Entity::delete_by_id(user_id.to_string())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
