use crate::entity::assignment;
use academia_code_core::domain::{
    AssignmentId, AssignmentTarget, AssignmentVisibility, ChallengeId, TargetKind, UserId,
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AssignmentRecord {
    pub id: AssignmentId,
    pub challenge_id: ChallengeId,
    pub target: AssignmentTarget,
    pub assigned_by: UserId,
    pub assigned_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub challenge_id: ChallengeId,
    pub target: AssignmentTarget,
    pub assigned_by: UserId,
    pub due_date: Option<NaiveDateTime>,
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn create(&self, new_assignment: NewAssignment) -> Result<AssignmentRecord>;
    async fn find_by_id(&self, assignment_id: AssignmentId) -> Result<Option<AssignmentRecord>>;
    async fn list(&self, visibility: &AssignmentVisibility) -> Result<Vec<AssignmentRecord>>;
    async fn list_recent(
        &self,
        visibility: &AssignmentVisibility,
        limit: u64,
    ) -> Result<Vec<AssignmentRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmAssignmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmAssignmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_target_kind_code(kind: TargetKind) -> i16 {
        match kind {
            TargetKind::Group => 0,
            TargetKind::Student => 1,
        }
    }

    fn map_target(kind_code: i16, target_id: &str) -> Result<AssignmentTarget> {
        match kind_code {
            0 => target_id
                .parse()
                .map(AssignmentTarget::Group)
                .map_err(|e| anyhow!("invalid assignment.target_id '{target_id}' from database: {e}")),
            1 => target_id
                .parse()
                .map(AssignmentTarget::Student)
                .map_err(|e| anyhow!("invalid assignment.target_id '{target_id}' from database: {e}")),
            _ => Err(anyhow!(
                "invalid assignment.target_kind code from database: {kind_code}"
            )),
        }
    }

    fn map_model(model: assignment::Model) -> Result<AssignmentRecord> {
        let id = AssignmentId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid assignment.id '{}' from database: {e}", model.id))?;
        let challenge_id = ChallengeId::from_str(&model.challenge_id).map_err(|e| {
            anyhow!(
                "invalid assignment.challenge_id '{}' from database: {e}",
                model.challenge_id
            )
        })?;
        let assigned_by = UserId::from_str(&model.assigned_by).map_err(|e| {
            anyhow!(
                "invalid assignment.assigned_by '{}' from database: {e}",
                model.assigned_by
            )
        })?;

        Ok(AssignmentRecord {
            id,
            challenge_id,
            target: Self::map_target(model.target_kind, &model.target_id)?,
            assigned_by,
            assigned_at: model.assigned_at,
            due_date: model.due_date,
        })
    }

    /// Builds the target condition for a visibility. `None` means the caller
    /// sees nothing and no query must be issued; the store rejects empty
    /// `IN` filters, so each branch is only added for a non-empty id set.
    fn visibility_condition(visibility: &AssignmentVisibility) -> Option<Option<Condition>> {
        match visibility {
            AssignmentVisibility::Unrestricted => Some(None),
            AssignmentVisibility::Nothing => None,
            AssignmentVisibility::Targets {
                group_ids,
                user_ids,
            } => {
                let mut condition = Condition::any();
                if !group_ids.is_empty() {
                    condition = condition.add(
                        Condition::all()
                            .add(
                                assignment::Column::TargetKind
                                    .eq(Self::map_target_kind_code(TargetKind::Group)),
                            )
                            .add(
                                assignment::Column::TargetId
                                    .is_in(group_ids.iter().map(ToString::to_string)),
                            ),
                    );
                }
                if !user_ids.is_empty() {
                    condition = condition.add(
                        Condition::all()
                            .add(
                                assignment::Column::TargetKind
                                    .eq(Self::map_target_kind_code(TargetKind::Student)),
                            )
                            .add(
                                assignment::Column::TargetId
                                    .is_in(user_ids.iter().map(ToString::to_string)),
                            ),
                    );
                }

                if group_ids.is_empty() && user_ids.is_empty() {
                    None
                } else {
                    Some(Some(condition))
                }
            }
        }
    }
}

#[async_trait]
impl AssignmentRepository for SeaOrmAssignmentRepository {
    async fn create(&self, new_assignment: NewAssignment) -> Result<AssignmentRecord> {
        let id = AssignmentId::new();

        let active_model = assignment::ActiveModel {
            id: Set(id.to_string()),
            challenge_id: Set(new_assignment.challenge_id.to_string()),
            target_kind: Set(Self::map_target_kind_code(new_assignment.target.kind())),
            target_id: Set(new_assignment.target.id_string()),
            assigned_by: Set(new_assignment.assigned_by.to_string()),
            assigned_at: Set(Utc::now().naive_utc()),
            due_date: Set(new_assignment.due_date),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, assignment_id: AssignmentId) -> Result<Option<AssignmentRecord>> {
        let model = assignment::Entity::find_by_id(assignment_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list(&self, visibility: &AssignmentVisibility) -> Result<Vec<AssignmentRecord>> {
        let Some(condition) = Self::visibility_condition(visibility) else {
            return Ok(Vec::new());
        };

        let mut query = assignment::Entity::find();
        if let Some(condition) = condition {
            query = query.filter(condition);
        }

        let models = query
            .order_by_desc(assignment::Column::AssignedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_recent(
        &self,
        visibility: &AssignmentVisibility,
        limit: u64,
    ) -> Result<Vec<AssignmentRecord>> {
        let Some(condition) = Self::visibility_condition(visibility) else {
            return Ok(Vec::new());
        };

        let mut query = assignment::Entity::find();
        if let Some(condition) = condition {
            query = query.filter(condition);
        }

        let models = query
            .order_by_desc(assignment::Column::AssignedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }
}
