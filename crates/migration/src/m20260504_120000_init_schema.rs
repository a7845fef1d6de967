use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StudyGroup::Table)
                    .if_not_exists()
                    .col(string_len(StudyGroup::Id, 36).primary_key())
                    .col(string_len(StudyGroup::Name, 100))
                    // Structured weekly schedules are stored as JSON; legacy
                    // records hold free text in the same column.
                    .col(text(StudyGroup::Schedule))
                    .col(timestamp(StudyGroup::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(StudyGroup::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(string_len(UserProfile::Id, 36).primary_key())
                    .col(string_len(UserProfile::DisplayName, 100))
                    .col(string_len(UserProfile::Email, 255).unique_key())
                    // Role enum is represented in app code.
                    // 0=student, 1=teacher, 2=super_admin
                    .col(
                        small_integer(UserProfile::Role)
                            .check(Expr::col(UserProfile::Role).gte(0))
                            .check(Expr::col(UserProfile::Role).lte(2)),
                    )
                    // Set only for students.
                    .col(string_len_null(UserProfile::GroupId, 36))
                    // JSON array of group ids. Set only for teachers.
                    .col(text_null(UserProfile::ManagedGroupIds))
                    .col(string_len_null(UserProfile::PresenceStatus, 32))
                    .col(timestamp_null(UserProfile::LastSeen))
                    .col(timestamp(UserProfile::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(UserProfile::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_profile-group_id")
                            .from(UserProfile::Table, UserProfile::GroupId)
                            .to(StudyGroup::Table, StudyGroup::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Challenge::Table)
                    .if_not_exists()
                    .col(string_len(Challenge::Id, 36).primary_key())
                    .col(string_len(Challenge::Title, 200))
                    // ChallengeLanguage enum is represented in app code.
                    // 0=python, 1=javascript, 2=typescript, 3=java, 4=cpp, 5=sql
                    .col(
                        small_integer(Challenge::Language)
                            .check(Expr::col(Challenge::Language).gte(0))
                            .check(Expr::col(Challenge::Language).lte(5)),
                    )
                    .col(string_len(Challenge::Category, 100))
                    .col(text(Challenge::Description))
                    // JSON array of {input, expectedOutput} objects.
                    .col(text(Challenge::TestCases))
                    .col(boolean(Challenge::AllowInteractiveApis).default(false))
                    .col(timestamp(Challenge::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Challenge::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assignment::Table)
                    .if_not_exists()
                    .col(string_len(Assignment::Id, 36).primary_key())
                    .col(string_len(Assignment::ChallengeId, 36))
                    // TargetKind enum is represented in app code.
                    // 0=group, 1=student
                    .col(
                        small_integer(Assignment::TargetKind)
                            .check(Expr::col(Assignment::TargetKind).gte(0))
                            .check(Expr::col(Assignment::TargetKind).lte(1)),
                    )
                    // Resolves to a study_group or user_profile id depending
                    // on target_kind; no single foreign key can cover both.
                    .col(string_len(Assignment::TargetId, 36))
                    .col(string_len(Assignment::AssignedBy, 36))
                    .col(timestamp(Assignment::AssignedAt))
                    .col(timestamp_null(Assignment::DueDate))
                    .col(timestamp(Assignment::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Assignment::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignment-challenge_id")
                            .from(Assignment::Table, Assignment::ChallengeId)
                            .to(Challenge::Table, Challenge::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignment-assigned_by")
                            .from(Assignment::Table, Assignment::AssignedBy)
                            .to(UserProfile::Table, UserProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_profile_group_id")
                    .table(UserProfile::Table)
                    .col(UserProfile::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_profile_role")
                    .table(UserProfile::Table)
                    .col(UserProfile::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignment_target_id")
                    .table(Assignment::Table)
                    .col(Assignment::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignment_challenge_id")
                    .table(Assignment::Table)
                    .col(Assignment::ChallengeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignment_assigned_at")
                    .table(Assignment::Table)
                    .col(Assignment::AssignedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assignment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Challenge::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserProfile::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StudyGroup::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UserProfile {
    Table,
    Id,
    DisplayName,
    Email,
    Role,
    GroupId,
    ManagedGroupIds,
    PresenceStatus,
    LastSeen,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudyGroup {
    Table,
    Id,
    Name,
    Schedule,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Challenge {
    Table,
    Id,
    Title,
    Language,
    Category,
    Description,
    TestCases,
    AllowInteractiveApis,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Assignment {
    Table,
    Id,
    ChallengeId,
    TargetKind,
    TargetId,
    AssignedBy,
    AssignedAt,
    DueDate,
    CreatedAt,
    UpdatedAt,
}
