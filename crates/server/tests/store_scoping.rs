use academia_code_core::domain::{
    AccessScope, AssignmentTarget, GroupFilter, RoleMembership, Schedule, TestCase, UserId,
    WeeklySchedule,
};
use academia_code_migration::{Migrator, MigratorTrait};
use academia_code_server::repository::{
    AssignmentRepository, ChallengeRepository, GroupRepository, NewAssignment, NewChallenge,
    NewGroup, NewUserProfile, SeaOrmAssignmentRepository, SeaOrmChallengeRepository,
    SeaOrmGroupRepository, SeaOrmUserProfileRepository, UserProfileRecord, UserProfileRepository,
};
use chrono::Utc;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

struct Store {
    users: SeaOrmUserProfileRepository,
    groups: SeaOrmGroupRepository,
    challenges: SeaOrmChallengeRepository,
    assignments: SeaOrmAssignmentRepository,
}

async fn open_store() -> Store {
    // A pooled in-memory sqlite would hand every connection its own empty
    // database; a single connection keeps the schema visible to all queries.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db: DatabaseConnection = Database::connect(options)
        .await
        .expect("in-memory database should open");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply");

    Store {
        users: SeaOrmUserProfileRepository::new(db.clone()),
        groups: SeaOrmGroupRepository::new(db.clone()),
        challenges: SeaOrmChallengeRepository::new(db.clone()),
        assignments: SeaOrmAssignmentRepository::new(db),
    }
}

async fn create_profile(
    store: &Store,
    display_name: &str,
    email: &str,
    membership: RoleMembership,
) -> UserProfileRecord {
    store
        .users
        .create(NewUserProfile {
            id: UserId::new(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            membership,
        })
        .await
        .expect("profile should be created")
}

fn weekly(days: &[&str], start: &str, end: &str) -> Schedule {
    Schedule::Weekly(
        WeeklySchedule::new(days.iter().map(|d| d.to_string()).collect(), start, end)
            .expect("schedule should be valid"),
    )
}

async fn create_challenge(store: &Store, title: &str) -> academia_code_core::domain::ChallengeId {
    store
        .challenges
        .create(NewChallenge {
            title: title.to_string(),
            language: academia_code_core::domain::ChallengeLanguage::Python,
            category: "fundamentos".to_string(),
            description: "Suma dos enteros.".to_string(),
            test_cases: vec![TestCase {
                input: "2 3".to_string(),
                expected_output: "5".to_string(),
            }],
            allow_interactive_apis: false,
        })
        .await
        .expect("challenge should be created")
        .id
}

fn scope_of(record: &UserProfileRecord) -> AccessScope {
    AccessScope::for_membership(record.id, &record.membership)
}

#[tokio::test]
async fn teacher_with_empty_managed_set_sees_zero_groups_and_assignments() {
    let store = open_store().await;

    let admin = create_profile(&store, "Admin", "admin@academia.test", RoleMembership::SuperAdmin)
        .await;
    let teacher = create_profile(
        &store,
        "Profe",
        "profe@academia.test",
        RoleMembership::Teacher {
            managed_group_ids: vec![],
        },
    )
    .await;

    let group = store
        .groups
        .create(NewGroup {
            name: "ADS1".to_string(),
            schedule: weekly(&["Lunes", "Miércoles"], "08:00", "10:00"),
        })
        .await
        .expect("group should be created");

    let challenge_id = create_challenge(&store, "Sumas").await;
    store
        .assignments
        .create(NewAssignment {
            challenge_id,
            target: AssignmentTarget::Group(group.id),
            assigned_by: admin.id,
            due_date: None,
        })
        .await
        .expect("assignment should be created");

    let scope = scope_of(&teacher);
    let groups = store
        .groups
        .list(&scope.group_filter())
        .await
        .expect("empty managed set should not be a query error");
    assert!(groups.is_empty());

    let visibility = scope.assignment_visibility(vec![]);
    let assignments = store
        .assignments
        .list(&visibility)
        .await
        .expect("empty visibility should not be a query error");
    assert!(assignments.is_empty());
}

#[tokio::test]
async fn student_sees_the_union_of_uid_and_group_assignments_and_nothing_else() {
    let store = open_store().await;

    let admin = create_profile(&store, "Admin", "admin@academia.test", RoleMembership::SuperAdmin)
        .await;
    let own_group = store
        .groups
        .create(NewGroup {
            name: "ADS1".to_string(),
            schedule: weekly(&["Lunes"], "08:00", "10:00"),
        })
        .await
        .expect("group should be created");
    let other_group = store
        .groups
        .create(NewGroup {
            name: "ADS2".to_string(),
            schedule: weekly(&["Martes"], "10:00", "12:00"),
        })
        .await
        .expect("group should be created");

    let student = create_profile(
        &store,
        "Ana",
        "ana@academia.test",
        RoleMembership::Student {
            group_id: Some(own_group.id),
        },
    )
    .await;
    let classmate = create_profile(
        &store,
        "Beto",
        "beto@academia.test",
        RoleMembership::Student {
            group_id: Some(other_group.id),
        },
    )
    .await;

    let challenge_id = create_challenge(&store, "Sumas").await;
    let mut expected = Vec::new();
    for target in [
        AssignmentTarget::Student(student.id),
        AssignmentTarget::Group(own_group.id),
    ] {
        let record = store
            .assignments
            .create(NewAssignment {
                challenge_id,
                target,
                assigned_by: admin.id,
                due_date: None,
            })
            .await
            .expect("assignment should be created");
        expected.push(record.id);
    }
    for target in [
        AssignmentTarget::Group(other_group.id),
        AssignmentTarget::Student(classmate.id),
    ] {
        store
            .assignments
            .create(NewAssignment {
                challenge_id,
                target,
                assigned_by: admin.id,
                due_date: None,
            })
            .await
            .expect("assignment should be created");
    }

    let visibility = scope_of(&student).assignment_visibility(vec![]);
    let visible = store
        .assignments
        .list(&visibility)
        .await
        .expect("student listing should succeed");

    let mut visible_ids: Vec<_> = visible.iter().map(|a| a.id).collect();
    visible_ids.sort_by_key(ToString::to_string);
    expected.sort_by_key(ToString::to_string);
    assert_eq!(visible_ids, expected);
    assert!(visible.iter().all(|a| visibility.allows(&a.target)));
}

#[tokio::test]
async fn group_becomes_visible_to_teacher_only_after_managed_set_update() {
    let store = open_store().await;

    let teacher = create_profile(
        &store,
        "Profe",
        "profe@academia.test",
        RoleMembership::Teacher {
            managed_group_ids: vec![],
        },
    )
    .await;

    let group = store
        .groups
        .create(NewGroup {
            name: "ADS1".to_string(),
            schedule: weekly(&["Lunes", "Miércoles"], "08:00", "10:00"),
        })
        .await
        .expect("group should be created");

    let before = store
        .groups
        .list(&scope_of(&teacher).group_filter())
        .await
        .expect("listing should succeed");
    assert!(before.is_empty());

    let updated = store
        .users
        .update_membership(
            teacher.id,
            RoleMembership::Teacher {
                managed_group_ids: vec![group.id],
            },
        )
        .await
        .expect("membership update should succeed")
        .expect("teacher should exist");

    let after = store
        .groups
        .list(&scope_of(&updated).group_filter())
        .await
        .expect("listing should succeed");
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, group.id);
    assert_eq!(after[0].name, "ADS1");
    match &after[0].schedule {
        Schedule::Weekly(weekly) => {
            assert_eq!(weekly.days, vec!["Lunes", "Miércoles"]);
            assert_eq!(weekly.start_time.format("%H:%M").to_string(), "08:00");
            assert_eq!(weekly.end_time.format("%H:%M").to_string(), "10:00");
        }
        Schedule::Legacy(text) => panic!("expected structured schedule, got legacy: {text}"),
    }
}

#[tokio::test]
async fn role_change_keeps_membership_columns_mutually_exclusive() {
    let store = open_store().await;

    let group = store
        .groups
        .create(NewGroup {
            name: "ADS1".to_string(),
            schedule: Schedule::Legacy("Lunes y Miércoles de 8 a 10".to_string()),
        })
        .await
        .expect("group should be created");

    let profile = create_profile(
        &store,
        "Carla",
        "carla@academia.test",
        RoleMembership::Student {
            group_id: Some(group.id),
        },
    )
    .await;
    assert_eq!(profile.membership.group_id(), Some(group.id));

    let promoted = store
        .users
        .update_membership(
            profile.id,
            RoleMembership::Teacher {
                managed_group_ids: vec![group.id],
            },
        )
        .await
        .expect("membership update should succeed")
        .expect("profile should exist");

    assert_eq!(promoted.membership.group_id(), None);
    assert_eq!(promoted.membership.managed_group_ids(), &[group.id]);

    let reloaded = store
        .users
        .find_by_id(profile.id)
        .await
        .expect("lookup should succeed")
        .expect("profile should exist");
    assert_eq!(reloaded.membership.group_id(), None);
    assert_eq!(reloaded.membership.managed_group_ids(), &[group.id]);
}

#[tokio::test]
async fn legacy_schedule_survives_a_store_round_trip() {
    let store = open_store().await;

    let created = store
        .groups
        .create(NewGroup {
            name: "Nocturno".to_string(),
            schedule: Schedule::Legacy("Viernes por la tarde".to_string()),
        })
        .await
        .expect("group should be created");

    let reloaded = store
        .groups
        .find_by_id(created.id)
        .await
        .expect("lookup should succeed")
        .expect("group should exist");

    assert_eq!(
        reloaded.schedule,
        Schedule::Legacy("Viernes por la tarde".to_string())
    );
}

#[tokio::test]
async fn presence_updates_land_on_the_profile() {
    let store = open_store().await;

    let profile = create_profile(
        &store,
        "Ana",
        "ana@academia.test",
        RoleMembership::Student { group_id: None },
    )
    .await;

    let last_seen = Utc::now().naive_utc();
    let found = store
        .users
        .update_presence(profile.id, "online".to_string(), last_seen)
        .await
        .expect("presence update should succeed");
    assert!(found);

    let reloaded = store
        .users
        .find_by_id(profile.id)
        .await
        .expect("lookup should succeed")
        .expect("profile should exist");
    assert_eq!(reloaded.presence_status.as_deref(), Some("online"));
    assert!(reloaded.last_seen.is_some());

    let missing = store
        .users
        .update_presence(UserId::new(), "online".to_string(), last_seen)
        .await
        .expect("presence update of a missing user should not error");
    assert!(!missing);
}

#[tokio::test]
async fn teacher_sees_assignments_addressed_to_students_of_managed_groups() {
    let store = open_store().await;

    let admin = create_profile(&store, "Admin", "admin@academia.test", RoleMembership::SuperAdmin)
        .await;
    let group = store
        .groups
        .create(NewGroup {
            name: "ADS1".to_string(),
            schedule: weekly(&["Lunes"], "08:00", "10:00"),
        })
        .await
        .expect("group should be created");
    let student = create_profile(
        &store,
        "Ana",
        "ana@academia.test",
        RoleMembership::Student {
            group_id: Some(group.id),
        },
    )
    .await;
    let teacher = create_profile(
        &store,
        "Profe",
        "profe@academia.test",
        RoleMembership::Teacher {
            managed_group_ids: vec![group.id],
        },
    )
    .await;

    let challenge_id = create_challenge(&store, "Sumas").await;
    let direct = store
        .assignments
        .create(NewAssignment {
            challenge_id,
            target: AssignmentTarget::Student(student.id),
            assigned_by: admin.id,
            due_date: None,
        })
        .await
        .expect("assignment should be created");

    let scope = scope_of(&teacher);
    let members = store
        .users
        .list_ids_in_groups(&[group.id])
        .await
        .expect("member lookup should succeed");
    assert_eq!(members, vec![student.id]);

    let visibility = scope.assignment_visibility(members);
    let visible = store
        .assignments
        .list(&visibility)
        .await
        .expect("teacher listing should succeed");

    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, direct.id);
}

#[tokio::test]
async fn super_admin_group_filter_lists_everything() {
    let store = open_store().await;

    for (name, day) in [("ADS1", "Lunes"), ("ADS2", "Martes")] {
        store
            .groups
            .create(NewGroup {
                name: name.to_string(),
                schedule: weekly(&[day], "08:00", "10:00"),
            })
            .await
            .expect("group should be created");
    }

    let all = store
        .groups
        .list(&GroupFilter::All)
        .await
        .expect("listing should succeed");
    assert_eq!(all.len(), 2);
}
