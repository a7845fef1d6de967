use super::{AssignmentTarget, GroupId, Role, RoleMembership, UserId};

/// The caller's visibility over the store, derived from its role and
/// relationships. Every list query is built from one of these; no handler
/// queries a collection unscoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    SuperAdmin,
    Teacher { managed_group_ids: Vec<GroupId> },
    Student { user_id: UserId, group_id: Option<GroupId> },
}

/// Scoped group query plan. `Nothing` means answer with an empty result
/// without touching the store; the query layer never builds an empty `IN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    All,
    Ids(Vec<GroupId>),
    Nothing,
}

/// Scoped profile query plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    InGroups(Vec<GroupId>),
    OwnProfile(UserId),
}

/// Scoped assignment query plan. `Targets` matches assignments addressed to
/// any of the listed groups or any of the listed users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentVisibility {
    Unrestricted,
    Targets {
        group_ids: Vec<GroupId>,
        user_ids: Vec<UserId>,
    },
    Nothing,
}

impl AccessScope {
    pub fn for_membership(user_id: UserId, membership: &RoleMembership) -> Self {
        match membership {
            RoleMembership::SuperAdmin => Self::SuperAdmin,
            RoleMembership::Teacher { managed_group_ids } => Self::Teacher {
                managed_group_ids: managed_group_ids.clone(),
            },
            RoleMembership::Student { group_id } => Self::Student {
                user_id,
                group_id: *group_id,
            },
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::SuperAdmin => Role::SuperAdmin,
            Self::Teacher { .. } => Role::Teacher,
            Self::Student { .. } => Role::Student,
        }
    }

    pub fn group_filter(&self) -> GroupFilter {
        match self {
            Self::SuperAdmin => GroupFilter::All,
            Self::Teacher { managed_group_ids } => {
                if managed_group_ids.is_empty() {
                    GroupFilter::Nothing
                } else {
                    GroupFilter::Ids(managed_group_ids.clone())
                }
            }
            Self::Student { group_id, .. } => match group_id {
                Some(group_id) => GroupFilter::Ids(vec![*group_id]),
                None => GroupFilter::Nothing,
            },
        }
    }

    pub fn user_filter(&self) -> UserFilter {
        match self {
            Self::SuperAdmin => UserFilter::All,
            Self::Teacher { managed_group_ids } => UserFilter::InGroups(managed_group_ids.clone()),
            Self::Student { user_id, .. } => UserFilter::OwnProfile(*user_id),
        }
    }

    /// Builds the assignment visibility for this scope.
    ///
    /// A student sees the union of assignments addressed to their own uid and
    /// to their group. A teacher sees assignments addressed to any managed
    /// group or to any student of those groups; `group_member_ids` carries
    /// those student uids, resolved by the caller, and is ignored for the
    /// other roles.
    pub fn assignment_visibility(&self, group_member_ids: Vec<UserId>) -> AssignmentVisibility {
        match self {
            Self::SuperAdmin => AssignmentVisibility::Unrestricted,
            Self::Teacher { managed_group_ids } => {
                if managed_group_ids.is_empty() {
                    AssignmentVisibility::Nothing
                } else {
                    AssignmentVisibility::Targets {
                        group_ids: managed_group_ids.clone(),
                        user_ids: group_member_ids,
                    }
                }
            }
            Self::Student { user_id, group_id } => AssignmentVisibility::Targets {
                group_ids: group_id.iter().copied().collect(),
                user_ids: vec![*user_id],
            },
        }
    }
}

impl AssignmentVisibility {
    /// Post-fetch check applied to every fetched row again, independently of
    /// the store-side filter.
    pub fn allows(&self, target: &AssignmentTarget) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Nothing => false,
            Self::Targets {
                group_ids,
                user_ids,
            } => match target {
                AssignmentTarget::Group(group_id) => group_ids.contains(group_id),
                AssignmentTarget::Student(user_id) => user_ids.contains(user_id),
            },
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessScope, AssignmentVisibility, GroupFilter, UserFilter};
    use crate::domain::{AssignmentTarget, GroupId, UserId};

    #[test]
    fn super_admin_scope_is_unrestricted() {
        let scope = AccessScope::SuperAdmin;

        assert_eq!(scope.group_filter(), GroupFilter::All);
        assert_eq!(scope.user_filter(), UserFilter::All);
        assert_eq!(
            scope.assignment_visibility(vec![]),
            AssignmentVisibility::Unrestricted
        );
    }

    #[test]
    fn teacher_with_empty_managed_set_sees_nothing() {
        let scope = AccessScope::Teacher {
            managed_group_ids: vec![],
        };

        assert_eq!(scope.group_filter(), GroupFilter::Nothing);
        assert!(scope.assignment_visibility(vec![]).is_nothing());
    }

    #[test]
    fn teacher_visibility_covers_managed_groups_and_their_students() {
        let group = GroupId::new();
        let student = UserId::new();
        let scope = AccessScope::Teacher {
            managed_group_ids: vec![group],
        };

        let visibility = scope.assignment_visibility(vec![student]);
        assert!(visibility.allows(&AssignmentTarget::Group(group)));
        assert!(visibility.allows(&AssignmentTarget::Student(student)));
        assert!(!visibility.allows(&AssignmentTarget::Group(GroupId::new())));
        assert!(!visibility.allows(&AssignmentTarget::Student(UserId::new())));
    }

    #[test]
    fn student_visibility_is_the_union_of_uid_and_group_targets() {
        let user_id = UserId::new();
        let group_id = GroupId::new();
        let scope = AccessScope::Student {
            user_id,
            group_id: Some(group_id),
        };

        let visibility = scope.assignment_visibility(vec![]);
        assert!(visibility.allows(&AssignmentTarget::Student(user_id)));
        assert!(visibility.allows(&AssignmentTarget::Group(group_id)));
        assert!(!visibility.allows(&AssignmentTarget::Group(GroupId::new())));
        assert!(!visibility.allows(&AssignmentTarget::Student(UserId::new())));
    }

    #[test]
    fn student_without_group_still_sees_direct_assignments() {
        let user_id = UserId::new();
        let scope = AccessScope::Student {
            user_id,
            group_id: None,
        };

        assert_eq!(scope.group_filter(), GroupFilter::Nothing);

        let visibility = scope.assignment_visibility(vec![]);
        assert!(visibility.allows(&AssignmentTarget::Student(user_id)));
        assert!(!visibility.allows(&AssignmentTarget::Group(GroupId::new())));
    }

    #[test]
    fn student_scope_lists_only_its_own_profile() {
        let user_id = UserId::new();
        let scope = AccessScope::Student {
            user_id,
            group_id: None,
        };

        assert_eq!(scope.user_filter(), UserFilter::OwnProfile(user_id));
    }
}
