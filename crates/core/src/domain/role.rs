use super::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    SuperAdmin,
}

/// Role-specific relationships of a profile.
///
/// A student belongs to at most one group; a teacher manages zero or more
/// groups; a super admin carries neither. The two id fields of the stored
/// record are mutually exclusive, which this enum encodes directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleMembership {
    Student { group_id: Option<GroupId> },
    Teacher { managed_group_ids: Vec<GroupId> },
    SuperAdmin,
}

impl RoleMembership {
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Teacher { .. } => Role::Teacher,
            Self::SuperAdmin => Role::SuperAdmin,
        }
    }

    /// The group a student belongs to. `None` for every other role.
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Self::Student { group_id } => *group_id,
            _ => None,
        }
    }

    /// The groups a teacher manages. Empty for every other role.
    pub fn managed_group_ids(&self) -> &[GroupId] {
        match self {
            Self::Teacher { managed_group_ids } => managed_group_ids,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, RoleMembership};
    use crate::domain::GroupId;

    #[test]
    fn student_membership_exposes_group_only() {
        let group = GroupId::new();
        let membership = RoleMembership::Student {
            group_id: Some(group),
        };

        assert_eq!(membership.role(), Role::Student);
        assert_eq!(membership.group_id(), Some(group));
        assert!(membership.managed_group_ids().is_empty());
    }

    #[test]
    fn teacher_membership_exposes_managed_set_only() {
        let groups = vec![GroupId::new(), GroupId::new()];
        let membership = RoleMembership::Teacher {
            managed_group_ids: groups.clone(),
        };

        assert_eq!(membership.role(), Role::Teacher);
        assert_eq!(membership.group_id(), None);
        assert_eq!(membership.managed_group_ids(), groups.as_slice());
    }

    #[test]
    fn super_admin_membership_carries_no_relationships() {
        let membership = RoleMembership::SuperAdmin;

        assert_eq!(membership.role(), Role::SuperAdmin);
        assert_eq!(membership.group_id(), None);
        assert!(membership.managed_group_ids().is_empty());
    }
}
