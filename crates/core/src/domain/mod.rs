mod error;
mod grade;
mod ids;
mod language;
mod role;
mod schedule;
mod scope;
mod target;
mod test_case;

pub use error::DomainError;
pub use grade::Grade;
pub use ids::{AssignmentId, ChallengeId, GroupId, UserId};
pub use language::ChallengeLanguage;
pub use role::{Role, RoleMembership};
pub use schedule::{Schedule, WeeklySchedule};
pub use scope::{AccessScope, AssignmentVisibility, GroupFilter, UserFilter};
pub use target::{AssignmentTarget, TargetKind};
pub use test_case::TestCase;
