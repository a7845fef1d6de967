pub mod assignment_repository;
pub mod challenge_repository;
pub mod group_repository;
pub mod user_profile_repository;

pub use assignment_repository::{
    AssignmentRecord, AssignmentRepository, NewAssignment, SeaOrmAssignmentRepository,
};
pub use challenge_repository::{
    ChallengeRecord, ChallengeRepository, NewChallenge, SeaOrmChallengeRepository, UpdateChallenge,
};
pub use group_repository::{GroupRecord, GroupRepository, NewGroup, SeaOrmGroupRepository};
pub use user_profile_repository::{
    NewUserProfile, SeaOrmUserProfileRepository, UserProfileRecord, UserProfileRepository,
};
