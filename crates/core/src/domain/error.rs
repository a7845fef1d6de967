use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid grade: {0}. grade must be in [1, 5]")]
    InvalidGrade(u8),

    #[error("invalid schedule time '{0}'. expected HH:MM")]
    InvalidScheduleTime(String),

    #[error("invalid role code: {0}")]
    InvalidRole(i16),
}
