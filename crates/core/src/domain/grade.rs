use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DomainError;

/// Grade handed back by the review delegate, on the platform's 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidGrade(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Grade {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(value: Grade) -> Self {
        value.value()
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Self::new(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Grade;

    #[test]
    fn valid_grade_is_created() {
        let grade = Grade::new(5).expect("5 should be valid");

        assert_eq!(grade.value(), 5);
    }

    #[test]
    fn out_of_range_grades_are_rejected() {
        let err = Grade::new(0).expect_err("0 should be rejected");
        assert_eq!(err.to_string(), "invalid grade: 0. grade must be in [1, 5]");

        assert!(Grade::new(6).is_err());
    }

    #[test]
    fn grade_deserialization_enforces_the_range() {
        let grade: Grade = serde_json::from_str("3").expect("3 should deserialize");
        assert_eq!(grade.value(), 3);

        assert!(serde_json::from_str::<Grade>("0").is_err());
        assert!(serde_json::from_str::<Grade>("7").is_err());
    }
}
