use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Weekly meeting schedule of a group, as stored on the group document.
///
/// Day names are kept as entered by the operator ("Lunes", "Miércoles", ...);
/// they are display strings, not a normalized calendar vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub days: Vec<String>,
    #[serde(rename = "startTime", with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(rename = "endTime", with = "hh_mm")]
    pub end_time: NaiveTime,
}

impl WeeklySchedule {
    pub fn new(
        days: Vec<String>,
        start_time: &str,
        end_time: &str,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            days,
            start_time: parse_time(start_time)?,
            end_time: parse_time(end_time)?,
        })
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| DomainError::InvalidScheduleTime(value.to_string()))
}

/// A group schedule: either the structured weekly form or the free-text
/// string older records were created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Weekly(WeeklySchedule),
    Legacy(String),
}

impl Schedule {
    /// Reads the stored column value. A JSON object is the structured form;
    /// anything else is carried through as legacy free text.
    pub fn from_stored(raw: &str) -> Self {
        match serde_json::from_str::<WeeklySchedule>(raw) {
            Ok(weekly) => Self::Weekly(weekly),
            Err(_) => Self::Legacy(raw.to_string()),
        }
    }

    pub fn to_stored(&self) -> serde_json::Result<String> {
        match self {
            Self::Weekly(weekly) => serde_json::to_string(weekly),
            Self::Legacy(text) => Ok(text.clone()),
        }
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Schedule, WeeklySchedule};
    use crate::domain::DomainError;

    #[test]
    fn structured_schedule_is_parsed_from_stored_json() {
        let raw = r#"{"days":["Lunes","Miércoles"],"startTime":"08:00","endTime":"10:00"}"#;

        match Schedule::from_stored(raw) {
            Schedule::Weekly(weekly) => {
                assert_eq!(weekly.days, vec!["Lunes", "Miércoles"]);
                assert_eq!(weekly.start_time.format("%H:%M").to_string(), "08:00");
                assert_eq!(weekly.end_time.format("%H:%M").to_string(), "10:00");
            }
            Schedule::Legacy(text) => panic!("expected structured schedule, got legacy: {text}"),
        }
    }

    #[test]
    fn free_text_schedule_falls_back_to_legacy() {
        let schedule = Schedule::from_stored("Lunes y Miércoles de 8 a 10");

        assert_eq!(
            schedule,
            Schedule::Legacy("Lunes y Miércoles de 8 a 10".to_string())
        );
    }

    #[test]
    fn stored_form_round_trips() {
        let weekly = WeeklySchedule::new(vec!["Viernes".to_string()], "14:30", "16:00")
            .expect("schedule should be valid");
        let schedule = Schedule::Weekly(weekly);

        let stored = schedule.to_stored().expect("schedule should serialize");
        assert_eq!(Schedule::from_stored(&stored), schedule);
    }

    #[test]
    fn malformed_times_are_rejected() {
        let err = WeeklySchedule::new(vec!["Lunes".to_string()], "8am", "10:00")
            .expect_err("8am should be rejected");

        assert_eq!(err, DomainError::InvalidScheduleTime("8am".to_string()));
    }
}
