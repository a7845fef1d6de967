use serde::{Deserialize, Serialize};

/// One test case of a challenge, as stored in the serialized test-case
/// column and echoed back by the review delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
}

impl TestCase {
    /// Parses the serialized test-case column of a challenge.
    pub fn parse_set(raw: &str) -> serde_json::Result<Vec<TestCase>> {
        serde_json::from_str(raw)
    }

    pub fn serialize_set(cases: &[TestCase]) -> serde_json::Result<String> {
        serde_json::to_string(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::TestCase;

    #[test]
    fn test_case_set_round_trips_through_stored_json() {
        let cases = vec![
            TestCase {
                input: "2 3".to_string(),
                expected_output: "5".to_string(),
            },
            TestCase {
                input: "0 0".to_string(),
                expected_output: "0".to_string(),
            },
        ];

        let raw = TestCase::serialize_set(&cases).expect("cases should serialize");
        assert!(raw.contains("expectedOutput"));

        let parsed = TestCase::parse_set(&raw).expect("cases should parse");
        assert_eq!(parsed, cases);
    }

    #[test]
    fn malformed_test_case_json_is_an_error() {
        assert!(TestCase::parse_set("not json").is_err());
    }
}
