use academia_code_core::domain::Grade;
use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, Result};

/// Academic-integrity risk label assigned by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Per-test outcome reported by the model. Field names follow the document
/// format the rest of the platform stores test cases in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVerdict {
    pub input: String,
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
    pub status: TestStatus,
    #[serde(rename = "actualOutput", default, skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<String>,
}

/// Full review verdict. Shape and ranges are validated before anything is
/// handed back to the caller; a malformed model response never produces a
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub report: String,
    #[serde(rename = "riskLabel")]
    pub risk_label: RiskLabel,
    #[serde(rename = "testResults")]
    pub test_results: Vec<TestVerdict>,
    pub grade: Grade,
    #[serde(rename = "skillTags")]
    pub skill_tags: Vec<String>,
}

impl ReviewVerdict {
    pub const MIN_SKILL_TAGS: usize = 2;
    pub const MAX_SKILL_TAGS: usize = 3;

    /// Parses and validates the model's JSON answer.
    pub fn from_model_json(raw: &str) -> Result<Self> {
        let verdict: Self = serde_json::from_str(raw)
            .map_err(|err| ReviewError::InvalidVerdict(err.to_string()))?;
        verdict.validate()?;
        Ok(verdict)
    }

    fn validate(&self) -> Result<()> {
        let tags = self.skill_tags.len();
        if !(Self::MIN_SKILL_TAGS..=Self::MAX_SKILL_TAGS).contains(&tags) {
            return Err(ReviewError::InvalidVerdict(format!(
                "expected {} to {} skill tags, got {tags}",
                Self::MIN_SKILL_TAGS,
                Self::MAX_SKILL_TAGS
            )));
        }
        Ok(())
    }
}
