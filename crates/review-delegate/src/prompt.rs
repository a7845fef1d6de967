use academia_code_core::domain::TestCase;
use serde_json::json;

use crate::error::Result;

/// Everything the review delegate forwards to the hosted model for one
/// submission. Capture references are passed through untouched; nothing in
/// this crate looks inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub source_code: String,
    pub exam_context: String,
    pub test_cases: Vec<TestCase>,
    pub capture_refs: Vec<String>,
    pub allow_interactive_apis: bool,
}

/// Renders the structured prompt. The model does all evaluation; this side
/// only frames the question and pins the answer format.
pub fn build_prompt(request: &ReviewRequest) -> Result<String> {
    let test_cases = serde_json::to_string_pretty(&request.test_cases)?;

    let mut prompt = String::new();
    prompt.push_str(
        "You are reviewing a student's submission for a proctored coding exercise. \
         Evaluate the code against the test cases, judge how plausible it is that the \
         student produced it unaided, grade the work, and tag the skills it shows.\n\n",
    );

    prompt.push_str("## Exam context\n");
    prompt.push_str(&request.exam_context);
    prompt.push_str("\n\n## Test cases\n");
    prompt.push_str(&test_cases);
    prompt.push_str("\n\n## Submitted code\n");
    prompt.push_str(&request.source_code);
    prompt.push('\n');

    if request.allow_interactive_apis {
        prompt.push_str(
            "\nInteractive API usage was explicitly permitted for this exercise; \
             do not count it against the student.\n",
        );
    } else {
        prompt.push_str(
            "\nInteractive API usage was NOT permitted for this exercise; treat signs \
             of it as a risk indicator.\n",
        );
    }

    if !request.capture_refs.is_empty() {
        prompt.push_str("\n## Session captures\n");
        for capture in &request.capture_refs {
            prompt.push_str("- ");
            prompt.push_str(capture);
            prompt.push('\n');
        }
    }

    let schema = json!({
        "report": "free-text review",
        "riskLabel": "none | low | medium | high",
        "testResults": [{
            "input": "string",
            "expectedOutput": "string",
            "status": "passed | failed",
            "actualOutput": "string, optional"
        }],
        "grade": "integer 1-5",
        "skillTags": "2-3 short strings"
    });
    prompt.push_str("\nAnswer with a single JSON object, no prose around it:\n");
    prompt.push_str(&serde_json::to_string_pretty(&schema)?);
    prompt.push('\n');

    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::{ReviewRequest, build_prompt};
    use academia_code_core::domain::TestCase;

    fn sample_request() -> ReviewRequest {
        ReviewRequest {
            source_code: "def suma(a, b):\n    return a + b\n".to_string(),
            exam_context: "Parcial 2, ejercicio de sumas".to_string(),
            test_cases: vec![TestCase {
                input: "2 3".to_string(),
                expected_output: "5".to_string(),
            }],
            capture_refs: vec!["captures/session-17/screen.webm".to_string()],
            allow_interactive_apis: false,
        }
    }

    #[test]
    fn prompt_carries_code_context_and_test_cases() {
        let prompt = build_prompt(&sample_request()).expect("prompt should build");

        assert!(prompt.contains("def suma"));
        assert!(prompt.contains("Parcial 2"));
        assert!(prompt.contains("expectedOutput"));
        assert!(prompt.contains("captures/session-17/screen.webm"));
        assert!(prompt.contains("NOT permitted"));
    }

    #[test]
    fn allowed_interactive_apis_change_the_instruction() {
        let mut request = sample_request();
        request.allow_interactive_apis = true;
        request.capture_refs.clear();

        let prompt = build_prompt(&request).expect("prompt should build");
        assert!(prompt.contains("explicitly permitted"));
        assert!(!prompt.contains("## Session captures"));
    }
}
