//! Request/response envelopes of the external trace generator.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InputError, Result};
use crate::step::{Step, StepRecord};

/// Maximum accepted code length in characters.
pub const DEFAULT_MAX_CODE_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    Cpp,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
        })
    }
}

/// Audience level of the explanation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Eli5,
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

/// Envelope shared by the visualize and explain endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRequest {
    pub code: String,
    pub language: Language,
    #[serde(default)]
    pub level: Level,
}

impl TraceRequest {
    pub fn new(code: impl Into<String>, language: Language, level: Level) -> Self {
        Self {
            code: code.into(),
            language,
            level,
        }
    }

    /// Check the request before any network round-trip.
    pub fn validate(&self, max_len: usize) -> std::result::Result<(), InputError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(InputError::EmptyCode);
        }
        let len = code.chars().count();
        if len > max_len {
            return Err(InputError::TooLong { len, max: max_len });
        }
        Ok(())
    }

    /// Validate and trim the code for sending.
    pub fn prepare(mut self, max_len: usize) -> std::result::Result<Self, InputError> {
        self.validate(max_len)?;
        self.code = self.code.trim().to_owned();
        Ok(self)
    }
}

/// Successful visualize response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualizeResponse {
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl VisualizeResponse {
    pub fn into_steps(self) -> Result<Vec<Step>> {
        Step::from_records(self.steps)
    }
}

/// Failure body; `detail` is a message string, or a list of validation
/// errors each carrying a `msg`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Value,
}

impl ErrorBody {
    /// Human-readable message, if the body has one.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::String(text) => Some(text.clone()),
            Value::Array(errors) => errors
                .iter()
                .find_map(|e| e.get("msg").and_then(Value::as_str))
                .map(str::to_owned),
            Value::Object(error) => error.get("msg").and_then(Value::as_str).map(str::to_owned),
            _ => None,
        }
    }
}

/// One entry of `bugs_found`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    /// `high`, `medium` or `low`.
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub fix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSmell {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Bug detection response, passed through like [`Explanation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReport {
    #[serde(default)]
    pub bugs_found: Vec<Bug>,
    #[serde(default)]
    pub code_smells: Vec<CodeSmell>,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default)]
    pub refactored_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub space: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineExplanation {
    #[serde(default)]
    pub line_number: u32,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConcept {
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub explanation: String,
}

/// Explain endpoint response, passed through to the explanation view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub line_by_line: Vec<LineExplanation>,
    #[serde(default)]
    pub key_concepts: Vec<KeyConcept>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_code_is_rejected() {
        let req = TraceRequest::new("   \n\t", Language::Python, Level::Beginner);
        assert_eq!(req.validate(DEFAULT_MAX_CODE_LENGTH), Err(InputError::EmptyCode));
    }

    #[test]
    fn long_code_is_rejected() {
        let req = TraceRequest::new("x".repeat(11), Language::Cpp, Level::Expert);
        assert_eq!(req.validate(10), Err(InputError::TooLong { len: 11, max: 10 }));
    }

    #[test]
    fn prepare_trims_code() {
        let req = TraceRequest::new("  x = 1\n", Language::Python, Level::Eli5)
            .prepare(DEFAULT_MAX_CODE_LENGTH)
            .unwrap();
        assert_eq!(req.code, "x = 1");
    }

    #[test]
    fn level_defaults_to_beginner() {
        let req: TraceRequest =
            serde_json::from_str(r#"{"code": "x = 1", "language": "javascript"}"#).unwrap();
        assert_eq!(req.level, Level::Beginner);
        assert_eq!(req.language, Language::Javascript);
    }

    #[test]
    fn visualize_response_tolerates_extra_fields() {
        let body = r#"{"success": true, "steps": [], "total_steps": 0, "language": "python"}"#;
        let response: VisualizeResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_steps().unwrap().is_empty());
    }

    #[test]
    fn explanation_decodes() {
        let body = r#"{
            "summary": "Sums a list.",
            "complexity": {"time": "O(n)", "space": "O(1)", "explanation": "one pass"},
            "line_by_line": [{"line_number": 1, "code": "total = 0", "explanation": "start"}],
            "key_concepts": [{"concept": "Loop", "explanation": "repeats"}]
        }"#;
        let explanation: Explanation = serde_json::from_str(body).unwrap();
        assert_eq!(explanation.complexity.time, "O(n)");
        assert_eq!(explanation.line_by_line[0].line_number, 1);
    }

    #[test]
    fn error_detail_string_or_validation_list() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Code cannot be empty"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("Code cannot be empty"));

        let body: ErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "level"], "msg": "Level must be one of: eli5, beginner", "type": "value_error"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some("Level must be one of: eli5, beginner")
        );

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn bug_report_decodes() {
        let body = r#"{
            "bugs_found": [{"severity": "high", "line": 3, "issue": "off by one",
                            "explanation": "skips last", "fix": "use <="}],
            "code_smells": [{"type": "readability", "line": 5, "issue": "long line",
                             "suggestion": "split it"}],
            "improvements": [{"category": "performance", "suggestion": "cache it"}]
        }"#;
        let report: BugReport = serde_json::from_str(body).unwrap();
        assert_eq!(report.bugs_found[0].line, Some(3));
        assert_eq!(report.code_smells[0].kind, "readability");
        assert_eq!(report.improvements[0].example, None);
        assert_eq!(report.refactored_code, None);
    }
}
