use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Languages candidates can submit in, with their sandbox language ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Cpp,
    Go,
}

impl Language {
    /// Numeric language id understood by the remote sandbox.
    pub fn sandbox_id(&self) -> u32 {
        match self {
            Language::Python => 71, // Python 3.8.1
            Language::Java => 62,   // Java 13.0.1
            Language::Cpp => 54,    // C++ 9.2.0
            Language::Go => 60,     // Go 1.13.5
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Go => "go",
        };
        write!(f, "{}", name)
    }
}

/// One test case of a problem. Hidden cases run on final submission only
/// and their input/expected text is never shown to the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub starter_code: HashMap<Language, String>,
    /// Ordered; guaranteed non-empty by the admin domain.
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub title: String,
    pub ends_at: DateTime<Utc>,
}

/// Join row binding a problem to an exam with its point value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamProblem {
    pub exam_id: Uuid,
    pub problem_id: Uuid,
    pub points: u32,
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSession {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub candidate_name: String,
    pub status: SessionStatus,
    pub total_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Passed,
    Failed,
}

/// Per-test-case outcome as stored on a submission and returned to the
/// candidate. `test_case` is 1-based within the judged subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_case: u32,
    pub passed: bool,
    pub output: String,
    pub expected: String,
    pub time_ms: u64,
    pub error: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

/// Immutable record of one judging attempt. Non-final submissions come from
/// "run" (visible tests only); final ones from "submit" (all tests) and are
/// the only submissions counted toward the session score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub session_id: Uuid,
    pub problem_id: Uuid,
    pub language: Language,
    pub code: String,
    pub status: SubmissionStatus,
    pub test_results: Vec<TestCaseResult>,
    pub is_final: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_language_ids() {
        assert_eq!(Language::Python.sandbox_id(), 71);
        assert_eq!(Language::Java.sandbox_id(), 62);
        assert_eq!(Language::Cpp.sandbox_id(), 54);
        assert_eq!(Language::Go.sandbox_id(), 60);
    }

    #[test]
    fn test_language_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Cpp).unwrap(), "\"cpp\"");
        let lang: Language = serde_json::from_str("\"python\"").unwrap();
        assert_eq!(lang, Language::Python);
    }

    #[test]
    fn test_session_status_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::TimedOut).unwrap(),
            "\"timed_out\""
        );
    }

    #[test]
    fn test_test_case_hidden_defaults_false() {
        let tc: TestCase = serde_json::from_str(r#"{"input":"1","expected":"2"}"#).unwrap();
        assert!(!tc.hidden);
    }
}
