//! Verdict Taxonomy & Result Normalization
//!
//! **Core Responsibility:**
//! Map raw sandbox status codes to pass/fail and fold one raw outcome plus
//! its test case into a `TestCaseResult`.
//!
//! **Critical Properties:**
//! - Knows nothing about HTTP or the mock
//! - Pure functions: identical for every judge backend
//! - No persistence side effects

use gradex_common::types::{TestCase, TestCaseResult};

use crate::backend::JudgeOutcome;

pub const STATUS_IN_QUEUE: u32 = 1;
pub const STATUS_PROCESSING: u32 = 2;
pub const STATUS_ACCEPTED: u32 = 3;
pub const STATUS_WRONG_ANSWER: u32 = 4;
pub const STATUS_TIME_LIMIT_EXCEEDED: u32 = 5;
pub const STATUS_COMPILATION_ERROR: u32 = 6;
pub const STATUS_RUNTIME_ERROR_NZEC: u32 = 11;

/// True only for Accepted.
pub fn is_accepted(status_id: u32) -> bool {
    status_id == STATUS_ACCEPTED
}

/// Anything beyond In Queue / Processing is a final verdict.
pub fn is_terminal(status_id: u32) -> bool {
    status_id > STATUS_PROCESSING
}

pub fn status_description(status_id: u32) -> &'static str {
    match status_id {
        1 => "In Queue",
        2 => "Processing",
        3 => "Accepted",
        4 => "Wrong Answer",
        5 => "Time Limit Exceeded",
        6 => "Compilation Error",
        7 => "Runtime Error (SIGSEGV)",
        8 => "Runtime Error (SIGXFSZ)",
        9 => "Runtime Error (SIGFPE)",
        10 => "Runtime Error (SIGABRT)",
        11 => "Runtime Error (NZEC)",
        12 => "Runtime Error (Other)",
        13 => "Internal Error",
        14 => "Exec Format Error",
        _ => "Unknown",
    }
}

/// Fold one raw sandbox outcome into a per-test-case result.
///
/// `index` is 1-based within the judged subset. Error detail prefers stderr
/// over compiler output; time is reported in whole milliseconds.
pub fn normalize(index: u32, outcome: &JudgeOutcome, test_case: &TestCase) -> TestCaseResult {
    let output = outcome
        .stdout
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let error = outcome
        .stderr
        .clone()
        .or_else(|| outcome.compile_output.clone());

    let time_ms = outcome
        .time
        .map(|secs| (secs * 1000.0).round() as u64)
        .unwrap_or(0);

    TestCaseResult {
        test_case: index,
        passed: is_accepted(outcome.status_id),
        output,
        expected: test_case.expected.clone(),
        time_ms,
        error,
        hidden: test_case.hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_outcome(status_id: u32) -> JudgeOutcome {
        JudgeOutcome {
            token: "tok".to_string(),
            status_id,
            status_text: status_description(status_id).to_string(),
            stdout: None,
            stderr: None,
            compile_output: None,
            time: None,
            memory_kb: None,
        }
    }

    fn make_test_case(expected: &str) -> TestCase {
        TestCase {
            input: "in".to_string(),
            expected: expected.to_string(),
            hidden: false,
        }
    }

    #[test]
    fn test_only_accepted_passes() {
        for id in 1..=14 {
            let result = normalize(1, &make_outcome(id), &make_test_case("x"));
            assert_eq!(result.passed, id == 3, "status {}", id);
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!is_terminal(STATUS_IN_QUEUE));
        assert!(!is_terminal(STATUS_PROCESSING));
        for id in 3..=14 {
            assert!(is_terminal(id));
        }
    }

    #[test]
    fn test_output_is_trimmed_stdout() {
        let mut outcome = make_outcome(STATUS_ACCEPTED);
        outcome.stdout = Some("  42\n".to_string());
        let result = normalize(1, &outcome, &make_test_case("42"));
        assert_eq!(result.output, "42");
    }

    #[test]
    fn test_missing_stdout_is_empty_string() {
        let result = normalize(1, &make_outcome(STATUS_WRONG_ANSWER), &make_test_case("42"));
        assert_eq!(result.output, "");
    }

    #[test]
    fn test_error_prefers_stderr_over_compile_output() {
        let mut outcome = make_outcome(STATUS_RUNTIME_ERROR_NZEC);
        outcome.stderr = Some("boom".to_string());
        outcome.compile_output = Some("cc: bad".to_string());
        let result = normalize(1, &outcome, &make_test_case("x"));
        assert_eq!(result.error.as_deref(), Some("boom"));

        outcome.stderr = None;
        let result = normalize(1, &outcome, &make_test_case("x"));
        assert_eq!(result.error.as_deref(), Some("cc: bad"));

        outcome.compile_output = None;
        let result = normalize(1, &outcome, &make_test_case("x"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_time_rounded_to_millis() {
        let mut outcome = make_outcome(STATUS_ACCEPTED);
        outcome.time = Some(0.0546);
        let result = normalize(1, &outcome, &make_test_case("x"));
        assert_eq!(result.time_ms, 55);

        outcome.time = None;
        let result = normalize(1, &outcome, &make_test_case("x"));
        assert_eq!(result.time_ms, 0);
    }

    #[test]
    fn test_expected_and_hidden_carried_from_test_case() {
        let tc = TestCase {
            input: "in".to_string(),
            expected: "out".to_string(),
            hidden: true,
        };
        let result = normalize(3, &make_outcome(STATUS_ACCEPTED), &tc);
        assert_eq!(result.test_case, 3);
        assert_eq!(result.expected, "out");
        assert!(result.hidden);
    }

    #[test]
    fn test_unknown_status_description() {
        assert_eq!(status_description(99), "Unknown");
    }
}
