//! Execution Orchestrator - Run/Submit State Machine
//!
//! **Core Responsibility:**
//! Given a problem and candidate code, judge the correct test-case subset
//! (visible-only for "run", everything for "submit"), aggregate verdicts,
//! persist the submission, and compute the score.
//!
//! **Failure Policy:**
//! A judge failure for one test case becomes a failed result row and the
//! batch continues; only session/problem-state failures reject the whole
//! request. Test cases run strictly sequentially, so `results[i]` always
//! corresponds to the i-th selected test case.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use gradex_common::error::{ExamError, JudgeError};
use gradex_common::store::ExamStore;
use gradex_common::types::{
    Exam, ExamSession, Language, Problem, SessionStatus, Submission, SubmissionStatus,
    TestCase, TestCaseResult,
};

use crate::backend::{JudgeBackend, JudgeRequest};
use crate::scoring;
use crate::verdict;

pub const HIDDEN_PLACEHOLDER: &str = "[Hidden]";
pub const HIDDEN_FAILURE_MESSAGE: &str = "Hidden test failed";

/// One run/submit request, already shape-validated at the boundary.
#[derive(Debug, Clone)]
pub struct JudgeAttempt {
    pub session_id: Uuid,
    pub problem_id: Uuid,
    pub language: Language,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub results: Vec<TestCaseResult>,
    pub passed_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub all_passed: bool,
    pub passed_count: usize,
    pub total_count: usize,
    pub score: u32,
    pub max_score: u32,
    pub results: Vec<TestCaseResult>,
}

pub struct Orchestrator {
    store: Arc<dyn ExamStore>,
    judge: Arc<dyn JudgeBackend>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn ExamStore>, judge: Arc<dyn JudgeBackend>) -> Self {
        Self { store, judge }
    }

    /// Practice run: visible test cases only, full detail returned,
    /// non-final submission persisted.
    pub async fn run_visible(&self, attempt: JudgeAttempt) -> Result<RunOutcome, ExamError> {
        let session = self.gate_session(attempt.session_id).await?;
        let problem = self.load_problem(attempt.problem_id).await?;

        let visible: Vec<&TestCase> =
            problem.test_cases.iter().filter(|tc| !tc.hidden).collect();

        let results = self.judge_cases(&attempt, &visible).await;
        let passed_count = results.iter().filter(|r| r.passed).count();
        let total_count = results.len();

        self.persist_submission(&attempt, &results, false).await?;

        info!(
            session_id = %session.id,
            problem_id = %problem.id,
            passed = passed_count,
            total = total_count,
            "Run completed"
        );

        Ok(RunOutcome {
            results,
            passed_count,
            total_count,
        })
    }

    /// Final submission: every test case including hidden ones, score
    /// computed and reconciled, hidden rows redacted in the response.
    pub async fn submit_final(&self, attempt: JudgeAttempt) -> Result<SubmitOutcome, ExamError> {
        let session = self.gate_session(attempt.session_id).await?;
        let problem = self.load_problem(attempt.problem_id).await?;

        let all: Vec<&TestCase> = problem.test_cases.iter().collect();
        let results = self.judge_cases(&attempt, &all).await;

        let passed_count = results.iter().filter(|r| r.passed).count();
        let total_count = results.len();
        let all_passed = passed_count == total_count;

        let max_score = self
            .store
            .exam_problems(session.exam_id)
            .await?
            .iter()
            .find(|ep| ep.problem_id == attempt.problem_id)
            .map(|ep| ep.points)
            .unwrap_or(0);

        let score = scoring::earned_points(max_score, passed_count, total_count);

        self.persist_submission(&attempt, &results, true).await?;

        let total_score =
            scoring::recompute_session_score(self.store.as_ref(), session.id, session.exam_id)
                .await?;

        info!(
            session_id = %session.id,
            problem_id = %problem.id,
            passed = passed_count,
            total = total_count,
            score = score,
            max_score = max_score,
            session_total = total_score,
            "Final submission recorded"
        );

        Ok(SubmitOutcome {
            all_passed,
            passed_count,
            total_count,
            score,
            max_score,
            results: results.into_iter().map(redact_hidden).collect(),
        })
    }

    /// Session liveness gate shared by both entry points. Expiry flips the
    /// session into its terminal timed-out state before rejecting.
    async fn gate_session(&self, session_id: Uuid) -> Result<ExamSession, ExamError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(ExamError::SessionInvalid)?;

        if session.status != SessionStatus::InProgress {
            return Err(ExamError::SessionInvalid);
        }

        let exam: Exam = self
            .store
            .get_exam(session.exam_id)
            .await?
            .ok_or(ExamError::SessionInvalid)?;

        if Utc::now() > exam.ends_at {
            warn!(session_id = %session.id, exam_id = %exam.id, "Exam window elapsed");
            self.store
                .update_session_status(session.id, SessionStatus::TimedOut)
                .await?;
            return Err(ExamError::SessionExpired);
        }

        Ok(session)
    }

    async fn load_problem(&self, problem_id: Uuid) -> Result<Problem, ExamError> {
        self.store
            .get_problem(problem_id)
            .await?
            .ok_or(ExamError::ProblemNotFound)
    }

    /// Judge the selected cases strictly in order. A backend failure is
    /// recorded as a failed row and the remaining cases still run.
    async fn judge_cases(
        &self,
        attempt: &JudgeAttempt,
        cases: &[&TestCase],
    ) -> Vec<TestCaseResult> {
        let mut results = Vec::with_capacity(cases.len());

        for (i, test_case) in cases.iter().enumerate() {
            let index = (i + 1) as u32;
            let request = JudgeRequest::new(
                attempt.code.clone(),
                attempt.language.sandbox_id(),
                Some(test_case.input.clone()),
                Some(test_case.expected.clone()),
            );

            let result = match self.judge.run(&request).await {
                Ok(outcome) => verdict::normalize(index, &outcome, test_case),
                Err(err) => {
                    warn!(
                        problem_id = %attempt.problem_id,
                        test_case = index,
                        error = %err,
                        "Judge call failed; recording failed row"
                    );
                    failed_row(index, test_case, &err)
                }
            };

            results.push(result);
        }

        results
    }

    async fn persist_submission(
        &self,
        attempt: &JudgeAttempt,
        results: &[TestCaseResult],
        is_final: bool,
    ) -> Result<(), ExamError> {
        let status = if results.iter().all(|r| r.passed) {
            SubmissionStatus::Passed
        } else {
            SubmissionStatus::Failed
        };

        self.store
            .create_submission(Submission {
                id: Uuid::new_v4(),
                session_id: attempt.session_id,
                problem_id: attempt.problem_id,
                language: attempt.language,
                code: attempt.code.clone(),
                status,
                test_results: results.to_vec(),
                is_final,
                created_at: Utc::now(),
            })
            .await
    }
}

fn failed_row(index: u32, test_case: &TestCase, err: &JudgeError) -> TestCaseResult {
    TestCaseResult {
        test_case: index,
        passed: false,
        output: String::new(),
        expected: test_case.expected.clone(),
        time_ms: 0,
        error: Some(err.to_string()),
        hidden: test_case.hidden,
    }
}

/// Hidden test cases never leak their expected values: output and expected
/// are replaced with a placeholder, and a failure only says that a hidden
/// test failed.
fn redact_hidden(result: TestCaseResult) -> TestCaseResult {
    if !result.hidden {
        return result;
    }

    TestCaseResult {
        output: HIDDEN_PLACEHOLDER.to_string(),
        expected: HIDDEN_PLACEHOLDER.to_string(),
        error: if result.passed {
            None
        } else {
            Some(HIDDEN_FAILURE_MESSAGE.to_string())
        },
        ..result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(passed: bool, hidden: bool) -> TestCaseResult {
        TestCaseResult {
            test_case: 1,
            passed,
            output: "secret output".to_string(),
            expected: "secret expected".to_string(),
            time_ms: 12,
            error: Some("diff".to_string()),
            hidden,
        }
    }

    #[test]
    fn test_redact_hidden_replaces_output_and_expected() {
        let redacted = redact_hidden(make_result(false, true));
        assert_eq!(redacted.output, HIDDEN_PLACEHOLDER);
        assert_eq!(redacted.expected, HIDDEN_PLACEHOLDER);
        assert_eq!(redacted.error.as_deref(), Some(HIDDEN_FAILURE_MESSAGE));
    }

    #[test]
    fn test_redact_hidden_passing_row_has_no_error() {
        let redacted = redact_hidden(make_result(true, true));
        assert_eq!(redacted.output, HIDDEN_PLACEHOLDER);
        assert!(redacted.error.is_none());
        assert!(redacted.passed);
    }

    #[test]
    fn test_redact_leaves_visible_rows_alone() {
        let result = redact_hidden(make_result(false, false));
        assert_eq!(result.output, "secret output");
        assert_eq!(result.expected, "secret expected");
        assert_eq!(result.error.as_deref(), Some("diff"));
    }
}
