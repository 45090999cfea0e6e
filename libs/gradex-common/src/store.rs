//! Storage seam for the judging subsystem.
//!
//! The orchestrator and scoring reconciler only need a handful of narrow
//! verbs; everything else about persistence belongs to the surrounding
//! application. `MemoryStore` backs tests and mock-mode deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::ExamError;
use crate::types::{Exam, ExamProblem, ExamSession, Problem, SessionStatus, Submission};

#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn get_problem(&self, id: Uuid) -> Result<Option<Problem>, ExamError>;
    async fn get_exam(&self, id: Uuid) -> Result<Option<Exam>, ExamError>;
    async fn get_session(&self, id: Uuid) -> Result<Option<ExamSession>, ExamError>;

    /// Submissions are append-only; a stored submission is never mutated.
    async fn create_submission(&self, submission: Submission) -> Result<(), ExamError>;

    /// Single whole-value write per transition.
    async fn update_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
    ) -> Result<(), ExamError>;

    /// Single whole-value write; called by the scoring reconciler only.
    async fn update_session_score(&self, id: Uuid, total_score: u32) -> Result<(), ExamError>;

    /// All final submissions for a session, in insertion order.
    async fn final_submissions(&self, session_id: Uuid) -> Result<Vec<Submission>, ExamError>;

    async fn exam_problems(&self, exam_id: Uuid) -> Result<Vec<ExamProblem>, ExamError>;
}

/// In-memory store over lock-guarded maps.
#[derive(Default)]
pub struct MemoryStore {
    problems: RwLock<HashMap<Uuid, Problem>>,
    exams: RwLock<HashMap<Uuid, Exam>>,
    sessions: RwLock<HashMap<Uuid, ExamSession>>,
    exam_problems: RwLock<Vec<ExamProblem>>,
    submissions: RwLock<Vec<Submission>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_problem(&self, problem: Problem) {
        self.problems.write().insert(problem.id, problem);
    }

    pub fn insert_exam(&self, exam: Exam) {
        self.exams.write().insert(exam.id, exam);
    }

    pub fn insert_session(&self, session: ExamSession) {
        self.sessions.write().insert(session.id, session);
    }

    pub fn insert_exam_problem(&self, row: ExamProblem) {
        self.exam_problems.write().push(row);
    }

    /// Every submission ever recorded, in insertion order. Test helper.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.read().clone()
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn get_problem(&self, id: Uuid) -> Result<Option<Problem>, ExamError> {
        Ok(self.problems.read().get(&id).cloned())
    }

    async fn get_exam(&self, id: Uuid) -> Result<Option<Exam>, ExamError> {
        Ok(self.exams.read().get(&id).cloned())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<ExamSession>, ExamError> {
        Ok(self.sessions.read().get(&id).cloned())
    }

    async fn create_submission(&self, submission: Submission) -> Result<(), ExamError> {
        self.submissions.write().push(submission);
        Ok(())
    }

    async fn update_session_status(
        &self,
        id: Uuid,
        status: SessionStatus,
    ) -> Result<(), ExamError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(&id)
            .ok_or(ExamError::SessionInvalid)?;
        session.status = status;
        Ok(())
    }

    async fn update_session_score(&self, id: Uuid, total_score: u32) -> Result<(), ExamError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(&id)
            .ok_or(ExamError::SessionInvalid)?;
        session.total_score = total_score;
        Ok(())
    }

    async fn final_submissions(&self, session_id: Uuid) -> Result<Vec<Submission>, ExamError> {
        Ok(self
            .submissions
            .read()
            .iter()
            .filter(|s| s.session_id == session_id && s.is_final)
            .cloned()
            .collect())
    }

    async fn exam_problems(&self, exam_id: Uuid) -> Result<Vec<ExamProblem>, ExamError> {
        Ok(self
            .exam_problems
            .read()
            .iter()
            .filter(|ep| ep.exam_id == exam_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, SubmissionStatus};
    use chrono::Utc;

    fn make_submission(session_id: Uuid, is_final: bool) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            session_id,
            problem_id: Uuid::new_v4(),
            language: Language::Python,
            code: String::new(),
            status: SubmissionStatus::Passed,
            test_results: vec![],
            is_final,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_final_submissions_filters_non_final() {
        let store = MemoryStore::new();
        let session_id = Uuid::new_v4();

        store.create_submission(make_submission(session_id, false)).await.unwrap();
        store.create_submission(make_submission(session_id, true)).await.unwrap();
        store.create_submission(make_submission(Uuid::new_v4(), true)).await.unwrap();

        let finals = store.final_submissions(session_id).await.unwrap();
        assert_eq!(finals.len(), 1);
        assert!(finals[0].is_final);
    }

    #[tokio::test]
    async fn test_session_updates_are_visible() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.insert_session(ExamSession {
            id,
            exam_id: Uuid::new_v4(),
            candidate_name: "ada".to_string(),
            status: SessionStatus::InProgress,
            total_score: 0,
        });

        store.update_session_status(id, SessionStatus::TimedOut).await.unwrap();
        store.update_session_score(id, 40).await.unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::TimedOut);
        assert_eq!(session.total_score, 40);
    }

    #[tokio::test]
    async fn test_update_unknown_session_fails() {
        let store = MemoryStore::new();
        let err = store
            .update_session_score(Uuid::new_v4(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::SessionInvalid));
    }
}
