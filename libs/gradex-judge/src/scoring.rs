//! Scoring Reconciler - Session Total Recomputation
//!
//! **Core Responsibility:**
//! Recompute a session's total score from scratch on every final
//! submission: load all final submissions and the exam's point table, keep
//! the most recent final submission per problem, and sum points for the
//! passing ones.
//!
//! Recomputing from the full submission set (instead of adjusting
//! incrementally) absorbs out-of-order and retried final submissions; the
//! latest-per-problem dedup means a problem contributes its points at most
//! once no matter how many times it was submitted as final.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use gradex_common::error::ExamError;
use gradex_common::store::ExamStore;
use gradex_common::types::{Submission, SubmissionStatus};

/// Full problem points when everything passed, floor-prorated otherwise.
pub fn earned_points(max_points: u32, passed_count: usize, total_count: usize) -> u32 {
    if total_count == 0 {
        return 0;
    }
    if passed_count == total_count {
        return max_points;
    }
    (max_points as u64 * passed_count as u64 / total_count as u64) as u32
}

/// Latest final submission per problem, in first-seen problem order. Later
/// rows win ties, matching the append-only submission list.
fn latest_per_problem(submissions: &[Submission]) -> Vec<&Submission> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut latest: HashMap<Uuid, &Submission> = HashMap::new();

    for submission in submissions {
        match latest.get(&submission.problem_id) {
            Some(existing) if existing.created_at > submission.created_at => {}
            _ => {
                if latest.insert(submission.problem_id, submission).is_none() {
                    order.push(submission.problem_id);
                }
            }
        }
    }

    order.into_iter().filter_map(|id| latest.remove(&id)).collect()
}

/// Recompute and store the session total. Returns the new total.
pub async fn recompute_session_score(
    store: &dyn ExamStore,
    session_id: Uuid,
    exam_id: Uuid,
) -> Result<u32, ExamError> {
    let finals = store.final_submissions(session_id).await?;
    let exam_problems = store.exam_problems(exam_id).await?;

    let points_by_problem: HashMap<Uuid, u32> = exam_problems
        .iter()
        .map(|ep| (ep.problem_id, ep.points))
        .collect();

    let total: u32 = latest_per_problem(&finals)
        .into_iter()
        .filter(|s| s.status == SubmissionStatus::Passed)
        .map(|s| points_by_problem.get(&s.problem_id).copied().unwrap_or(0))
        .sum();

    debug!(
        session_id = %session_id,
        final_submissions = finals.len(),
        total_score = total,
        "Session score recomputed"
    );

    store.update_session_score(session_id, total).await?;
    Ok(total)
}
