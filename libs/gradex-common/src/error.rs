use thiserror::Error;

/// Failures talking to a judge backend. Inside a run/submit batch these are
/// converted into failed result rows rather than aborting the batch.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    #[error("judging timed out after {attempts} polls")]
    JudgingTimeout { attempts: u32 },
}

/// Failures that invalidate a whole run/submit request. Raised to the HTTP
/// boundary before any judging happens.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("invalid or expired session")]
    SessionInvalid,

    #[error("exam time has expired")]
    SessionExpired,

    #[error("problem not found")]
    ProblemNotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}
