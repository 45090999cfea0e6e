// HTTP route handlers for the Gradex API

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use gradex_common::error::ExamError;
use gradex_common::types::Language;
use gradex_judge::orchestrator::JudgeAttempt;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
    pub session_id: Uuid,
    pub problem_id: Uuid,
    pub language: Language,
    pub code: String,
}

impl From<AttemptRequest> for JudgeAttempt {
    fn from(req: AttemptRequest) -> Self {
        JudgeAttempt {
            session_id: req.session_id,
            problem_id: req.problem_id,
            language: req.language,
            code: req.code,
        }
    }
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

fn exam_error_response(err: ExamError) -> Response {
    match err {
        ExamError::SessionInvalid => error_body(
            StatusCode::BAD_REQUEST,
            "SESSION_INVALID",
            "Invalid or expired session",
        ),
        ExamError::SessionExpired => error_body(
            StatusCode::BAD_REQUEST,
            "SESSION_EXPIRED",
            "Exam time has expired",
        ),
        ExamError::ProblemNotFound => {
            error_body(StatusCode::NOT_FOUND, "PROBLEM_NOT_FOUND", "Problem not found")
        }
        ExamError::Validation(message) => {
            error_body(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", &message)
        }
        ExamError::Storage(message) => {
            error!(error = %message, "Storage failure");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
                "Internal server error",
            )
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    error_body(
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        &format!("Invalid input: {}", rejection.body_text()),
    )
}

/// POST /exam/run - judge candidate code against the visible test cases
pub async fn run_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AttemptRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    info!(
        session_id = %request.session_id,
        problem_id = %request.problem_id,
        language = %request.language,
        "Run requested"
    );

    match state.orchestrator.run_visible(request.into()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "status": "completed",
                "results": outcome.results,
                "passed_count": outcome.passed_count,
                "total_count": outcome.total_count,
            })),
        )
            .into_response(),
        Err(err) => exam_error_response(err),
    }
}

/// POST /exam/submit - judge all test cases and record a final submission
pub async fn submit_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AttemptRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    info!(
        session_id = %request.session_id,
        problem_id = %request.problem_id,
        language = %request.language,
        "Final submission requested"
    );

    match state.orchestrator.submit_final(request.into()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "status": "submitted",
                "all_passed": outcome.all_passed,
                "passed_count": outcome.passed_count,
                "total_count": outcome.total_count,
                "score": outcome.score,
                "max_score": outcome.max_score,
                "results": outcome.results,
            })),
        )
            .into_response(),
        Err(err) => exam_error_response(err),
    }
}

/// GET /health - liveness probe
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
