//! Mock Judge - Offline Sandbox Simulation
//!
//! **Core Responsibility:**
//! Stand in for the remote sandbox with the same `JudgeBackend` contract,
//! for environments without sandbox infrastructure.
//!
//! **Simulation Rules (fixed priority order):**
//! 1. Forced compile-error marker or literal "syntax error" → Compilation Error
//! 2. Forced runtime-error marker or an unconditional raise → Runtime Error
//! 3. Forced timeout marker or an unconditional infinite loop → Time Limit
//! 4. Otherwise extract a printed literal (first matching language pattern),
//!    let a `MOCK_OUTPUT:` directive override it, or echo the first stdin
//!    line when the source reads stdin; compare trimmed output against the
//!    expected text for Accepted vs Wrong Answer.
//!
//! Simulated runs carry jittered time/memory so telemetry is not uniform.
//! Pending submissions are instance-owned, so independent `MockJudge` values
//! never share state.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::Rng;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use gradex_common::error::JudgeError;

use crate::backend::{JudgeBackend, JudgeOutcome, JudgeRequest};
use crate::verdict::{
    status_description, STATUS_ACCEPTED, STATUS_COMPILATION_ERROR, STATUS_RUNTIME_ERROR_NZEC,
    STATUS_TIME_LIMIT_EXCEEDED, STATUS_WRONG_ANSWER,
};

pub const FORCE_COMPILE_ERROR: &str = "FORCE_COMPILE_ERROR";
pub const FORCE_RUNTIME_ERROR: &str = "FORCE_RUNTIME_ERROR";
pub const FORCE_TIMEOUT: &str = "FORCE_TIMEOUT";

lazy_static! {
    /// Print-literal extractors, checked in this order; first match wins.
    static ref PRINT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"print\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap(),
        Regex::new(r#"System\.out\.println\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap(),
        Regex::new(r#"cout\s*<<\s*["']([^"']+)["']"#).unwrap(),
        Regex::new(r#"fmt\.Println\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap(),
    ];
    static ref MOCK_OUTPUT_DIRECTIVE: Regex =
        Regex::new(r"MOCK_OUTPUT:[ \t]*([^\n]+)").unwrap();
}

#[derive(Clone)]
struct PendingSubmission {
    source_code: String,
    stdin: Option<String>,
    expected_output: Option<String>,
}

/// Deterministic, pattern-based judge simulator.
#[derive(Default)]
pub struct MockJudge {
    pending: Mutex<HashMap<String, PendingSubmission>>,
}

impl MockJudge {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_token() -> String {
        format!("mock-{}", Uuid::new_v4())
    }

    fn outcome(token: &str, status_id: u32) -> JudgeOutcome {
        JudgeOutcome {
            token: token.to_string(),
            status_id,
            status_text: status_description(status_id).to_string(),
            stdout: None,
            stderr: None,
            compile_output: None,
            time: None,
            memory_kb: None,
        }
    }

    fn simulate(token: &str, submission: &PendingSubmission) -> JudgeOutcome {
        let source = submission.source_code.as_str();

        if source.contains(FORCE_COMPILE_ERROR) || source.contains("syntax error") {
            let mut outcome = Self::outcome(token, STATUS_COMPILATION_ERROR);
            outcome.compile_output = Some("Mock compilation error: Invalid syntax".to_string());
            return outcome;
        }

        if source.contains(FORCE_RUNTIME_ERROR) || source.contains("raise Exception") {
            let mut outcome = Self::outcome(token, STATUS_RUNTIME_ERROR_NZEC);
            outcome.stderr = Some("Mock runtime error: Exception raised".to_string());
            outcome.time = Some(0.05);
            outcome.memory_kb = Some(1024);
            return outcome;
        }

        if source.contains(FORCE_TIMEOUT) || source.contains("while True") {
            let mut outcome = Self::outcome(token, STATUS_TIME_LIMIT_EXCEEDED);
            outcome.time = Some(2.0);
            outcome.memory_kb = Some(2048);
            return outcome;
        }

        let mut simulated = PRINT_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(source))
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();

        if let Some(caps) = MOCK_OUTPUT_DIRECTIVE.captures(source) {
            simulated = caps[1].trim().to_string();
        }

        if let Some(stdin) = submission.stdin.as_deref() {
            if source.contains("input()") {
                simulated = stdin.trim().lines().next().unwrap_or_default().to_string();
            }
        }

        // No expected output supplied counts as a match.
        let matches = submission
            .expected_output
            .as_deref()
            .map(|expected| simulated.trim() == expected.trim())
            .unwrap_or(true);

        let status_id = if matches { STATUS_ACCEPTED } else { STATUS_WRONG_ANSWER };
        let mut rng = rand::thread_rng();
        let mut outcome = Self::outcome(token, status_id);
        outcome.stdout = Some(format!("{}\n", simulated));
        outcome.time = Some(rng.gen_range(10..=110) as f64 / 1000.0);
        outcome.memory_kb = Some(rng.gen_range(1000..6000));
        outcome
    }

    async fn processing_delay(range_ms: std::ops::Range<u64>) {
        let millis = rand::thread_rng().gen_range(range_ms);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

#[async_trait]
impl JudgeBackend for MockJudge {
    async fn submit(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        let token = Self::generate_token();
        self.pending.lock().insert(
            token.clone(),
            PendingSubmission {
                source_code: request.source_code.clone(),
                stdin: request.stdin.clone(),
                expected_output: request.expected_output.clone(),
            },
        );

        debug!(token = %token, "Mock submission enqueued");
        Self::processing_delay(50..150).await;
        Ok(token)
    }

    async fn fetch_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
        // Token is consumed on fetch; an unknown token yields a generic
        // accepted outcome rather than an error.
        let submission = self.pending.lock().remove(token);

        let Some(submission) = submission else {
            let mut outcome = Self::outcome(token, STATUS_ACCEPTED);
            outcome.stdout = Some("Mock output\n".to_string());
            outcome.time = Some(0.05);
            outcome.memory_kb = Some(2048);
            return Ok(outcome);
        };

        Self::processing_delay(100..300).await;
        Ok(Self::simulate(token, &submission))
    }

    /// Nothing actually queues, so the first fetch is already terminal.
    async fn await_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
        self.fetch_result(token).await
    }
}
