//! Judge Backend - Abstraction over Code Execution
//!
//! **Core Responsibility:**
//! One capability interface for submitting candidate code and retrieving its
//! outcome, implemented by both the real sandbox client and the offline mock.
//!
//! **Critical Architectural Boundary:**
//! - Backends know HOW to execute (remote sandbox, simulation)
//! - Backends do NOT know scoring rules or hidden-test semantics
//! - Backends return raw outcomes for the verdict layer to normalize
//!
//! The implementation is selected once at process start from configuration,
//! never per call, so behavior stays deterministic within a process lifetime.

use async_trait::async_trait;

use gradex_common::error::JudgeError;

pub const DEFAULT_CPU_TIME_LIMIT_SECS: f64 = 2.0;
pub const DEFAULT_MEMORY_LIMIT_KB: u32 = 262_144;

/// One (source, language, stdin, expected-output) unit of work.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: Option<String>,
    pub expected_output: Option<String>,
    pub cpu_time_limit_secs: f64,
    pub memory_limit_kb: u32,
}

impl JudgeRequest {
    pub fn new(
        source_code: impl Into<String>,
        language_id: u32,
        stdin: Option<String>,
        expected_output: Option<String>,
    ) -> Self {
        Self {
            source_code: source_code.into(),
            language_id,
            stdin,
            expected_output,
            cpu_time_limit_secs: DEFAULT_CPU_TIME_LIMIT_SECS,
            memory_limit_kb: DEFAULT_MEMORY_LIMIT_KB,
        }
    }
}

/// Raw outcome as reported by a backend, before normalization.
#[derive(Debug, Clone)]
pub struct JudgeOutcome {
    pub token: String,
    pub status_id: u32,
    pub status_text: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    /// Wall time in seconds, as reported by the sandbox.
    pub time: Option<f64>,
    pub memory_kb: Option<u64>,
}

#[async_trait]
pub trait JudgeBackend: Send + Sync {
    /// Enqueue one unit of work; returns the submission token.
    async fn submit(&self, request: &JudgeRequest) -> Result<String, JudgeError>;

    /// Fetch the current outcome for a token. May be non-terminal.
    async fn fetch_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError>;

    /// Poll `fetch_result` until a terminal status is observed.
    async fn await_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError>;

    /// Convenience: submit then await.
    async fn run(&self, request: &JudgeRequest) -> Result<JudgeOutcome, JudgeError> {
        let token = self.submit(request).await?;
        self.await_result(&token).await
    }
}
