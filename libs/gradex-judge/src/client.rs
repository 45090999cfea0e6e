//! HTTP client for the remote execution sandbox.
//!
//! Wire protocol: submissions are created with
//! `POST /submissions?base64_encoded=true&wait=false` and fetched with
//! `GET /submissions/{token}?base64_encoded=true`. Source, stdin and
//! expected output travel base64-encoded to stay binary-safe. Any transport
//! failure, non-success HTTP status, or undecodable payload surfaces as
//! `SandboxUnavailable`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gradex_common::error::JudgeError;

use crate::backend::{JudgeBackend, JudgeOutcome, JudgeRequest};
use crate::poll::{poll_until_terminal, Delay, PollPolicy, TokioDelay};
use crate::verdict::status_description;

use async_trait::async_trait;

#[derive(Debug, Serialize)]
struct WireSubmission {
    source_code: String,
    language_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_output: Option<String>,
    cpu_time_limit: f64,
    memory_limit: u32,
}

#[derive(Debug, Deserialize)]
struct WireToken {
    token: String,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    id: u32,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    token: Option<String>,
    status: WireStatus,
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    /// Seconds, reported as a decimal string.
    time: Option<String>,
    memory: Option<u64>,
}

fn encode_submission(request: &JudgeRequest) -> WireSubmission {
    WireSubmission {
        source_code: BASE64.encode(&request.source_code),
        language_id: request.language_id,
        stdin: request.stdin.as_ref().map(|s| BASE64.encode(s)),
        expected_output: request.expected_output.as_ref().map(|s| BASE64.encode(s)),
        cpu_time_limit: request.cpu_time_limit_secs,
        memory_limit: request.memory_limit_kb,
    }
}

fn decode_field(field: &str, value: Option<String>) -> Result<Option<String>, JudgeError> {
    match value {
        None => Ok(None),
        Some(encoded) => {
            let bytes = BASE64
                .decode(encoded.trim())
                .map_err(|e| JudgeError::SandboxUnavailable(format!("bad {} payload: {}", field, e)))?;
            Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
        }
    }
}

fn decode_result(token: &str, wire: WireResult) -> Result<JudgeOutcome, JudgeError> {
    let status_text = wire
        .status
        .description
        .unwrap_or_else(|| status_description(wire.status.id).to_string());

    Ok(JudgeOutcome {
        token: wire.token.unwrap_or_else(|| token.to_string()),
        status_id: wire.status.id,
        status_text,
        stdout: decode_field("stdout", wire.stdout)?,
        stderr: decode_field("stderr", wire.stderr)?,
        compile_output: decode_field("compile_output", wire.compile_output)?,
        time: wire.time.and_then(|t| t.trim().parse::<f64>().ok()),
        memory_kb: wire.memory,
    })
}

/// Client for one sandbox deployment.
pub struct SandboxClient {
    http: Client,
    base_url: String,
    policy: PollPolicy,
    delay: Box<dyn Delay>,
}

impl SandboxClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_policy(base_url, PollPolicy::default())
    }

    pub fn with_policy(base_url: impl Into<String>, policy: PollPolicy) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            policy,
            delay: Box::new(TokioDelay),
        }
    }
}

#[async_trait]
impl JudgeBackend for SandboxClient {
    async fn submit(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        let url = format!(
            "{}/submissions?base64_encoded=true&wait=false",
            self.base_url
        );
        let body = encode_submission(request);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::SandboxUnavailable(format!("submit failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(JudgeError::SandboxUnavailable(format!(
                "submit failed: HTTP {}",
                response.status()
            )));
        }

        let wire: WireToken = response
            .json()
            .await
            .map_err(|e| JudgeError::SandboxUnavailable(format!("bad submit response: {}", e)))?;

        debug!(token = %wire.token, language_id = request.language_id, "Submission enqueued");
        Ok(wire.token)
    }

    async fn fetch_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
        let url = format!("{}/submissions/{}?base64_encoded=true", self.base_url, token);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| JudgeError::SandboxUnavailable(format!("fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(JudgeError::SandboxUnavailable(format!(
                "fetch failed: HTTP {}",
                response.status()
            )));
        }

        let wire: WireResult = response
            .json()
            .await
            .map_err(|e| JudgeError::SandboxUnavailable(format!("bad fetch response: {}", e)))?;

        decode_result(token, wire)
    }

    async fn await_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
        poll_until_terminal(self, token, self.policy, self.delay.as_ref()).await
    }
}
