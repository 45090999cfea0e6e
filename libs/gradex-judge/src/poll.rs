//! Bounded polling for asynchronous sandbox completion.
//!
//! The poll loop is the system's only timeout mechanism: it gives up after a
//! fixed attempt budget instead of blocking indefinitely. Sleeping goes
//! through the `Delay` trait so tests can count polls on a fake clock.

use std::time::Duration;

use async_trait::async_trait;

use gradex_common::error::JudgeError;

use crate::backend::{JudgeBackend, JudgeOutcome};
use crate::verdict::is_terminal;

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(500),
        }
    }
}

#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production delay backed by the tokio timer.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fetch `token` until a terminal status is observed, up to
/// `policy.max_attempts` fetches. Returns immediately on the first terminal
/// outcome; fails with `JudgingTimeout` once the budget is spent.
pub async fn poll_until_terminal<B: JudgeBackend + ?Sized>(
    backend: &B,
    token: &str,
    policy: PollPolicy,
    delay: &dyn Delay,
) -> Result<JudgeOutcome, JudgeError> {
    for attempt in 0..policy.max_attempts {
        let outcome = backend.fetch_result(token).await?;
        if is_terminal(outcome.status_id) {
            return Ok(outcome);
        }
        tracing::debug!(
            token = %token,
            attempt = attempt + 1,
            status_id = outcome.status_id,
            "Submission not terminal yet"
        );
        delay.sleep(policy.interval).await;
    }

    Err(JudgeError::JudgingTimeout {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::JudgeRequest;
    use crate::verdict::{STATUS_ACCEPTED, STATUS_PROCESSING};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Backend whose status turns terminal after a fixed number of fetches
    /// (never, if `terminal_after` is u32::MAX).
    struct ScriptedBackend {
        fetches: AtomicU32,
        terminal_after: u32,
    }

    impl ScriptedBackend {
        fn new(terminal_after: u32) -> Self {
            Self {
                fetches: AtomicU32::new(0),
                terminal_after,
            }
        }

        fn fetch_count(&self) -> u32 {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JudgeBackend for ScriptedBackend {
        async fn submit(&self, _request: &JudgeRequest) -> Result<String, JudgeError> {
            Ok("tok".to_string())
        }

        async fn fetch_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            let status_id = if n >= self.terminal_after {
                STATUS_ACCEPTED
            } else {
                STATUS_PROCESSING
            };
            Ok(JudgeOutcome {
                token: token.to_string(),
                status_id,
                status_text: String::new(),
                stdout: None,
                stderr: None,
                compile_output: None,
                time: None,
                memory_kb: None,
            })
        }

        async fn await_result(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
            poll_until_terminal(self, token, PollPolicy::default(), &NoopDelay::default()).await
        }
    }

    #[derive(Default)]
    struct NoopDelay {
        sleeps: AtomicU32,
    }

    #[async_trait]
    impl Delay for NoopDelay {
        async fn sleep(&self, _duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_returns_on_first_terminal_observation() {
        let backend = ScriptedBackend::new(3);
        let delay = NoopDelay::default();
        let outcome = poll_until_terminal(&backend, "tok", PollPolicy::default(), &delay)
            .await
            .unwrap();

        assert_eq!(outcome.status_id, STATUS_ACCEPTED);
        assert_eq!(backend.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_exact_attempt_budget() {
        let backend = ScriptedBackend::new(u32::MAX);
        let delay = NoopDelay::default();
        let policy = PollPolicy {
            max_attempts: 7,
            interval: Duration::from_millis(1),
        };

        let err = poll_until_terminal(&backend, "tok", policy, &delay)
            .await
            .unwrap_err();

        assert!(matches!(err, JudgeError::JudgingTimeout { attempts: 7 }));
        assert_eq!(backend.fetch_count(), 7);
        assert_eq!(delay.sleeps.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_immediate_terminal_needs_single_fetch() {
        let backend = ScriptedBackend::new(1);
        let delay = NoopDelay::default();
        poll_until_terminal(&backend, "tok", PollPolicy::default(), &delay)
            .await
            .unwrap();

        assert_eq!(backend.fetch_count(), 1);
        assert_eq!(delay.sleeps.load(Ordering::SeqCst), 0);
    }
}
