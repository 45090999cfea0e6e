//! Code-execution judging core.
//!
//! Candidate source is sent to a sandboxed remote execution service (or an
//! offline mock with the same contract), polled to completion, normalized
//! into a small verdict taxonomy, and aggregated into scored submissions.

pub mod backend;
pub mod client;
pub mod mock;
pub mod orchestrator;
pub mod poll;
pub mod scoring;
pub mod verdict;


pub use backend::{JudgeBackend, JudgeOutcome, JudgeRequest};
pub use client::SandboxClient;
pub use mock::MockJudge;
pub use orchestrator::Orchestrator;
