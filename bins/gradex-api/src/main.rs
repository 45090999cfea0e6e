mod dataset;
mod handlers;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use gradex_common::store::MemoryStore;
use gradex_judge::{JudgeBackend, MockJudge, Orchestrator, SandboxClient};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Gradex API booting...");

    // Seed storage from the dataset file
    let dataset_path = std::env::var("DATASET_PATH")
        .unwrap_or_else(|_| "config/dataset.json".to_string());
    let store = MemoryStore::new();
    let seeded = dataset::ExamDataset::load(dataset_path.as_ref())
        .context("Failed to load exam dataset")?
        .seed(&store);
    info!(
        problems = seeded.problems,
        exams = seeded.exams,
        sessions = seeded.sessions,
        "Dataset loaded from {}",
        dataset_path
    );

    // Judge backend is selected once at startup, never per call
    let judge_mode = std::env::var("JUDGE_MODE").unwrap_or_else(|_| "mock".to_string());
    let judge: Arc<dyn JudgeBackend> = match judge_mode.as_str() {
        "sandbox" => {
            let judge_url = std::env::var("JUDGE_URL")
                .unwrap_or_else(|_| "http://localhost:2358".to_string());
            info!("Judge backend: remote sandbox at {}", judge_url);
            Arc::new(SandboxClient::new(judge_url))
        }
        "mock" => {
            info!("Judge backend: offline mock");
            Arc::new(MockJudge::new())
        }
        other => {
            anyhow::bail!("Invalid JUDGE_MODE '{}', expected 'mock' or 'sandbox'", other);
        }
    };

    let state = Arc::new(AppState {
        orchestrator: Arc::new(Orchestrator::new(store, judge)),
    });

    let app = routes::routes().with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
