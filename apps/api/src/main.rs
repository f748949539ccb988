mod assessments;
mod config;
mod db;
mod errors;
mod evalqueue;
mod interviews;
mod jobs;
mod models;
mod pipeline;
mod progression;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessments::runner::FixedOutcomeRunner;
use crate::config::Config;
use crate::db::create_pool;
use crate::evalqueue::{EvalQueue, WorkerDeps};
use crate::interviews::evaluator::{HttpEvaluator, InterviewEvaluator, RubricEvaluator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("hireflow_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Select the interview evaluator backend
    let evaluator: Arc<dyn InterviewEvaluator> = match &config.evaluator_url {
        Some(url) => {
            info!("Interview evaluator: external service at {url}");
            Arc::new(HttpEvaluator::new(
                url.clone(),
                config.evaluator_api_key.clone(),
            ))
        }
        None => {
            info!("Interview evaluator: built-in rubric");
            Arc::new(RubricEvaluator)
        }
    };

    // Coding grader stub until a sandboxed runner backend lands
    let code_runner = Arc::new(FixedOutcomeRunner);

    // Start the durable evaluation worker and replay unfinished tasks
    let (eval_queue, rx) = EvalQueue::new();
    tokio::spawn(evalqueue::run_worker(
        rx,
        WorkerDeps {
            db: db.clone(),
            evaluator: evaluator.clone(),
            queue: eval_queue.clone(),
        },
    ));
    evalqueue::recover_pending(&db, &eval_queue).await?;

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        code_runner,
        evaluator,
        eval_queue,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
