use std::sync::Arc;

use sqlx::PgPool;

use crate::assessments::runner::CodeRunner;
use crate::config::Config;
use crate::evalqueue::EvalQueue;
use crate::interviews::evaluator::InterviewEvaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable coding grader. Default: FixedOutcomeRunner (deterministic
    /// stub); real sandboxed execution is a drop-in behind the same trait.
    pub code_runner: Arc<dyn CodeRunner>,
    /// Interview scorer. RubricEvaluator by default; HttpEvaluator when
    /// EVALUATOR_URL is set.
    pub evaluator: Arc<dyn InterviewEvaluator>,
    /// Handle into the durable evaluation queue.
    pub eval_queue: EvalQueue,
}
