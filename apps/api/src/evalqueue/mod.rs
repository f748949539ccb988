//! Durable evaluation queue.
//!
//! Concluding an interview inserts a pending `evaluation_tasks` row and hands
//! the task id to an in-process worker. The row is the checkpoint: pending
//! tasks are re-enqueued at startup, so an evaluation accepted before a crash
//! still completes afterwards (at-least-once; `mark_evaluated`'s forward-only
//! guard absorbs the duplicate delivery).

use std::sync::Arc;

use sqlx::{FromRow, PgPool};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews;
use crate::interviews::evaluator::InterviewEvaluator;
use crate::pipeline::catalog::StageType;
use crate::progression::recorder::settle_scored_round;

const MAX_ATTEMPTS: i32 = 3;
const RETRY_BASE_MS: u64 = 500;

#[derive(Debug, Clone, FromRow)]
pub struct EvaluationTaskRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub status: String,
    pub attempts: i32,
}

/// Handle for submitting tasks to the worker. Cheap to clone; lives in
/// `AppState`.
#[derive(Clone)]
pub struct EvalQueue {
    tx: UnboundedSender<Uuid>,
}

impl EvalQueue {
    pub fn new() -> (EvalQueue, UnboundedReceiver<Uuid>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EvalQueue { tx }, rx)
    }

    /// Hands a checkpointed task to the worker. The task row already exists,
    /// so a dropped send only delays the work until the next startup
    /// recovery.
    pub fn enqueue(&self, task_id: Uuid) {
        if self.tx.send(task_id).is_err() {
            error!("Evaluation worker is gone; task {task_id} deferred to startup recovery");
        }
    }
}

/// Inserts the pending checkpoint row for an interview evaluation.
pub async fn insert_task(pool: &PgPool, interview_id: Uuid) -> Result<Uuid, AppError> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO evaluation_tasks (id, interview_id, status, attempts, created_at, updated_at)
        VALUES ($1, $2, 'pending', 0, now(), now())
        "#,
    )
    .bind(id)
    .bind(interview_id)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Re-enqueues every pending task. Called once at startup.
pub async fn recover_pending(pool: &PgPool, queue: &EvalQueue) -> Result<usize, AppError> {
    let ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM evaluation_tasks WHERE status = 'pending'")
            .fetch_all(pool)
            .await?;
    let count = ids.len();
    for id in ids {
        queue.enqueue(id);
    }
    if count > 0 {
        info!("Recovered {count} pending evaluation task(s)");
    }
    Ok(count)
}

pub struct WorkerDeps {
    pub db: PgPool,
    pub evaluator: Arc<dyn InterviewEvaluator>,
    pub queue: EvalQueue,
}

/// The single evaluation worker loop. Runs for the life of the process.
pub async fn run_worker(mut rx: UnboundedReceiver<Uuid>, deps: WorkerDeps) {
    info!("Evaluation worker started");
    while let Some(task_id) = rx.recv().await {
        if let Err(e) = process_task(&deps, task_id).await {
            if let Err(e) = handle_failure(&deps, task_id, &e.to_string()).await {
                error!("Could not record failure for task {task_id}: {e}");
            }
        }
    }
    info!("Evaluation worker stopped");
}

async fn process_task(deps: &WorkerDeps, task_id: Uuid) -> Result<(), AppError> {
    let task = sqlx::query_as::<_, EvaluationTaskRow>(
        "SELECT id, interview_id, status, attempts FROM evaluation_tasks WHERE id = $1",
    )
    .bind(task_id)
    .fetch_optional(&deps.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Evaluation task {task_id} not found")))?;

    if task.status != "pending" {
        return Ok(());
    }
    tracing::debug!("Processing evaluation task {} (attempt {})", task.id, task.attempts + 1);

    let interview = interviews::fetch_interview(&deps.db, task.interview_id).await?;
    let transcript = interview.transcript.clone().unwrap_or_default();
    let scores = deps.evaluator.evaluate(&transcript).await?;

    match interviews::mark_evaluated(&deps.db, interview.id, &scores).await {
        Ok(_) => {
            settle_interview_round(deps, &interview, scores.overall).await;
        }
        // Redelivery after a crash: the interview was already evaluated, so
        // only the checkpoint needs closing.
        Err(AppError::Validation(msg)) => {
            warn!("Task {task_id}: {msg}; treating as already evaluated");
        }
        Err(e) => return Err(e),
    }

    sqlx::query("UPDATE evaluation_tasks SET status = 'done', updated_at = now() WHERE id = $1")
        .bind(task_id)
        .execute(&deps.db)
        .await?;
    Ok(())
}

/// Records the voice-interview round score. A candidate already settled by
/// another route is logged, not retried — the evaluation itself succeeded.
async fn settle_interview_round(
    deps: &WorkerDeps,
    interview: &crate::models::interview::InterviewRow,
    overall: f64,
) {
    let result: Result<(), AppError> = async {
        let job = crate::jobs::fetch_job(&deps.db, interview.job_id).await?;
        let Some(stage) = job.stage_of_type(StageType::VoiceInterview) else {
            warn!(
                "Job {} has no voice_interview stage; interview {} scored but not recorded",
                job.id, interview.id
            );
            return Ok(());
        };
        settle_scored_round(
            &deps.db,
            interview.candidate_id,
            stage,
            job.total_rounds as u32,
            overall,
        )
        .await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        warn!(
            "Interview {} evaluated but round not recorded: {e}",
            interview.id
        );
    }
}

async fn handle_failure(deps: &WorkerDeps, task_id: Uuid, message: &str) -> Result<(), AppError> {
    let attempts: i32 = sqlx::query_scalar(
        r#"
        UPDATE evaluation_tasks
        SET attempts = attempts + 1, last_error = $2, updated_at = now()
        WHERE id = $1
        RETURNING attempts
        "#,
    )
    .bind(task_id)
    .bind(message)
    .fetch_one(&deps.db)
    .await?;

    if attempts >= MAX_ATTEMPTS {
        error!("Evaluation task {task_id} failed permanently after {attempts} attempts: {message}");
        sqlx::query(
            "UPDATE evaluation_tasks SET status = 'failed', updated_at = now() WHERE id = $1",
        )
        .bind(task_id)
        .execute(&deps.db)
        .await?;
        return Ok(());
    }

    warn!("Evaluation task {task_id} failed (attempt {attempts}): {message}; retrying");
    let backoff = RETRY_BASE_MS * 2u64.pow(attempts.max(1) as u32 - 1);
    tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
    deps.queue.enqueue(task_id);
    Ok(())
}
