//! Job persistence helpers shared by handlers and the evaluation worker.

pub mod handlers;

use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, Stage};
use crate::pipeline::scheduler;

pub async fn fetch_job(pool: &PgPool, id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

pub async fn list_jobs(pool: &PgPool) -> Result<Vec<JobRow>, AppError> {
    Ok(
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?,
    )
}

/// Runs the auto-scheduler over the job's pipeline and persists the dated
/// stages with `scheduling_done = true`.
pub async fn schedule_job(
    pool: &PgPool,
    job_id: Uuid,
    start_date: Option<NaiveDate>,
) -> Result<Vec<Stage>, AppError> {
    let job = fetch_job(pool, job_id).await?;
    if job.pipeline.0.is_empty() {
        return Err(AppError::NoPipelineDefined(format!(
            "Job {job_id} has no pipeline"
        )));
    }

    let start = start_date
        .unwrap_or_else(|| scheduler::default_start_date(Utc::now().date_naive()));
    let dated = scheduler::schedule_stages(&job.pipeline.0, start)?;

    sqlx::query(
        r#"
        UPDATE jobs
        SET pipeline = $1, start_date = $2, scheduling_done = true, updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(Json(&dated))
    .bind(start)
    .bind(job_id)
    .execute(pool)
    .await?;

    info!("Scheduled {} stage(s) for job {job_id} from {start}", dated.len());
    Ok(dated)
}
