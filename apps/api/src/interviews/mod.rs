//! Interview lifecycle: Scheduled → InProgress → Evaluated, never backward.

pub mod evaluator;
pub mod handlers;

use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interviews::evaluator::InterviewScores;
use crate::models::interview::{
    HintEvent, InterviewRow, STATUS_EVALUATED, STATUS_IN_PROGRESS, STATUS_SCHEDULED,
};

/// Upserts the (candidate, job, Scheduled) interview. Repeated token requests
/// for the same pair return the same session instead of stacking records.
pub async fn upsert_scheduled(
    pool: &PgPool,
    job_id: Uuid,
    candidate_id: Uuid,
) -> Result<InterviewRow, AppError> {
    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews
            (id, job_id, candidate_id, status, session_id, hint_log, created_at, updated_at)
        VALUES ($1, $2, $3, 'Scheduled', $4, '[]'::jsonb, now(), now())
        ON CONFLICT (job_id, candidate_id) WHERE status = 'Scheduled'
        DO UPDATE SET updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(candidate_id)
    .bind(Uuid::new_v4().to_string())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn fetch_interview(pool: &PgPool, id: Uuid) -> Result<InterviewRow, AppError> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
}

/// Stores the transcript and hint log and moves Scheduled → InProgress.
/// The WHERE guard is what enforces forward-only status.
pub async fn conclude(
    pool: &PgPool,
    id: Uuid,
    transcript: &str,
    hints: &[HintEvent],
) -> Result<InterviewRow, AppError> {
    let updated = sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews
        SET status = $2, transcript = $3, hint_log = hint_log || $4, updated_at = now()
        WHERE id = $1 AND status = $5
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(STATUS_IN_PROGRESS)
    .bind(transcript)
    .bind(Json(hints))
    .bind(STATUS_SCHEDULED)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(row) => Ok(row),
        None => {
            // Distinguish a missing interview from one already past Scheduled.
            let existing = fetch_interview(pool, id).await?;
            Err(AppError::Validation(format!(
                "Interview {id} is already '{}' and cannot be concluded again",
                existing.status
            )))
        }
    }
}

/// Stores scores and moves InProgress → Evaluated.
pub async fn mark_evaluated(
    pool: &PgPool,
    id: Uuid,
    scores: &InterviewScores,
) -> Result<InterviewRow, AppError> {
    let updated = sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews
        SET status = $2, scores = $3, updated_at = now()
        WHERE id = $1 AND status = $4
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(STATUS_EVALUATED)
    .bind(Json(scores))
    .bind(STATUS_IN_PROGRESS)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::Validation(format!("Interview {id} is not awaiting evaluation"))
    })?;

    info!(
        "Interview {id} evaluated (overall {:.1})",
        scores.overall
    );
    Ok(updated)
}
