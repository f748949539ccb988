//! Question sampling for the aptitude round.

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::question::QuestionRow;

pub const DEFAULT_SAMPLE_LIMIT: i64 = 10;

#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub limit: Option<i64>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub job_id: Option<Uuid>,
}

/// Samples a randomized batch of questions matching the filter. Falls back to
/// a deterministic (insertion-ordered) query if the randomized one errors.
pub async fn sample_questions(
    pool: &PgPool,
    filter: &QuestionFilter,
) -> Result<Vec<QuestionRow>, AppError> {
    let limit = filter.limit.unwrap_or(DEFAULT_SAMPLE_LIMIT).clamp(1, 100);

    match fetch_batch(pool, filter, limit, "RANDOM()").await {
        Ok(rows) => Ok(rows),
        Err(e) => {
            warn!("Randomized question sample failed ({e}); using ordered fallback");
            fetch_batch(pool, filter, limit, "created_at").await.map_err(AppError::from)
        }
    }
}

async fn fetch_batch(
    pool: &PgPool,
    filter: &QuestionFilter,
    limit: i64,
    order_by: &str,
) -> Result<Vec<QuestionRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT * FROM questions
        WHERE ($1::text IS NULL OR difficulty = $1)
          AND ($2::text IS NULL OR category = $2)
          AND ($3::uuid IS NULL OR job_id = $3 OR job_id IS NULL)
        ORDER BY {order_by}
        LIMIT $4
        "#
    );
    sqlx::query_as::<_, QuestionRow>(&sql)
        .bind(filter.difficulty.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.job_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Fetches the exact questions a submission references.
pub async fn fetch_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<QuestionRow>, AppError> {
    Ok(
        sqlx::query_as::<_, QuestionRow>("SELECT * FROM questions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?,
    )
}
