use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::progression::recorder::{decode_state, fetch_candidate};
use crate::progression::{hire, CandidateState};
use crate::state::AppState;

/// GET /api/candidates/:id — state plus the full round history.
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    Ok(Json(fetch_candidate(&state.db, id).await?))
}

/// POST /api/jobs/:id/candidates/:cid/hire
///
/// Explicit HR decision; the only way into the Hired state.
pub async fn handle_hire_candidate(
    State(state): State<AppState>,
    Path((_job_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CandidateRow>, AppError> {
    let candidate = fetch_candidate(&state.db, candidate_id).await?;
    let hired: CandidateState = hire(decode_state(&candidate)?)?;

    let updated = sqlx::query_as::<_, CandidateRow>(
        "UPDATE candidates SET state = $1 WHERE id = $2 RETURNING *",
    )
    .bind(hired.encode())
    .bind(candidate_id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(updated))
}
