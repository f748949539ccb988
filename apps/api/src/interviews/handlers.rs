use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evalqueue;
use crate::models::interview::HintEvent;
use crate::pipeline::catalog::StageType;
use crate::progression::begin_round;
use crate::progression::recorder::{decode_state, fetch_candidate, persist_state};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TokenRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub interview_id: Uuid,
    pub session_id: String,
    pub status: String,
    pub state: String,
}

/// POST /api/interviews/token
///
/// Upserts the scheduled interview for (candidate, job) and marks the
/// candidate as in the voice-interview round. The session id is handed to
/// the telephony provider by the client.
pub async fn handle_interview_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let job = crate::jobs::fetch_job(&state.db, req.job_id).await?;
    let stage = job
        .stage_of_type(StageType::VoiceInterview)
        .ok_or_else(|| {
            AppError::Validation(format!("Job {} has no voice_interview stage", job.id))
        })?;

    let candidate = fetch_candidate(&state.db, req.candidate_id).await?;
    let entered = begin_round(decode_state(&candidate)?, stage.order)?;

    let interview = crate::interviews::upsert_scheduled(&state.db, job.id, candidate.id).await?;
    persist_state(&state.db, candidate.id, &entered).await?;

    Ok(Json(TokenResponse {
        interview_id: interview.id,
        session_id: interview.session_id,
        status: interview.status,
        state: entered.encode(),
    }))
}

#[derive(Deserialize)]
pub struct ConcludeRequest {
    pub transcript: String,
    #[serde(default)]
    pub hints: Vec<HintEvent>,
}

#[derive(Serialize)]
pub struct ConcludeResponse {
    pub interview_id: Uuid,
    pub status: String,
    pub task_id: Uuid,
}

/// POST /api/interviews/:id/conclude
///
/// Stores the transcript, checkpoints an evaluation task, and hands it to
/// the worker. The response does not wait for scoring.
pub async fn handle_interview_conclude(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConcludeRequest>,
) -> Result<Json<ConcludeResponse>, AppError> {
    let interview =
        crate::interviews::conclude(&state.db, id, &req.transcript, &req.hints).await?;
    let task_id = evalqueue::insert_task(&state.db, interview.id).await?;
    state.eval_queue.enqueue(task_id);

    Ok(Json(ConcludeResponse {
        interview_id: interview.id,
        status: interview.status,
        task_id,
    }))
}
