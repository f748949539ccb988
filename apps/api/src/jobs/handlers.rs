use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json as DbJson;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, Stage};
use crate::pipeline::links::build_assessment_link;
use crate::pipeline::normalizer::{normalize_pipeline, StageInput};
use crate::state::AppState;

const JOB_STATUSES: [&str; 3] = ["Active", "Paused", "Closed"];

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub pipeline: Vec<StageInput>,
    pub submission_deadline: Option<NaiveDate>,
    pub shortlist_size: Option<i32>,
}

/// Job payload plus the stage-type strings the normalizer dropped, so the
/// caller can see what it lost.
#[derive(Serialize)]
pub struct JobResponse {
    pub job: JobRow,
    pub dropped: Vec<String>,
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let normalized = normalize_pipeline(&req.pipeline)?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (id, title, description, skills, created_by, status, pipeline,
             submission_deadline, scheduling_done, shortlist_size, total_rounds,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'Active', $6, $7, false, $8, $9, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.title.trim())
    .bind(req.description)
    .bind(&req.skills)
    .bind(req.created_by)
    .bind(DbJson(&normalized.stages))
    .bind(req.submission_deadline)
    .bind(req.shortlist_size.unwrap_or(10))
    .bind(normalized.stages.len() as i32)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(JobResponse {
        job,
        dropped: normalized.dropped,
    }))
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRow>,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = crate::jobs::list_jobs(&state.db).await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(crate::jobs::fetch_job(&state.db, id).await?))
}

/// Distinguishes an absent field (keep the stored value) from an explicit
/// `null` (clear it). Plain `Option` collapses both into `None`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub skills: Option<Vec<String>>,
    pub status: Option<String>,
    pub pipeline: Option<Vec<StageInput>>,
    #[serde(default, deserialize_with = "double_option")]
    pub submission_deadline: Option<Option<NaiveDate>>,
    pub shortlist_size: Option<i32>,
}

/// PUT /api/jobs/:id
///
/// A pipeline update re-normalizes and resets `scheduling_done`; the next
/// schedule run re-dates the new stages.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    let existing = crate::jobs::fetch_job(&state.db, id).await?;

    if let Some(status) = &req.status {
        if !JOB_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!("unknown status '{status}'")));
        }
    }

    let (pipeline, dropped, scheduling_done) = match &req.pipeline {
        Some(input) => {
            let normalized = normalize_pipeline(input)?;
            (normalized.stages, normalized.dropped, false)
        }
        None => (existing.pipeline.0.clone(), vec![], existing.scheduling_done),
    };

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET title = $1, description = $2, skills = $3, status = $4, pipeline = $5,
            submission_deadline = $6, shortlist_size = $7, total_rounds = $8,
            scheduling_done = $9, updated_at = now()
        WHERE id = $10
        RETURNING *
        "#,
    )
    .bind(req.title.unwrap_or(existing.title))
    .bind(req.description.unwrap_or(existing.description))
    .bind(req.skills.unwrap_or(existing.skills))
    .bind(req.status.unwrap_or(existing.status))
    .bind(DbJson(&pipeline))
    .bind(req.submission_deadline.unwrap_or(existing.submission_deadline))
    .bind(req.shortlist_size.unwrap_or(existing.shortlist_size))
    .bind(pipeline.len() as i32)
    .bind(scheduling_done)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(JobResponse { job, dropped }))
}

/// DELETE /api/jobs/:id — soft close; job documents are never removed.
pub async fn handle_close_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = sqlx::query_as::<_, JobRow>(
        "UPDATE jobs SET status = 'Closed', updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub start_date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub pipeline: Vec<Stage>,
}

/// POST /api/jobs/:id/schedule
pub async fn handle_schedule_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let pipeline = crate::jobs::schedule_job(&state.db, id, req.start_date).await?;
    Ok(Json(ScheduleResponse { pipeline }))
}

#[derive(Deserialize)]
pub struct PipelineQuery {
    pub candidate_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct StageView {
    #[serde(flatten)]
    pub stage: Stage,
    /// Candidate-facing link, present when a candidate id was supplied and
    /// the stage has a client route.
    pub assessment_link: Option<String>,
}

#[derive(Serialize)]
pub struct PipelineResponse {
    pub pipeline: Vec<StageView>,
    pub scheduling_done: bool,
    pub start_date: Option<NaiveDate>,
    pub total_rounds: i32,
}

/// GET /api/jobs/:id/pipeline
pub async fn handle_get_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<PipelineQuery>,
) -> Result<Json<PipelineResponse>, AppError> {
    let job = crate::jobs::fetch_job(&state.db, id).await?;

    let pipeline = job
        .pipeline
        .0
        .iter()
        .map(|stage| StageView {
            assessment_link: q.candidate_id.and_then(|candidate_id| {
                build_assessment_link(
                    &state.config.frontend_url,
                    stage.stage_type,
                    job.id,
                    candidate_id,
                    Some(stage.order),
                )
            }),
            stage: stage.clone(),
        })
        .collect();

    Ok(Json(PipelineResponse {
        pipeline,
        scheduling_done: job.scheduling_done,
        start_date: job.start_date,
        total_rounds: job.total_rounds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_absent_field_keeps_stored_value() {
        let req: UpdateJobRequest = serde_json::from_str(r#"{"title": "Backend Engineer"}"#).unwrap();
        assert_eq!(req.description, None);
        assert_eq!(req.submission_deadline, None);
    }

    #[test]
    fn test_update_request_explicit_null_clears_field() {
        let req: UpdateJobRequest =
            serde_json::from_str(r#"{"description": null, "submission_deadline": null}"#).unwrap();
        assert_eq!(req.description, Some(None));
        assert_eq!(req.submission_deadline, Some(None));
    }

    #[test]
    fn test_update_request_value_sets_field() {
        let req: UpdateJobRequest =
            serde_json::from_str(r#"{"description": "Remote", "submission_deadline": "2026-10-01"}"#)
                .unwrap();
        assert_eq!(req.description, Some(Some("Remote".to_string())));
        assert_eq!(
            req.submission_deadline,
            Some(NaiveDate::from_ymd_opt(2026, 10, 1))
        );
    }
}
