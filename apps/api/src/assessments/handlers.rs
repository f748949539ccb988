use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::types::Json as DbJson;
use uuid::Uuid;

use crate::assessments::grading::{grade_answers, SubmittedAnswer};
use crate::assessments::questions::{sample_questions, QuestionFilter};
use crate::assessments::runner::default_test_cases;
use crate::errors::AppError;
use crate::models::attempt::{AptitudeAttemptRow, CodingAttemptRow, CodingSubmission};
use crate::models::job::{JobRow, Stage};
use crate::models::question::PublicQuestion;
use crate::pipeline::catalog::StageType;
use crate::progression::begin_round;
use crate::progression::recorder::{
    decode_state, fetch_candidate, persist_state, settle_scored_round,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QuestionsQuery {
    pub limit: Option<i64>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub job_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<PublicQuestion>,
}

/// GET /api/aptitude/questions
pub async fn handle_sample_questions(
    State(state): State<AppState>,
    Query(q): Query<QuestionsQuery>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let filter = QuestionFilter {
        limit: q.limit,
        difficulty: q.difficulty,
        category: q.category,
        job_id: q.job_id,
    };
    let questions = sample_questions(&state.db, &filter).await?;
    Ok(Json(QuestionsResponse {
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct AptitudeSubmitRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
}

/// Score summary returned by both scoring stages.
#[derive(Serialize)]
pub struct ScoreSummary {
    pub round: u32,
    pub round_name: String,
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub passed: bool,
    pub state: String,
}

/// POST /api/aptitude/submit
///
/// Grades the answers, upserts the attempt in a single statement (concurrent
/// submissions resolve last-writer-wins), then routes the verdict through the
/// progression state machine.
pub async fn handle_aptitude_submit(
    State(state): State<AppState>,
    Json(req): Json<AptitudeSubmitRequest>,
) -> Result<Json<ScoreSummary>, AppError> {
    let job = crate::jobs::fetch_job(&state.db, req.job_id).await?;
    let stage = scoring_stage(&job, StageType::AptitudeTest)?.clone();
    // Resolve the candidate up front so an unknown id is a 404, not a
    // foreign-key failure on the upsert.
    fetch_candidate(&state.db, req.candidate_id).await?;

    let ids: Vec<Uuid> = req.answers.iter().map(|a| a.question_id).collect();
    let questions = crate::assessments::questions::fetch_by_ids(&state.db, &ids).await?;
    let summary = grade_answers(&questions, &req.answers);

    sqlx::query_as::<_, AptitudeAttemptRow>(
        r#"
        INSERT INTO aptitude_attempts
            (id, job_id, candidate_id, answers, total_score, max_score, percentage,
             completed_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
        ON CONFLICT (job_id, candidate_id) DO UPDATE
        SET answers = EXCLUDED.answers,
            total_score = EXCLUDED.total_score,
            max_score = EXCLUDED.max_score,
            percentage = EXCLUDED.percentage,
            completed_at = EXCLUDED.completed_at,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.job_id)
    .bind(req.candidate_id)
    .bind(DbJson(&summary.answers))
    .bind(summary.total_score)
    .bind(summary.max_score)
    .bind(summary.percentage)
    .fetch_one(&state.db)
    .await?;

    let settled = settle_scored_round(
        &state.db,
        req.candidate_id,
        &stage,
        job.total_rounds as u32,
        summary.percentage,
    )
    .await?;

    Ok(Json(ScoreSummary {
        round: stage.order,
        round_name: stage.display_name(),
        total_score: summary.total_score,
        max_score: summary.max_score,
        percentage: summary.percentage,
        passed: summary.percentage >= f64::from(stage.threshold_score),
        state: settled.encode(),
    }))
}

#[derive(Deserialize)]
pub struct CodingSubmitRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub code: String,
}

#[derive(Serialize)]
pub struct CodingSubmitResponse {
    pub passed_cases: u32,
    pub total_cases: u32,
    pub best_score: f64,
    pub percentage: f64,
    pub state: String,
}

/// POST /api/coding/submit
///
/// Runs the submission through the code runner and folds it into the attempt:
/// submissions accumulate, the best score so far is kept. The round is not
/// decided here — that happens on finish.
pub async fn handle_coding_submit(
    State(state): State<AppState>,
    Json(req): Json<CodingSubmitRequest>,
) -> Result<Json<CodingSubmitResponse>, AppError> {
    let job = crate::jobs::fetch_job(&state.db, req.job_id).await?;
    let stage = scoring_stage(&job, StageType::CodingChallenge)?.clone();
    // Resolve the candidate up front so an unknown id is a 404, not a
    // foreign-key failure on the upsert.
    let candidate = fetch_candidate(&state.db, req.candidate_id).await?;

    let cases = default_test_cases();
    let results = state.code_runner.run(&req.code, &cases).await?;
    let passed_cases = results.iter().filter(|r| r.passed).count() as u32;

    let submission = CodingSubmission {
        submitted_at: Utc::now(),
        code: req.code,
        passed_cases,
        total_cases: cases.len() as u32,
    };

    let attempt = sqlx::query_as::<_, CodingAttemptRow>(
        r#"
        INSERT INTO coding_attempts
            (id, job_id, candidate_id, submissions, total_score, max_score, percentage,
             updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        ON CONFLICT (job_id, candidate_id) DO UPDATE
        SET submissions = coding_attempts.submissions || EXCLUDED.submissions,
            total_score = GREATEST(coding_attempts.total_score, EXCLUDED.total_score),
            max_score = EXCLUDED.max_score,
            percentage = CASE
                WHEN EXCLUDED.max_score = 0 THEN 0
                ELSE GREATEST(coding_attempts.total_score, EXCLUDED.total_score)
                     * 100.0 / EXCLUDED.max_score
            END,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.job_id)
    .bind(req.candidate_id)
    .bind(DbJson(vec![submission]))
    .bind(f64::from(passed_cases))
    .bind(cases.len() as f64)
    .bind(if cases.is_empty() {
        0.0
    } else {
        f64::from(passed_cases) * 100.0 / cases.len() as f64
    })
    .fetch_one(&state.db)
    .await?;

    let entered = begin_round(decode_state(&candidate)?, stage.order)?;
    persist_state(&state.db, candidate.id, &entered).await?;

    Ok(Json(CodingSubmitResponse {
        passed_cases,
        total_cases: cases.len() as u32,
        best_score: attempt.total_score,
        percentage: attempt.percentage,
        state: entered.encode(),
    }))
}

#[derive(Deserialize)]
pub struct CodingFinishRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
}

/// POST /api/coding/finish
///
/// Stamps the attempt complete and propagates its best score through the
/// round-score recorder.
pub async fn handle_coding_finish(
    State(state): State<AppState>,
    Json(req): Json<CodingFinishRequest>,
) -> Result<Json<ScoreSummary>, AppError> {
    let job = crate::jobs::fetch_job(&state.db, req.job_id).await?;
    let stage = scoring_stage(&job, StageType::CodingChallenge)?.clone();

    let attempt = sqlx::query_as::<_, CodingAttemptRow>(
        r#"
        UPDATE coding_attempts
        SET completed_at = now(), updated_at = now()
        WHERE job_id = $1 AND candidate_id = $2
        RETURNING *
        "#,
    )
    .bind(req.job_id)
    .bind(req.candidate_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No coding attempt for candidate {} on job {}",
            req.candidate_id, req.job_id
        ))
    })?;

    let settled = settle_scored_round(
        &state.db,
        req.candidate_id,
        &stage,
        job.total_rounds as u32,
        attempt.percentage,
    )
    .await?;

    Ok(Json(ScoreSummary {
        round: stage.order,
        round_name: stage.display_name(),
        total_score: attempt.total_score,
        max_score: attempt.max_score,
        percentage: attempt.percentage,
        passed: attempt.percentage >= f64::from(stage.threshold_score),
        state: settled.encode(),
    }))
}

fn scoring_stage(job: &JobRow, stage_type: StageType) -> Result<&Stage, AppError> {
    job.stage_of_type(stage_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Job {} has no {} stage",
            job.id,
            stage_type.wire_name()
        ))
    })
}
