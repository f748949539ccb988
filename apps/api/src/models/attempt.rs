use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One graded answer inside an aptitude attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,
    pub selected_option: i32,
    pub correct: bool,
    pub weight: u32,
}

/// A candidate's aptitude attempt for one job. Unique on
/// (job_id, candidate_id); each submission upserts the whole row in a single
/// statement — concurrent submissions resolve last-writer-wins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AptitudeAttemptRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub answers: Json<Vec<AnswerRecord>>,
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// One code submission inside a coding attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingSubmission {
    pub submitted_at: DateTime<Utc>,
    pub code: String,
    pub passed_cases: u32,
    pub total_cases: u32,
}

/// A candidate's coding attempt for one job. Submissions accumulate until an
/// explicit finish stamps `completed_at` and propagates the score.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CodingAttemptRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub submissions: Json<Vec<CodingSubmission>>,
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
