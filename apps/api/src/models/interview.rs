use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::interviews::evaluator::InterviewScores;

pub const STATUS_SCHEDULED: &str = "Scheduled";
pub const STATUS_IN_PROGRESS: &str = "InProgress";
pub const STATUS_EVALUATED: &str = "Evaluated";

/// A hint surfaced to the candidate during a live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintEvent {
    pub at: DateTime<Utc>,
    pub hint: String,
}

/// One candidate's live-session record for a job.
///
/// Upsert key: (candidate_id, job_id, status = 'Scheduled'). Status moves
/// Scheduled → InProgress → Evaluated and never backward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: String,
    /// Voice/video session identifier handed to the telephony provider.
    pub session_id: String,
    pub transcript: Option<String>,
    pub hint_log: Json<Vec<HintEvent>>,
    pub scores: Option<Json<InterviewScores>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
