use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One entry in a candidate's per-round result history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub round_name: String,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A person pursuing one or more jobs. Never deleted; the round history only
/// accumulates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Serialized progression state, e.g. "applied" or "round_passed:2".
    pub state: String,
    pub round_history: Json<Vec<RoundResult>>,
    pub best_score: Option<f64>,
    pub shortlist_rank: Option<i32>,
    pub created_at: DateTime<Utc>,
}
