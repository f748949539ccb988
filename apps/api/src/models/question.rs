use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A multiple-choice aptitude question. `job_id` scopes job-specific question
/// banks; NULL means the shared pool.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub category: String,
    /// Easy | Medium | Hard (stored as text; unknown values grade as Medium).
    pub difficulty: String,
    pub prompt: String,
    pub options: Json<Vec<String>>,
    pub correct_option: i32,
    pub created_at: DateTime<Utc>,
}

/// Candidate-facing view of a question. Never includes `correct_option`.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub category: String,
    pub difficulty: String,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<QuestionRow> for PublicQuestion {
    fn from(row: QuestionRow) -> Self {
        PublicQuestion {
            id: row.id,
            category: row.category,
            difficulty: row.difficulty,
            prompt: row.prompt,
            options: row.options.0,
        }
    }
}
