use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::pipeline::catalog::{Difficulty, StageType};

/// One step of a job's hiring pipeline, embedded in `jobs.pipeline` (jsonb).
///
/// Invariant: within a pipeline, `order` values are unique and strictly
/// increasing. The normalizer is the only producer of `Stage` sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub stage_type: StageType,
    /// Optional display name; falls back to the catalog label.
    pub name: Option<String>,
    pub order: u32,
    pub difficulty: Difficulty,
    /// Minimum percentage a candidate must score to pass this stage.
    pub threshold_score: u32,
    /// Calendar-day offset from the previous stage's computed date.
    pub days_after_prev: u32,
    /// HR-pinned date; overrides the scheduler's computed date for this
    /// stage only.
    pub scheduled_date: Option<NaiveDate>,
}

impl Stage {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.stage_type.label().to_string())
    }
}

/// A hiring requisition. Soft-deleted via `status = 'Closed'`, never removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub skills: Vec<String>,
    pub created_by: Option<Uuid>,
    /// Active | Paused | Closed
    pub status: String,
    pub pipeline: Json<Vec<Stage>>,
    pub submission_deadline: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub scheduling_done: bool,
    pub shortlist_size: i32,
    /// Always equals `pipeline` length; kept denormalized for dashboards.
    pub total_rounds: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    /// Finds the pipeline stage of the given type, if any.
    pub fn stage_of_type(&self, stage_type: StageType) -> Option<&Stage> {
        self.pipeline.0.iter().find(|s| s.stage_type == stage_type)
    }
}
