//! Pipeline Normalizer — canonicalizes a client-submitted stage list into the
//! persisted pipeline shape. Pure transformation, no side effects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::job::Stage;
use crate::pipeline::catalog::{Difficulty, StageType};

pub const DEFAULT_THRESHOLD_SCORE: u32 = 60;
pub const DEFAULT_DAYS_AFTER_PREV: u32 = 3;

/// A raw stage descriptor as submitted by the client. Everything except the
/// stage type is optional and defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageInput {
    pub stage_type: Option<String>,
    /// Legacy clients send the catalog id here instead of `stage_type`.
    pub id: Option<String>,
    pub name: Option<String>,
    pub order: Option<u32>,
    pub difficulty: Option<String>,
    pub threshold_score: Option<u32>,
    pub days_after_prev: Option<u32>,
    /// ISO date string; unparseable values are treated as absent.
    pub scheduled_date: Option<String>,
}

/// Canonical output of normalization: the retained stages in pipeline order,
/// plus the stage-type strings that were not recognized and dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedPipeline {
    pub stages: Vec<Stage>,
    pub dropped: Vec<String>,
}

/// Normalizes a client-submitted stage list.
///
/// Unrecognized stage types are dropped and reported in `dropped` rather than
/// silently discarded. Retained stages get `order` from the supplied value or
/// their position among the retained stages (dropped entries leave no gap),
/// then the list is sorted by order; duplicate explicit order values are
/// rejected so the persisted pipeline always carries unique, strictly
/// increasing orders.
pub fn normalize_pipeline(input: &[StageInput]) -> Result<NormalizedPipeline, AppError> {
    let mut out = NormalizedPipeline::default();

    for (idx, item) in input.iter().enumerate() {
        let raw_type = item.stage_type.as_deref().or(item.id.as_deref());
        let Some(raw_type) = raw_type else {
            out.dropped.push(format!("(stage #{} missing type)", idx + 1));
            continue;
        };
        let Some(stage_type) = StageType::parse(raw_type) else {
            out.dropped.push(raw_type.to_string());
            continue;
        };

        let difficulty = item
            .difficulty
            .as_deref()
            .and_then(Difficulty::parse)
            .unwrap_or_default();

        let order = item.order.unwrap_or(out.stages.len() as u32 + 1);
        out.stages.push(Stage {
            stage_type,
            name: item.name.clone(),
            order,
            difficulty,
            threshold_score: item.threshold_score.unwrap_or(DEFAULT_THRESHOLD_SCORE),
            days_after_prev: item.days_after_prev.unwrap_or(DEFAULT_DAYS_AFTER_PREV),
            scheduled_date: item
                .scheduled_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        });
    }

    out.stages.sort_by_key(|s| s.order);
    for pair in out.stages.windows(2) {
        if pair[0].order == pair[1].order {
            return Err(AppError::Validation(format!(
                "duplicate stage order {}",
                pair[0].order
            )));
        }
    }

    Ok(out)
}
