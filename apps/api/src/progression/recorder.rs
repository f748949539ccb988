//! Round-Score Recorder — appends a stage result to a candidate's history,
//! updates rank-relevant aggregates, and persists the new progression state.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateRow, RoundResult};
use crate::progression::CandidateState;

/// A scored round about to be recorded.
#[derive(Debug, Clone)]
pub struct RoundScore {
    pub round: u32,
    pub round_name: String,
    pub score: f64,
}

/// Returns the history with the new result appended. Pure; the history never
/// shrinks.
pub fn appended_history(
    history: &[RoundResult],
    entry: &RoundScore,
    recorded_at: DateTime<Utc>,
) -> Vec<RoundResult> {
    let mut out = history.to_vec();
    out.push(RoundResult {
        round: entry.round,
        round_name: entry.round_name.clone(),
        score: entry.score,
        recorded_at,
    });
    out
}

pub async fn fetch_candidate(pool: &PgPool, id: Uuid) -> Result<CandidateRow, AppError> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

/// Appends the round result and persists history, best score, and state in
/// one UPDATE.
pub async fn record_round_score(
    pool: &PgPool,
    candidate: &CandidateRow,
    entry: RoundScore,
    new_state: &CandidateState,
) -> Result<CandidateRow, AppError> {
    let history = appended_history(&candidate.round_history.0, &entry, Utc::now());
    let best_score = candidate
        .best_score
        .map_or(entry.score, |b| b.max(entry.score));

    let updated = sqlx::query_as::<_, CandidateRow>(
        r#"
        UPDATE candidates
        SET round_history = $1, best_score = $2, state = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(Json(&history))
    .bind(best_score)
    .bind(new_state.encode())
    .bind(candidate.id)
    .fetch_one(pool)
    .await?;

    info!(
        "Recorded round {} ({}) score {:.1} for candidate {} → {}",
        entry.round,
        entry.round_name,
        entry.score,
        candidate.id,
        new_state.encode()
    );
    Ok(updated)
}

/// Re-derives shortlist ranks across all shortlisted candidates, best score
/// first.
pub async fn recompute_shortlist_ranks(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE candidates c
        SET shortlist_rank = r.rank
        FROM (
            SELECT id, ROW_NUMBER() OVER (ORDER BY best_score DESC NULLS LAST) AS rank
            FROM candidates
            WHERE state = 'shortlisted'
        ) r
        WHERE c.id = r.id
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn persist_state(
    pool: &PgPool,
    candidate_id: Uuid,
    state: &CandidateState,
) -> Result<(), AppError> {
    sqlx::query("UPDATE candidates SET state = $1 WHERE id = $2")
        .bind(state.encode())
        .bind(candidate_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Routes a scored round through the single progression transition function:
/// decide pass/fail against the stage threshold, apply the rejection policy,
/// record the result, and refresh shortlist ranks when the candidate lands
/// on the shortlist. Every stage route settles through here.
pub async fn settle_scored_round(
    pool: &PgPool,
    candidate_id: Uuid,
    stage: &crate::models::job::Stage,
    total_rounds: u32,
    percentage: f64,
) -> Result<CandidateState, AppError> {
    let candidate = fetch_candidate(pool, candidate_id).await?;
    let current = decode_state(&candidate)?;
    let passed = percentage >= f64::from(stage.threshold_score);
    let next = crate::progression::advance(current, stage.order, passed, total_rounds)?;
    let settled = crate::progression::apply_rejection_policy(next);

    record_round_score(
        pool,
        &candidate,
        RoundScore {
            round: stage.order,
            round_name: stage.display_name(),
            score: percentage,
        },
        &settled,
    )
    .await?;

    if settled == CandidateState::Shortlisted {
        recompute_shortlist_ranks(pool).await?;
    }
    Ok(settled)
}

/// Decodes the persisted state column, failing loudly on corruption rather
/// than guessing.
pub fn decode_state(candidate: &CandidateRow) -> Result<CandidateState, AppError> {
    CandidateState::decode(&candidate.state).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "candidate {} has unrecognized state '{}'",
            candidate.id,
            candidate.state
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(round: u32, score: f64) -> RoundResult {
        RoundResult {
            round,
            round_name: format!("Round {round}"),
            score,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_grows_history_by_one() {
        let history = vec![result(1, 70.0), result(2, 82.5)];
        let entry = RoundScore {
            round: 3,
            round_name: "Coding Challenge".to_string(),
            score: 91.0,
        };
        let now = Utc::now();
        let out = appended_history(&history, &entry, now);
        assert_eq!(out.len(), history.len() + 1);
        let last = out.last().unwrap();
        assert_eq!(last.round, 3);
        assert_eq!(last.round_name, "Coding Challenge");
        assert_eq!(last.score, 91.0);
        assert_eq!(last.recorded_at, now);
    }

    #[test]
    fn test_append_to_empty_history() {
        let entry = RoundScore {
            round: 1,
            round_name: "Aptitude Test".to_string(),
            score: 55.0,
        };
        let out = appended_history(&[], &entry, Utc::now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].round, 1);
    }

    #[test]
    fn test_append_preserves_existing_entries() {
        let history = vec![result(1, 70.0)];
        let entry = RoundScore {
            round: 2,
            round_name: "x".to_string(),
            score: 60.0,
        };
        let out = appended_history(&history, &entry, Utc::now());
        assert_eq!(out[0], history[0]);
    }
}
