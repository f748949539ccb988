//! Auto-Scheduler — assigns concrete calendar dates to each stage of a
//! normalized pipeline by accumulating per-stage offsets from a start date.

use chrono::{Duration, NaiveDate};

use crate::errors::AppError;
use crate::models::job::Stage;

/// Assigns a date to every stage.
///
/// Stage 1 gets `start`; each subsequent stage gets the previous stage's
/// COMPUTED date plus its own `days_after_prev`. An HR-pinned
/// `scheduled_date` overrides the assigned date for that stage only — the
/// accumulation baseline stays on the computed chain, so a pin never shifts
/// the stages after it.
///
/// The resulting schedule is validated as a whole: no pin may precede the
/// start date, and the assigned dates must be non-decreasing in pipeline
/// order. A pin that lands before an earlier stage's date (computed or
/// pinned) makes the schedule run backwards and is rejected.
pub fn schedule_stages(stages: &[Stage], start: NaiveDate) -> Result<Vec<Stage>, AppError> {
    if stages.is_empty() {
        return Err(AppError::NoPipelineDefined(
            "pipeline has no stages".to_string(),
        ));
    }

    for stage in stages {
        if let Some(pin) = stage.scheduled_date {
            if pin < start {
                return Err(AppError::Validation(format!(
                    "stage {} is pinned to {pin}, before the start date {start}",
                    stage.order
                )));
            }
        }
    }

    let mut out = Vec::with_capacity(stages.len());
    let mut computed = start;
    let mut prev: Option<(u32, NaiveDate)> = None;
    for (i, stage) in stages.iter().enumerate() {
        if i > 0 {
            computed = computed + Duration::days(i64::from(stage.days_after_prev));
        }
        let assigned = stage.scheduled_date.unwrap_or(computed);
        if let Some((prev_order, prev_date)) = prev {
            if assigned < prev_date {
                return Err(AppError::Validation(format!(
                    "stage {} would run on {assigned}, before stage {prev_order} on {prev_date}",
                    stage.order
                )));
            }
        }
        prev = Some((stage.order, assigned));
        out.push(Stage {
            scheduled_date: Some(assigned),
            ..stage.clone()
        });
    }

    Ok(out)
}

/// Default start when the caller supplies none: tomorrow.
pub fn default_start_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalog::{Difficulty, StageType};

    fn stage(order: u32, days_after_prev: u32) -> Stage {
        Stage {
            stage_type: StageType::AptitudeTest,
            name: None,
            order,
            difficulty: Difficulty::Medium,
            threshold_score: 60,
            days_after_prev,
            scheduled_date: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_uniform_offsets_accumulate() {
        // Stage k (1-indexed) lands at S + (k-1)*d.
        let stages = vec![stage(1, 3), stage(2, 3), stage(3, 3), stage(4, 3)];
        let start = d(2026, 9, 1);
        let out = schedule_stages(&stages, start).unwrap();
        for (k, s) in out.iter().enumerate() {
            assert_eq!(
                s.scheduled_date,
                Some(start + Duration::days(3 * k as i64)),
                "stage {}",
                k + 1
            );
        }
    }

    #[test]
    fn test_first_stage_gets_start_date() {
        let out = schedule_stages(&[stage(1, 5)], d(2026, 9, 1)).unwrap();
        assert_eq!(out[0].scheduled_date, Some(d(2026, 9, 1)));
    }

    #[test]
    fn test_mixed_offsets() {
        let stages = vec![stage(1, 0), stage(2, 1), stage(3, 7)];
        let out = schedule_stages(&stages, d(2026, 9, 1)).unwrap();
        assert_eq!(out[1].scheduled_date, Some(d(2026, 9, 2)));
        assert_eq!(out[2].scheduled_date, Some(d(2026, 9, 9)));
    }

    #[test]
    fn test_empty_pipeline_fails_with_no_pipeline_defined() {
        let err = schedule_stages(&[], d(2026, 9, 1)).unwrap_err();
        assert!(matches!(err, AppError::NoPipelineDefined(_)));
    }

    #[test]
    fn test_pinned_date_overrides_without_shifting_later_stages() {
        // Computed chain is 1 / 4 / 7; stage 2 is pinned a day later.
        let mut stages = vec![stage(1, 3), stage(2, 3), stage(3, 3)];
        stages[1].scheduled_date = Some(d(2026, 9, 5));
        let out = schedule_stages(&stages, d(2026, 9, 1)).unwrap();
        // Pin wins for stage 2...
        assert_eq!(out[1].scheduled_date, Some(d(2026, 9, 5)));
        // ...but stage 3 still accumulates from the computed chain, not the pin.
        assert_eq!(out[2].scheduled_date, Some(d(2026, 9, 7)));
    }

    #[test]
    fn test_pin_before_earlier_computed_date_rejected() {
        // Stage 3 pinned between start and stage 2's computed date would
        // make the schedule run backwards (1 / 4 / 2).
        let mut stages = vec![stage(1, 3), stage(2, 3), stage(3, 3)];
        stages[2].scheduled_date = Some(d(2026, 9, 2));
        let err = schedule_stages(&stages, d(2026, 9, 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_pin_past_next_computed_date_rejected() {
        // Stage 2 pinned beyond stage 3's computed date (1 / 10 / 7).
        let mut stages = vec![stage(1, 3), stage(2, 3), stage(3, 3)];
        stages[1].scheduled_date = Some(d(2026, 9, 10));
        let err = schedule_stages(&stages, d(2026, 9, 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_pin_before_start_rejected() {
        let mut stages = vec![stage(1, 3), stage(2, 3)];
        stages[1].scheduled_date = Some(d(2026, 8, 1));
        let err = schedule_stages(&stages, d(2026, 9, 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_out_of_order_pins_rejected() {
        let mut stages = vec![stage(1, 3), stage(2, 3), stage(3, 3)];
        stages[1].scheduled_date = Some(d(2026, 9, 20));
        stages[2].scheduled_date = Some(d(2026, 9, 10));
        let err = schedule_stages(&stages, d(2026, 9, 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_same_day_stages_allowed() {
        let stages = vec![stage(1, 0), stage(2, 0)];
        let out = schedule_stages(&stages, d(2026, 9, 1)).unwrap();
        assert_eq!(out[0].scheduled_date, out[1].scheduled_date);
    }

    #[test]
    fn test_default_start_is_tomorrow() {
        assert_eq!(default_start_date(d(2026, 8, 31)), d(2026, 9, 1));
    }
}
