//! Difficulty-weighted grading for multiple-choice submissions.
//! Easy=1, Medium=2, Hard=3; percentage is always defined, never NaN.

use serde::Deserialize;
use uuid::Uuid;

use crate::models::attempt::AnswerRecord;
use crate::models::question::QuestionRow;
use crate::pipeline::catalog::Difficulty;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub selected_option: i32,
}

#[derive(Debug, Clone, Default)]
pub struct GradeSummary {
    pub total_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub answers: Vec<AnswerRecord>,
}

/// Grades answers by exact match against the stored correct option.
/// Answers referencing unknown questions are ignored.
pub fn grade_answers(questions: &[QuestionRow], answers: &[SubmittedAnswer]) -> GradeSummary {
    let mut summary = GradeSummary::default();

    for answer in answers {
        let Some(question) = questions.iter().find(|q| q.id == answer.question_id) else {
            continue;
        };
        let weight = Difficulty::parse(&question.difficulty)
            .unwrap_or_default()
            .weight();
        let correct = answer.selected_option == question.correct_option;

        summary.max_score += f64::from(weight);
        if correct {
            summary.total_score += f64::from(weight);
        }
        summary.answers.push(AnswerRecord {
            question_id: answer.question_id,
            selected_option: answer.selected_option,
            correct,
            weight,
        });
    }

    summary.percentage = if summary.max_score > 0.0 {
        summary.total_score / summary.max_score * 100.0
    } else {
        0.0
    };
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;

    fn question(difficulty: &str, correct_option: i32) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            job_id: None,
            category: "logic".to_string(),
            difficulty: difficulty.to_string(),
            prompt: "?".to_string(),
            options: Json(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            correct_option,
            created_at: Utc::now(),
        }
    }

    fn answer(q: &QuestionRow, selected: i32) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: q.id,
            selected_option: selected,
        }
    }

    #[test]
    fn test_weighted_percentage() {
        // Easy correct (1) + Hard correct (3), Medium wrong (2): 4/6 ≈ 66.67%
        let qs = vec![question("Easy", 0), question("Medium", 1), question("Hard", 2)];
        let answers = vec![answer(&qs[0], 0), answer(&qs[1], 3), answer(&qs[2], 2)];
        let summary = grade_answers(&qs, &answers);
        assert_eq!(summary.total_score, 4.0);
        assert_eq!(summary.max_score, 6.0);
        assert!((summary.percentage - 100.0 * 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_answers_defined_zero_percentage() {
        let qs = vec![question("Medium", 0)];
        let summary = grade_answers(&qs, &[]);
        assert_eq!(summary.max_score, 0.0);
        assert_eq!(summary.percentage, 0.0);
        assert!(!summary.percentage.is_nan());
    }

    #[test]
    fn test_all_correct_is_hundred_percent() {
        let qs = vec![question("Easy", 1), question("Hard", 3)];
        let answers = vec![answer(&qs[0], 1), answer(&qs[1], 3)];
        let summary = grade_answers(&qs, &answers);
        assert_eq!(summary.percentage, 100.0);
    }

    #[test]
    fn test_unknown_question_ids_ignored() {
        let qs = vec![question("Easy", 0)];
        let answers = vec![
            answer(&qs[0], 0),
            SubmittedAnswer {
                question_id: Uuid::new_v4(),
                selected_option: 0,
            },
        ];
        let summary = grade_answers(&qs, &answers);
        assert_eq!(summary.answers.len(), 1);
        assert_eq!(summary.max_score, 1.0);
    }

    #[test]
    fn test_unknown_difficulty_grades_as_medium() {
        let qs = vec![question("Impossible", 0)];
        let summary = grade_answers(&qs, &[answer(&qs[0], 0)]);
        assert_eq!(summary.max_score, 2.0);
    }

    #[test]
    fn test_answer_records_carry_verdicts() {
        let qs = vec![question("Hard", 2)];
        let summary = grade_answers(&qs, &[answer(&qs[0], 1)]);
        assert_eq!(summary.answers[0].correct, false);
        assert_eq!(summary.answers[0].weight, 3);
        assert_eq!(summary.percentage, 0.0);
    }
}
