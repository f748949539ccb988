//! Code execution seam for the coding round.
//!
//! Real sandboxed execution is a separate backend behind `CodeRunner`; the
//! default `FixedOutcomeRunner` is an explicit deterministic stub so grading
//! stays testable without an executor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub case: u32,
    pub passed: bool,
}

/// Runs submitted code against a set of test cases.
/// Carried in `AppState` as `Arc<dyn CodeRunner>`.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(&self, code: &str, cases: &[TestCase]) -> Result<Vec<CaseResult>, AppError>;
}

/// Deterministic stub: a non-empty submission passes every case, an empty one
/// fails every case.
pub struct FixedOutcomeRunner;

#[async_trait]
impl CodeRunner for FixedOutcomeRunner {
    async fn run(&self, code: &str, cases: &[TestCase]) -> Result<Vec<CaseResult>, AppError> {
        let passed = !code.trim().is_empty();
        Ok(cases
            .iter()
            .enumerate()
            .map(|(i, _)| CaseResult {
                case: i as u32 + 1,
                passed,
            })
            .collect())
    }
}

/// The canned test battery used until challenge authoring lands. Challenge
/// content itself is owned by the HR tooling, not this service.
pub fn default_test_cases() -> Vec<TestCase> {
    vec![
        TestCase {
            input: "1 2".to_string(),
            expected_output: "3".to_string(),
        },
        TestCase {
            input: "0 0".to_string(),
            expected_output: "0".to_string(),
        },
        TestCase {
            input: "-5 5".to_string(),
            expected_output: "0".to_string(),
        },
        TestCase {
            input: "1000000 1".to_string(),
            expected_output: "1000001".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nonempty_code_passes_all_cases() {
        let runner = FixedOutcomeRunner;
        let cases = default_test_cases();
        let results = runner.run("fn main() {}", &cases).await.unwrap();
        assert_eq!(results.len(), cases.len());
        assert!(results.iter().all(|r| r.passed));
    }

    #[tokio::test]
    async fn test_empty_code_fails_all_cases() {
        let runner = FixedOutcomeRunner;
        let results = runner.run("   \n", &default_test_cases()).await.unwrap();
        assert!(results.iter().all(|r| !r.passed));
    }

    #[tokio::test]
    async fn test_case_numbers_are_one_indexed() {
        let runner = FixedOutcomeRunner;
        let results = runner.run("x", &default_test_cases()).await.unwrap();
        assert_eq!(results[0].case, 1);
        assert_eq!(results.last().unwrap().case, results.len() as u32);
    }

    #[tokio::test]
    async fn test_deterministic_across_runs() {
        let runner = FixedOutcomeRunner;
        let cases = default_test_cases();
        let a = runner.run("code", &cases).await.unwrap();
        let b = runner.run("code", &cases).await.unwrap();
        assert_eq!(a, b);
    }
}
