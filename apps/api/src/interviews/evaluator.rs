//! Interview evaluation seam.
//!
//! `RubricEvaluator` is the deterministic built-in; `HttpEvaluator` proxies
//! to an external scoring service and is selected at startup when
//! EVALUATOR_URL is set. `AppState` holds an `Arc<dyn InterviewEvaluator>`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_MS: u64 = 500;

/// Per-dimension interview scores, all on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewScores {
    pub communication: f64,
    pub technical_depth: f64,
    pub problem_solving: f64,
    pub overall: f64,
}

#[async_trait]
pub trait InterviewEvaluator: Send + Sync {
    async fn evaluate(&self, transcript: &str) -> Result<InterviewScores, AppError>;
}

/// Deterministic transcript-feature rubric. No network, no model call; the
/// same transcript always produces the same scores.
pub struct RubricEvaluator;

const DEPTH_MARKERS: [&str; 6] = [
    "complexity",
    "tradeoff",
    "trade-off",
    "design",
    "performance",
    "test",
];
const STRUCTURE_MARKERS: [&str; 4] = ["first", "then", "approach", "because"];

impl RubricEvaluator {
    pub fn score_transcript(transcript: &str) -> InterviewScores {
        let lower = transcript.to_lowercase();
        let words = lower.split_whitespace().count();

        // Sustained answers up to ~400 words max out the communication axis.
        let communication = (words.min(400) as f64) / 4.0;
        let technical_depth = (count_markers(&lower, &DEPTH_MARKERS) * 20).min(100) as f64;
        let problem_solving = (count_markers(&lower, &STRUCTURE_MARKERS) * 25).min(100) as f64;
        let overall = (communication + technical_depth + problem_solving) / 3.0;

        InterviewScores {
            communication,
            technical_depth,
            problem_solving,
            overall,
        }
    }
}

fn count_markers(text: &str, markers: &[&str]) -> usize {
    markers.iter().filter(|m| text.contains(*m)).count()
}

#[async_trait]
impl InterviewEvaluator for RubricEvaluator {
    async fn evaluate(&self, transcript: &str) -> Result<InterviewScores, AppError> {
        Ok(Self::score_transcript(transcript))
    }
}

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    transcript: &'a str,
}

/// Evaluator backed by an external scoring service. Retries on transient
/// failures with exponential backoff.
pub struct HttpEvaluator {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpEvaluator {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl InterviewEvaluator for HttpEvaluator {
    async fn evaluate(&self, transcript: &str) -> Result<InterviewScores, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut request = self.client.post(&self.url).json(&EvaluateRequest { transcript });
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("Evaluator responded on attempt {attempt}");
                    return resp
                        .json::<InterviewScores>()
                        .await
                        .map_err(|e| AppError::Evaluator(format!("invalid response: {e}")));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let retryable = status.is_server_error() || status.as_u16() == 429;
                    if !retryable || attempt >= MAX_RETRIES {
                        return Err(AppError::Evaluator(format!(
                            "evaluator returned {status} after {attempt} attempt(s)"
                        )));
                    }
                    warn!("Evaluator returned {status}; retrying (attempt {attempt})");
                }
                Err(e) => {
                    if attempt >= MAX_RETRIES {
                        return Err(AppError::Evaluator(format!(
                            "evaluator unreachable after {attempt} attempt(s): {e}"
                        )));
                    }
                    warn!("Evaluator request failed ({e}); retrying (attempt {attempt})");
                }
            }

            let backoff = RETRY_BASE_MS * 2u64.pow(attempt - 1);
            tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript_scores_zero() {
        let scores = RubricEvaluator::score_transcript("");
        assert_eq!(scores.communication, 0.0);
        assert_eq!(scores.technical_depth, 0.0);
        assert_eq!(scores.problem_solving, 0.0);
        assert_eq!(scores.overall, 0.0);
    }

    #[test]
    fn test_scores_are_deterministic() {
        let t = "First I would look at the design, then discuss the tradeoff.";
        assert_eq!(
            RubricEvaluator::score_transcript(t),
            RubricEvaluator::score_transcript(t)
        );
    }

    #[test]
    fn test_depth_markers_raise_technical_score() {
        let shallow = RubricEvaluator::score_transcript("I would just write the code quickly.");
        let deep = RubricEvaluator::score_transcript(
            "I would weigh the tradeoff between design complexity and performance, then test it.",
        );
        assert!(deep.technical_depth > shallow.technical_depth);
    }

    #[test]
    fn test_scores_bounded_0_to_100() {
        let long = "first then approach because complexity tradeoff design performance test "
            .repeat(100);
        let scores = RubricEvaluator::score_transcript(&long);
        for v in [
            scores.communication,
            scores.technical_depth,
            scores.problem_solving,
            scores.overall,
        ] {
            assert!((0.0..=100.0).contains(&v), "out of range: {v}");
        }
    }

    #[tokio::test]
    async fn test_rubric_evaluator_trait_impl() {
        let evaluator = RubricEvaluator;
        let scores = evaluator.evaluate("a short answer").await.unwrap();
        assert!(scores.communication > 0.0);
    }
}
