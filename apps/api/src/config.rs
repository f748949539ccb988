use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Built once in `main` and carried in `AppState` — no component reads the
/// environment directly after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Base URL for candidate-facing assessment links.
    pub frontend_url: String,
    /// When set, interview evaluation is proxied to this external scoring
    /// service instead of the built-in rubric evaluator.
    pub evaluator_url: Option<String>,
    pub evaluator_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            frontend_url: require_env("FRONTEND_URL")?,
            evaluator_url: std::env::var("EVALUATOR_URL").ok(),
            evaluator_api_key: std::env::var("EVALUATOR_API_KEY").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
