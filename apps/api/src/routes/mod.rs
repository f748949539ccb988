pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::assessments::handlers as assessments;
use crate::interviews::handlers as interviews;
use crate::jobs::handlers as jobs;
use crate::progression::handlers as candidates;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs & pipelines
        .route("/api/jobs", post(jobs::handle_create_job))
        .route("/api/jobs", get(jobs::handle_list_jobs))
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        .route("/api/jobs/:id", put(jobs::handle_update_job))
        .route("/api/jobs/:id", delete(jobs::handle_close_job))
        .route("/api/jobs/:id/schedule", post(jobs::handle_schedule_job))
        .route("/api/jobs/:id/pipeline", get(jobs::handle_get_pipeline))
        // Aptitude round
        .route(
            "/api/aptitude/questions",
            get(assessments::handle_sample_questions),
        )
        .route(
            "/api/aptitude/submit",
            post(assessments::handle_aptitude_submit),
        )
        // Coding round
        .route("/api/coding/submit", post(assessments::handle_coding_submit))
        .route("/api/coding/finish", post(assessments::handle_coding_finish))
        // Interviews
        .route(
            "/api/interviews/token",
            post(interviews::handle_interview_token),
        )
        .route(
            "/api/interviews/:id/conclude",
            post(interviews::handle_interview_conclude),
        )
        // Candidates
        .route("/api/candidates/:id", get(candidates::handle_get_candidate))
        .route(
            "/api/jobs/:id/candidates/:cid/hire",
            post(candidates::handle_hire_candidate),
        )
        .with_state(state)
}
