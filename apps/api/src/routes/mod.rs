pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::insights::handlers as insights;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::users::handlers as users;

/// `?user_id=` on read endpoints. Identity comes from the fronting auth layer.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users and onboarding
        .route("/api/v1/users", post(users::handle_sync_user))
        .route(
            "/api/v1/users/onboarding-status",
            get(users::handle_onboarding_status),
        )
        .route("/api/v1/users/onboarding", post(users::handle_onboarding))
        // Industry insights
        .route("/api/v1/insights", get(insights::handle_get_insights))
        // Interview practice
        .route("/api/v1/interview/quiz", post(interview::handle_generate_quiz))
        .route(
            "/api/v1/interview/results",
            post(interview::handle_save_quiz_result),
        )
        .route(
            "/api/v1/interview/assessments",
            get(interview::handle_list_assessments),
        )
        // Resume
        .route(
            "/api/v1/resumes",
            get(resume::handle_get_resume).put(resume::handle_save_resume),
        )
        .with_state(state)
}
