use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::user::User;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::users::onboarding::{
    complete_onboarding, OnboardingRequest, OnboardingResponse, OnboardingStatus,
};
use crate::users::store;

#[derive(Debug, Deserialize)]
pub struct SyncUserRequest {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
}

/// POST /api/v1/users
pub async fn handle_sync_user(
    State(state): State<AppState>,
    Json(req): Json<SyncUserRequest>,
) -> Result<Json<User>, AppError> {
    if req.external_id.trim().is_empty() {
        return Err(AppError::Validation("external_id cannot be empty".to_string()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }
    let user = store::sync_user(
        &state.db,
        req.external_id.trim(),
        req.email.trim(),
        req.name.as_deref(),
    )
    .await?;
    Ok(Json(user))
}

/// GET /api/v1/users/onboarding-status
pub async fn handle_onboarding_status(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<OnboardingStatus>, AppError> {
    let user = store::require_user(&state.db, params.user_id).await?;
    Ok(Json(OnboardingStatus {
        is_onboarded: user.onboarding_complete(),
    }))
}

/// POST /api/v1/users/onboarding
pub async fn handle_onboarding(
    State(state): State<AppState>,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, AppError> {
    let profile = req.validate()?;
    let user = complete_onboarding(
        &state.db,
        &state.llm,
        &state.insight_policy,
        req.user_id,
        &profile,
    )
    .await?;
    Ok(Json(OnboardingResponse {
        success: true,
        user,
    }))
}
