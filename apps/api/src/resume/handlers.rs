use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::store;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::users::store::require_user;

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub user_id: Uuid,
    pub content: String,
}

/// GET /api/v1/resumes
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRow>, AppError> {
    store::find_resume(&state.db, params.user_id)
        .await
        .map_err(AppError::Internal)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No resume for user {}", params.user_id)))
}

/// PUT /api/v1/resumes
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Json(req): Json<SaveResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    require_user(&state.db, req.user_id).await?;
    let row = store::upsert_resume(&state.db, req.user_id, &req.content)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(row))
}
