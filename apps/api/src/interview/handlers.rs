use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::assessment::save_quiz_result;
use crate::interview::quiz::{generate_quiz, QuizQuestion};
use crate::interview::store;
use crate::models::assessment::AssessmentRow;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::users::store::{require_onboarded_user, require_user};

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    /// Empty when the model could not produce a usable quiz.
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SaveQuizResultRequest {
    pub user_id: Uuid,
    pub questions: Vec<QuizQuestion>,
    /// Positional; `null` marks an unanswered question.
    pub answers: Vec<Option<String>>,
}

/// POST /api/v1/interview/quiz
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let (user, industry) = require_onboarded_user(&state.db, req.user_id).await?;
    let questions = generate_quiz(&state.llm, &industry, &user.skills).await;
    Ok(Json(QuizResponse { questions }))
}

/// POST /api/v1/interview/results
pub async fn handle_save_quiz_result(
    State(state): State<AppState>,
    Json(req): Json<SaveQuizResultRequest>,
) -> Result<Json<AssessmentRow>, AppError> {
    let row = save_quiz_result(
        &state.db,
        &state.llm,
        req.user_id,
        &req.questions,
        &req.answers,
    )
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/interview/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AssessmentRow>>, AppError> {
    require_user(&state.db, params.user_id).await?;
    let rows = store::list_assessments(&state.db, params.user_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(rows))
}
