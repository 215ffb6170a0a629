use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::AppError;
use crate::insights::service::get_or_refresh_insights;
use crate::models::insight::IndustryInsightRow;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::users::store::require_onboarded_user;

/// GET /api/v1/insights
pub async fn handle_get_insights(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<IndustryInsightRow>, AppError> {
    let (_, industry) = require_onboarded_user(&state.db, params.user_id).await?;
    let insight =
        get_or_refresh_insights(&state.db, &state.llm, &state.insight_policy, &industry).await?;
    Ok(Json(insight))
}
