use anyhow::Result;
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::interview::assessment::NewAssessment;
use crate::models::assessment::AssessmentRow;

pub async fn insert_assessment<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    assessment: &NewAssessment,
) -> Result<AssessmentRow> {
    Ok(sqlx::query_as::<_, AssessmentRow>(
        r#"
        INSERT INTO assessments (id, user_id, quiz_score, questions, category, improvement_tip)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(assessment.quiz_score)
    .bind(Json(&assessment.questions))
    .bind(&assessment.category)
    .bind(assessment.improvement_tip.as_deref())
    .fetch_one(executor)
    .await?)
}

/// Oldest first, so charts read left to right.
pub async fn list_assessments<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Vec<AssessmentRow>> {
    Ok(sqlx::query_as::<_, AssessmentRow>(
        "SELECT * FROM assessments WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?)
}
