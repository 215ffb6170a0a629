use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Per-question outcome stored inside an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Percentage of correct answers, 0–100.
    pub quiz_score: f64,
    pub questions: Json<Vec<QuestionResult>>,
    pub category: String,
    pub improvement_tip: Option<String>,
    pub created_at: DateTime<Utc>,
}
