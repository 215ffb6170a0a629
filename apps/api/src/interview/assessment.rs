//! Turns a submitted quiz into a stored assessment.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::grading::grade;
use crate::interview::quiz::QuizQuestion;
use crate::interview::store;
use crate::interview::tip::improvement_tip;
use crate::llm_client::LlmClient;
use crate::models::assessment::{AssessmentRow, QuestionResult};
use crate::users::store::require_onboarded_user;

pub const ASSESSMENT_CATEGORY: &str = "Technical";

#[derive(Debug, Clone, PartialEq)]
pub struct NewAssessment {
    pub quiz_score: f64,
    pub questions: Vec<QuestionResult>,
    pub category: String,
    pub improvement_tip: Option<String>,
}

/// Grades the answers and asks for a tip on the wrong ones.
/// A failed tip leaves `improvement_tip` empty; it never fails the assessment.
pub async fn prepare_assessment(
    llm: &LlmClient,
    industry: &str,
    questions: &[QuizQuestion],
    answers: &[Option<String>],
) -> NewAssessment {
    let graded = grade(questions, answers);
    let tip = improvement_tip(llm, industry, &graded.wrong_answers()).await;

    NewAssessment {
        quiz_score: graded.score,
        questions: graded.results,
        category: ASSESSMENT_CATEGORY.to_string(),
        improvement_tip: tip,
    }
}

pub async fn save_quiz_result(
    pool: &PgPool,
    llm: &LlmClient,
    user_id: Uuid,
    questions: &[QuizQuestion],
    answers: &[Option<String>],
) -> Result<AssessmentRow, AppError> {
    if questions.is_empty() {
        return Err(AppError::Validation("Quiz has no questions".to_string()));
    }
    let (_, industry) = require_onboarded_user(pool, user_id).await?;

    let assessment = prepare_assessment(llm, &industry, questions, answers).await;
    let row = store::insert_assessment(pool, user_id, &assessment)
        .await
        .map_err(AppError::Internal)?;

    info!(
        "Saved assessment {} for user {user_id}: score {:.1}",
        row.id, row.quiz_score
    );
    Ok(row)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::mock::{MockGenerator, MockReply};
    use crate::llm_client::RetryPolicy;

    fn questions() -> Vec<QuizQuestion> {
        ["a", "b"]
            .iter()
            .enumerate()
            .map(|(i, correct)| QuizQuestion {
                question: format!("Q{}", i + 1),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: correct.to_string(),
                explanation: String::new(),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_tip_failure_still_yields_assessment() {
        let mock = Arc::new(MockGenerator::always(MockReply::Status(500)));
        let llm = LlmClient::with_generator(mock.clone()).with_policy(RetryPolicy::default());

        let assessment =
            prepare_assessment(&llm, "tech", &questions(), &[Some("a".into()), Some("c".into())])
                .await;

        assert_eq!(assessment.quiz_score, 50.0);
        assert_eq!(assessment.improvement_tip, None);
        assert_eq!(assessment.category, "Technical");
        assert_eq!(assessment.questions.len(), 2);
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn test_wrong_answers_get_a_tip() {
        let mock = Arc::new(MockGenerator::text("Practice pattern matching."));
        let llm = LlmClient::with_generator(mock.clone());

        let assessment = prepare_assessment(&llm, "tech", &questions(), &[None, Some("b".into())]).await;

        assert_eq!(assessment.improvement_tip.as_deref(), Some("Practice pattern matching."));
        assert!(mock.prompts()[0].contains("Question: \"Q1\""));
        assert!(!mock.prompts()[0].contains("Question: \"Q2\""));
    }

    #[tokio::test]
    async fn test_perfect_score_skips_tip() {
        let mock = Arc::new(MockGenerator::text("unused"));
        let llm = LlmClient::with_generator(mock.clone());

        let assessment =
            prepare_assessment(&llm, "tech", &questions(), &[Some("a".into()), Some("b".into())])
                .await;

        assert_eq!(assessment.quiz_score, 100.0);
        assert_eq!(assessment.improvement_tip, None);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_client_leaves_tip_empty() {
        let assessment =
            prepare_assessment(&LlmClient::unconfigured(), "tech", &questions(), &[]).await;
        assert_eq!(assessment.quiz_score, 0.0);
        assert_eq!(assessment.improvement_tip, None);
    }
}
