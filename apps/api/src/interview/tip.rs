//! Best-effort improvement tip for the questions a user got wrong.

use tracing::{debug, error};

use crate::interview::prompts::TIP_PROMPT_TEMPLATE;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::assessment::QuestionResult;

pub fn build_tip_prompt(industry: &str, wrong: &[&QuestionResult]) -> String {
    let wrong_answers = wrong
        .iter()
        .map(|q| {
            format!(
                "Question: \"{}\"\nCorrect Answer: \"{}\"\nUser Answer: \"{}\"",
                q.question, q.answer, q.user_answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    TIP_PROMPT_TEMPLATE
        .replace("{industry}", industry)
        .replace("{wrong_answers}", &wrong_answers)
}

/// Returns `None` when nothing was wrong or the call failed. Failures are
/// logged and never propagate.
pub async fn improvement_tip(
    llm: &LlmClient,
    industry: &str,
    wrong: &[&QuestionResult],
) -> Option<String> {
    if wrong.is_empty() {
        return None;
    }

    match llm.request_text(&build_tip_prompt(industry, wrong)).await {
        Ok(tip) => Some(tip),
        Err(LlmError::Unconfigured) => {
            debug!("Skipping improvement tip: LLM client not configured");
            None
        }
        Err(e) => {
            error!("Error generating improvement tip: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::mock::{MockGenerator, MockReply};
    use crate::llm_client::RetryPolicy;

    fn wrong_result() -> QuestionResult {
        QuestionResult {
            question: "What is a lifetime?".to_string(),
            answer: "A scope for which a reference is valid".to_string(),
            user_answer: "A garbage collector".to_string(),
            is_correct: false,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_prompt_lists_each_wrong_answer() {
        let r = wrong_result();
        let prompt = build_tip_prompt("tech", &[&r, &r]);
        assert_eq!(prompt.matches("Question: \"What is a lifetime?\"").count(), 2);
        assert!(prompt.contains("User Answer: \"A garbage collector\""));
        assert!(prompt.contains("following tech technical interview questions"));
    }

    #[tokio::test]
    async fn test_no_wrong_answers_skips_the_call() {
        let mock = Arc::new(MockGenerator::text("unused"));
        let llm = LlmClient::with_generator(mock.clone());

        assert_eq!(improvement_tip(&llm, "tech", &[]).await, None);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tip_is_cleaned_model_text() {
        let mock = Arc::new(MockGenerator::text("```\nReview ownership and borrowing rules.\n```"));
        let llm = LlmClient::with_generator(mock.clone());
        let r = wrong_result();

        let tip = improvement_tip(&llm, "tech", &[&r]).await;

        assert_eq!(tip.as_deref(), Some("Review ownership and borrowing rules."));
        assert!(mock.prompts()[0].contains("What is a lifetime?"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_retries_returns_none() {
        let mock = Arc::new(MockGenerator::always(MockReply::Status(500)));
        let llm = LlmClient::with_generator(mock.clone()).with_policy(RetryPolicy::default());
        let r = wrong_result();

        assert_eq!(improvement_tip(&llm, "tech", &[&r]).await, None);
        assert_eq!(mock.call_count(), 4);
    }
}
