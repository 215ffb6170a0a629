//! Quiz generation. Failure is a valid outcome: callers get an empty list and
//! surface "no quiz available".

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::interview::prompts::QUIZ_PROMPT_TEMPLATE;
use crate::llm_client::prompts::json_only;
use crate::llm_client::{FieldKind, LlmClient, Schema};

pub const QUIZ_QUESTION_COUNT: usize = 10;
const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    /// Has text, four options, and a correct answer that is one of them.
    pub fn is_answerable(&self) -> bool {
        !self.question.is_empty()
            && self.options.len() == OPTIONS_PER_QUESTION
            && self.options.contains(&self.correct_answer)
    }
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuizQuestion>,
}

pub fn quiz_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let question = Schema::new()
            .string("question")
            .array("options", FieldKind::String)
            .string("correctAnswer")
            .string("explanation");
        Schema::new().array("questions", FieldKind::Object(question))
    })
}

pub fn build_quiz_prompt(industry: &str, skills: &[String]) -> String {
    let skills_clause = if skills.is_empty() {
        String::new()
    } else {
        format!(" with expertise in {}", skills.join(", "))
    };
    json_only(
        &QUIZ_PROMPT_TEMPLATE
            .replace("{count}", &QUIZ_QUESTION_COUNT.to_string())
            .replace("{industry}", industry)
            .replace("{skills_clause}", &skills_clause),
    )
}

/// Generates multiple-choice questions for the user's industry and skills.
/// Never fails: any extraction error yields an empty list.
pub async fn generate_quiz(llm: &LlmClient, industry: &str, skills: &[String]) -> Vec<QuizQuestion> {
    let prompt = build_quiz_prompt(industry, skills);
    let payload = match llm.extract::<QuizPayload>(&prompt, quiz_schema()).await {
        Ok(payload) => payload,
        Err(e) => {
            error!("Error generating quiz for '{industry}': {e}");
            return Vec::new();
        }
    };

    let received = payload.questions.len();
    let questions: Vec<QuizQuestion> = payload
        .questions
        .into_iter()
        .filter(QuizQuestion::is_answerable)
        .collect();

    if questions.len() < received {
        warn!(
            "Dropped {} unanswerable quiz questions",
            received - questions.len()
        );
    }
    info!("Generated {} quiz questions for '{industry}'", questions.len());
    questions
}
