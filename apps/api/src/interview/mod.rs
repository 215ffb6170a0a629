// Technical interview practice: AI-generated quizzes, grading, improvement tips,
// and the assessment history.

pub mod assessment;
pub mod grading;
pub mod handlers;
pub mod prompts;
pub mod quiz;
pub mod store;
pub mod tip;
