//! Grades submitted answers against the quiz key.

use crate::interview::quiz::QuizQuestion;
use crate::models::assessment::QuestionResult;

#[derive(Debug, Clone, PartialEq)]
pub struct GradedQuiz {
    pub results: Vec<QuestionResult>,
    /// Percentage correct, 0–100. An empty quiz scores 0.
    pub score: f64,
}

impl GradedQuiz {
    pub fn wrong_answers(&self) -> Vec<&QuestionResult> {
        self.results.iter().filter(|r| !r.is_correct).collect()
    }
}

/// `answers[i]` answers `questions[i]`; missing or null answers count as wrong.
pub fn grade(questions: &[QuizQuestion], answers: &[Option<String>]) -> GradedQuiz {
    let results: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let given = answers.get(i).and_then(|a| a.as_deref());
            QuestionResult {
                question: q.question.clone(),
                answer: q.correct_answer.clone(),
                user_answer: given.unwrap_or_default().to_string(),
                is_correct: given == Some(q.correct_answer.as_str()),
                explanation: q.explanation.clone(),
            }
        })
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let score = if results.is_empty() {
        0.0
    } else {
        correct as f64 / results.len() as f64 * 100.0
    };

    GradedQuiz { results, score }
}
