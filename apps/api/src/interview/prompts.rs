// Interview prompt templates.

/// Replace `{count}`, `{industry}` and `{skills_clause}` before sending.
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"Generate {count} technical interview questions for a {industry} professional{skills_clause}.
Each question should be multiple choice with exactly 4 options.
The correctAnswer must be copied verbatim from one of the options.
Return ONLY valid JSON in this format:

{
  "questions": [
    {
      "question": "string",
      "options": ["string", "string", "string", "string"],
      "correctAnswer": "string",
      "explanation": "string"
    }
  ]
}"#;

/// Replace `{industry}` and `{wrong_answers}` before sending.
pub const TIP_PROMPT_TEMPLATE: &str = r#"The user got the following {industry} technical interview questions wrong:

{wrong_answers}

Based on these mistakes, provide a concise, specific improvement tip.
Focus on the knowledge or skill gaps revealed by these questions.
Keep the response under 2 sentences and make it encouraging.
Do NOT mention the mistakes explicitly; focus on what to learn or practice."#;
