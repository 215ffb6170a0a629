// Industry insight prompt templates.

/// Replace `{industry}` before sending.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Analyze the current state of the {industry} industry and provide insights
in ONLY the following JSON format without any additional notes or explanations:

{
  "salaryRanges": [
    { "role": "string", "min": number, "max": number, "median": number, "location": "string" }
  ],
  "growthRate": number,
  "demandLevel": "High" | "Medium" | "Low",
  "topSkills": ["skill1", "skill2"],
  "marketOutlook": "Positive" | "Neutral" | "Negative",
  "keyTrends": ["trend1", "trend2"],
  "recommendedSkills": ["skill1", "skill2"]
}

Rules:
- Include at least 5 common roles for salary ranges.
- Growth rate is a percentage expressed as a plain number (12.5, not "12.5%").
- Include at least 5 skills and 5 trends."#;
