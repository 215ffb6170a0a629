//! Insight extraction: prompt, schema and typed result for one industry.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::insights::prompts::INSIGHTS_PROMPT_TEMPLATE;
use crate::llm_client::prompts::json_only;
use crate::llm_client::{FieldKind, LlmClient, LlmError, Schema};
use crate::models::insight::{DemandLevel, MarketOutlook, SalaryRange};

/// Normalized insight payload. `Default` is the zeroed fallback record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInsights {
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

pub fn insight_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let salary_range = Schema::new()
            .string("role")
            .number("min")
            .number("max")
            .number("median")
            .string("location");

        Schema::new()
            .array("salaryRanges", FieldKind::Object(salary_range))
            .number("growthRate")
            .enumeration("demandLevel", &["High", "Medium", "Low"], "Medium")
            .array("topSkills", FieldKind::String)
            .enumeration(
                "marketOutlook",
                &["Positive", "Neutral", "Negative"],
                "Neutral",
            )
            .array("keyTrends", FieldKind::String)
            .array("recommendedSkills", FieldKind::String)
    })
}

pub fn build_insights_prompt(industry: &str) -> String {
    json_only(&INSIGHTS_PROMPT_TEMPLATE.replace("{industry}", industry))
}

/// Asks the model for insights on `industry`. Shape problems are normalized
/// away; only transport and parse failures are returned.
pub async fn generate_insights(
    llm: &LlmClient,
    industry: &str,
) -> Result<GeneratedInsights, LlmError> {
    llm.extract::<GeneratedInsights>(&build_insights_prompt(industry), insight_schema())
        .await
}
