use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DemandLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "HIGH",
            DemandLevel::Medium => "MEDIUM",
            DemandLevel::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketOutlook {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl MarketOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketOutlook::Positive => "POSITIVE",
            MarketOutlook::Neutral => "NEUTRAL",
            MarketOutlook::Negative => "NEGATIVE",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub location: String,
}

/// One row per industry, shared by every user in it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IndustryInsightRow {
    pub id: Uuid,
    pub industry: String,
    pub salary_ranges: Json<Vec<SalaryRange>>,
    pub growth_rate: f64,
    pub demand_level: String,
    pub top_skills: Vec<String>,
    pub market_outlook: String,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl IndustryInsightRow {
    /// True when every list the dashboard renders has content.
    pub fn has_all_lists(&self) -> bool {
        !self.salary_ranges.0.is_empty()
            && !self.top_skills.is_empty()
            && !self.key_trends.is_empty()
            && !self.recommended_skills.is_empty()
    }
}
