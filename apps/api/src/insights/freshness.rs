//! Freshness policy for stored insights: time-to-live plus a completeness check.
//!
//! Stale records are not refreshed in the background; the next read regenerates them.

use chrono::{DateTime, Duration, Utc};

use crate::insights::generator::GeneratedInsights;
use crate::llm_client::LlmError;
use crate::models::insight::IndustryInsightRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightDecision {
    /// Serve the stored record as-is.
    Reuse,
    /// Call the model and upsert the result.
    Regenerate,
}

/// What a regeneration attempt leaves behind.
#[derive(Debug)]
pub enum InsightOutcome {
    /// Generation failed; the stored record is served unchanged.
    ServeExisting(IndustryInsightRow),
    /// Upsert these values: fresh output, or the zeroed record when nothing is stored yet.
    Store(GeneratedInsights),
}

/// Settles a regeneration result against the record it would replace.
pub fn resolve_generation(
    existing: Option<IndustryInsightRow>,
    generated: Result<GeneratedInsights, LlmError>,
) -> InsightOutcome {
    match (generated, existing) {
        (Ok(insights), _) => InsightOutcome::Store(insights),
        (Err(_), Some(insight)) => InsightOutcome::ServeExisting(insight),
        (Err(_), None) => InsightOutcome::Store(GeneratedInsights::default()),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    pub ttl: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::days(7),
        }
    }
}

impl FreshnessPolicy {
    pub fn from_days(days: i64) -> Self {
        Self {
            ttl: Duration::days(days),
        }
    }

    pub fn is_fresh(&self, insight: &IndustryInsightRow, now: DateTime<Utc>) -> bool {
        insight.has_all_lists() && now < insight.next_update
    }

    pub fn decide(&self, existing: Option<&IndustryInsightRow>, now: DateTime<Utc>) -> InsightDecision {
        match existing {
            Some(insight) if self.is_fresh(insight, now) => InsightDecision::Reuse,
            _ => InsightDecision::Regenerate,
        }
    }

    pub fn next_update(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.ttl
    }
}
