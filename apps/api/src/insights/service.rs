//! Insight orchestration: freshness check → extraction → upsert.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::insights::freshness::{
    resolve_generation, FreshnessPolicy, InsightDecision, InsightOutcome,
};
use crate::insights::generator::{generate_insights, GeneratedInsights};
use crate::insights::store;
use crate::llm_client::LlmClient;
use crate::models::insight::IndustryInsightRow;

/// Returns the insight record for `industry`, regenerating it when missing,
/// incomplete, or past its refresh date.
///
/// Extraction failures never reach the caller: an existing record is served
/// as-is, otherwise a zeroed record is stored so the next read retries.
pub async fn get_or_refresh_insights(
    pool: &PgPool,
    llm: &LlmClient,
    policy: &FreshnessPolicy,
    industry: &str,
) -> Result<IndustryInsightRow, AppError> {
    let existing = store::find_by_industry(pool, industry)
        .await
        .map_err(AppError::Internal)?;
    let now = Utc::now();

    if policy.decide(existing.as_ref(), now) == InsightDecision::Reuse {
        debug!("Serving cached insights for '{industry}'");
        if let Some(insight) = existing {
            return Ok(insight);
        }
    }

    info!("Generating insights for '{industry}'");
    let generated = generate_insights(llm, industry).await;
    if let Err(e) = &generated {
        warn!("Insight generation for '{industry}' failed: {e}");
    }

    match resolve_generation(existing, generated) {
        InsightOutcome::ServeExisting(insight) => Ok(insight),
        InsightOutcome::Store(insights) => {
            store::upsert_insight(pool, industry, &insights, now, policy.next_update(now))
                .await
                .map_err(AppError::Internal)
        }
    }
}

/// Produces insights for an industry that has no record yet.
/// Used by onboarding, before the profile transaction opens.
pub async fn generate_or_default(llm: &LlmClient, industry: &str) -> GeneratedInsights {
    match generate_insights(llm, industry).await {
        Ok(generated) => generated,
        Err(e) => {
            warn!("Insight generation for '{industry}' failed, storing defaults: {e}");
            GeneratedInsights::default()
        }
    }
}
