use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgExecutor;
use tracing::info;
use uuid::Uuid;

use crate::insights::generator::GeneratedInsights;
use crate::models::insight::IndustryInsightRow;

pub async fn find_by_industry<'e>(
    executor: impl PgExecutor<'e>,
    industry: &str,
) -> Result<Option<IndustryInsightRow>> {
    Ok(
        sqlx::query_as::<_, IndustryInsightRow>("SELECT * FROM industry_insights WHERE industry = $1")
            .bind(industry)
            .fetch_optional(executor)
            .await?,
    )
}

/// Inserts or overwrites the insight row for `industry`.
pub async fn upsert_insight<'e>(
    executor: impl PgExecutor<'e>,
    industry: &str,
    insights: &GeneratedInsights,
    now: DateTime<Utc>,
    next_update: DateTime<Utc>,
) -> Result<IndustryInsightRow> {
    let row = sqlx::query_as::<_, IndustryInsightRow>(
        r#"
        INSERT INTO industry_insights
            (id, industry, salary_ranges, growth_rate, demand_level, top_skills,
             market_outlook, key_trends, recommended_skills, last_updated, next_update)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (industry) DO UPDATE SET
            salary_ranges = EXCLUDED.salary_ranges,
            growth_rate = EXCLUDED.growth_rate,
            demand_level = EXCLUDED.demand_level,
            top_skills = EXCLUDED.top_skills,
            market_outlook = EXCLUDED.market_outlook,
            key_trends = EXCLUDED.key_trends,
            recommended_skills = EXCLUDED.recommended_skills,
            last_updated = EXCLUDED.last_updated,
            next_update = EXCLUDED.next_update
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(industry)
    .bind(Json(&insights.salary_ranges))
    .bind(insights.growth_rate)
    .bind(insights.demand_level.as_str())
    .bind(&insights.top_skills)
    .bind(insights.market_outlook.as_str())
    .bind(&insights.key_trends)
    .bind(&insights.recommended_skills)
    .bind(now)
    .bind(next_update)
    .fetch_one(executor)
    .await?;

    info!("Upserted industry insight for '{industry}' (next update {next_update})");
    Ok(row)
}

/// Inserts the row only when no record exists yet; an existing row wins.
pub async fn insert_if_missing<'e>(
    executor: impl PgExecutor<'e>,
    industry: &str,
    insights: &GeneratedInsights,
    now: DateTime<Utc>,
    next_update: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO industry_insights
            (id, industry, salary_ranges, growth_rate, demand_level, top_skills,
             market_outlook, key_trends, recommended_skills, last_updated, next_update)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (industry) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(industry)
    .bind(Json(&insights.salary_ranges))
    .bind(insights.growth_rate)
    .bind(insights.demand_level.as_str())
    .bind(&insights.top_skills)
    .bind(insights.market_outlook.as_str())
    .bind(&insights.key_trends)
    .bind(&insights.recommended_skills)
    .bind(now)
    .bind(next_update)
    .execute(executor)
    .await?;

    if result.rows_affected() > 0 {
        info!("Created industry insight for '{industry}'");
    }
    Ok(())
}
