//! Onboarding validates the profile form, makes sure the user's industry has
//! an insight record, then stores the profile.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::freshness::FreshnessPolicy;
use crate::insights::service::generate_or_default;
use crate::insights::store as insight_store;
use crate::llm_client::LlmClient;
use crate::models::user::User;
use crate::users::store;

const MAX_EXPERIENCE_YEARS: f64 = 50.0;
const MIN_BIO_CHARS: usize = 10;

/// Years of experience arrive either as a number or as form text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExperienceInput {
    Years(f64),
    Text(String),
}

/// Skills arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingRequest {
    pub user_id: Uuid,
    pub industry: String,
    pub sub_industry: String,
    pub experience: ExperienceInput,
    pub skills: SkillsInput,
    pub bio: String,
}

/// Validated, storage-ready profile.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingProfile {
    /// `"{industry}-{sub_industry}"`
    pub industry: String,
    pub experience: i32,
    pub skills: Vec<String>,
    pub bio: String,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct OnboardingStatus {
    pub is_onboarded: bool,
}

impl OnboardingRequest {
    pub fn validate(&self) -> Result<OnboardingProfile, AppError> {
        let industry = self.industry.trim();
        if industry.is_empty() {
            return Err(AppError::Validation("Industry is required".to_string()));
        }
        let sub_industry = self.sub_industry.trim();
        if sub_industry.is_empty() {
            return Err(AppError::Validation("Specialization is required".to_string()));
        }

        let experience = parse_experience(&self.experience)?;

        let bio = self.bio.trim();
        if bio.chars().count() < MIN_BIO_CHARS {
            return Err(AppError::Validation(format!(
                "Bio must be at least {MIN_BIO_CHARS} characters"
            )));
        }

        Ok(OnboardingProfile {
            industry: format!("{industry}-{sub_industry}"),
            experience,
            skills: parse_skills(&self.skills),
            bio: bio.to_string(),
        })
    }
}

fn parse_experience(input: &ExperienceInput) -> Result<i32, AppError> {
    let years = match input {
        ExperienceInput::Years(years) => *years,
        // An empty field counts as zero years.
        ExperienceInput::Text(text) if text.trim().is_empty() => 0.0,
        ExperienceInput::Text(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
    };
    if !years.is_finite() || !(0.0..=MAX_EXPERIENCE_YEARS).contains(&years) {
        return Err(AppError::Validation(
            "Experience must be between 0 and 50".to_string(),
        ));
    }
    Ok(years.round() as i32)
}

fn parse_skills(input: &SkillsInput) -> Vec<String> {
    let raw: Vec<&str> = match input {
        SkillsInput::List(items) => items.iter().map(String::as_str).collect(),
        SkillsInput::Csv(text) => text.split(',').collect(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Stores the profile and guarantees an insight row exists for its industry.
///
/// The model call happens before the transaction opens so no connection is
/// held across a multi-second network round trip.
pub async fn complete_onboarding(
    pool: &PgPool,
    llm: &LlmClient,
    policy: &FreshnessPolicy,
    user_id: Uuid,
    profile: &OnboardingProfile,
) -> Result<User, AppError> {
    store::require_user(pool, user_id).await?;

    let existing = insight_store::find_by_industry(pool, &profile.industry)
        .await
        .map_err(AppError::Internal)?;
    let generated = match existing {
        Some(_) => None,
        None => Some(generate_or_default(llm, &profile.industry).await),
    };

    let mut tx = pool.begin().await?;
    if let Some(insights) = &generated {
        let now = Utc::now();
        insight_store::insert_if_missing(
            &mut *tx,
            &profile.industry,
            insights,
            now,
            policy.next_update(now),
        )
        .await
        .map_err(AppError::Internal)?;
    }
    let user = store::update_profile(&mut *tx, user_id, profile).await?;
    tx.commit().await?;

    info!(
        "User {user_id} onboarded into '{}' ({} skills)",
        profile.industry,
        profile.skills.len()
    );
    Ok(user)
}
