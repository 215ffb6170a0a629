use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Identity-provider subject; users are synced by this key.
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    /// `"{industry}-{sub_industry}"`, set during onboarding.
    pub industry: Option<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn onboarding_complete(&self) -> bool {
        self.is_onboarded || self.industry.is_some()
    }
}
