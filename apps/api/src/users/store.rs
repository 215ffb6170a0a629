use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::users::onboarding::OnboardingProfile;

/// Default Postgres name for the `UNIQUE` on `users.email`.
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Creates the user on first sight, otherwise refreshes email and name.
/// An email already owned by another identity is a validation error.
pub async fn sync_user(
    pool: &PgPool,
    external_id: &str,
    email: &str,
    name: Option<&str>,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, external_id, email, name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (external_id) DO UPDATE SET
            email = EXCLUDED.email,
            name = EXCLUDED.name,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(external_id)
    .bind(email)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(map_sync_error)
}

fn map_sync_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db)
            if db.is_unique_violation() && db.constraint() == Some(EMAIL_CONSTRAINT) =>
        {
            AppError::Validation("Email is already linked to another account".to_string())
        }
        _ => AppError::Database(e),
    }
}

pub async fn find_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<User>, AppError> {
    Ok(
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?,
    )
}

pub async fn require_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    find_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

/// Loads the user and their industry, rejecting users who skipped onboarding.
pub async fn require_onboarded_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<(User, String), AppError> {
    let user = require_user(pool, user_id).await?;
    match user.industry.clone() {
        Some(industry) => Ok((user, industry)),
        None => Err(AppError::Validation(
            "User has not completed onboarding".to_string(),
        )),
    }
}

pub async fn update_profile<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    profile: &OnboardingProfile,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            industry = $2,
            experience = $3,
            bio = $4,
            skills = $5,
            is_onboarded = TRUE,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&profile.industry)
    .bind(profile.experience)
    .bind(&profile.bio)
    .bind(&profile.skills)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}
