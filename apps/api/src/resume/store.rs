use anyhow::Result;
use sqlx::PgExecutor;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::ResumeRow;

pub async fn find_resume<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<ResumeRow>> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?,
    )
}

/// Creates the user's resume or replaces its content.
pub async fn upsert_resume<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    content: &str,
) -> Result<ResumeRow> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, user_id, content)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET
            content = EXCLUDED.content,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(content)
    .fetch_one(executor)
    .await?;

    info!("Saved resume for user {user_id} ({} bytes)", content.len());
    Ok(row)
}
