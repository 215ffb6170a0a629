use sqlx::PgPool;

use crate::insights::freshness::FreshnessPolicy;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Built once at startup; every service shares this handle.
    pub llm: LlmClient,
    pub insight_policy: FreshnessPolicy,
}
