//! LLM Client: the single point of entry for all text-generation calls in Sensai.
//!
//! ARCHITECTURAL RULE: No other module may call the model API directly.
//! All LLM interactions MUST go through `LlmClient`, which owns the
//! retry → sanitize → parse → normalize pipeline.
//!
//! The vendor sits behind `TextGenerator` ("send prompt, get text"), so the
//! pipeline can be exercised against a fake in tests.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod retry;
pub mod sanitize;
pub mod schema;

pub use gemini::GeminiGenerator;
pub use retry::{execute_with_retry, FailureClass, RetryPolicy};
pub use schema::{FieldKind, Schema};

/// Default model when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM client is not configured (no API key)")]
    Unconfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("upstream still failing after {attempts} attempts: {source}")]
    TransientUpstream {
        attempts: u32,
        #[source]
        source: Box<LlmError>,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
}

impl LlmError {
    /// Classifies the failure for the retry controller.
    pub fn class(&self) -> FailureClass {
        match self {
            LlmError::Api { status, .. } => FailureClass::from_status(*status),
            LlmError::Http(e) => e
                .status()
                .map(|s| FailureClass::from_status(s.as_u16()))
                .unwrap_or(FailureClass::Transport),
            LlmError::TransientUpstream { source, .. } => source.class(),
            LlmError::Unconfigured
            | LlmError::MalformedPayload(_)
            | LlmError::EmptyContent
            | LlmError::DeadlineExceeded(_) => FailureClass::Local,
        }
    }
}

/// Minimal capability every model backend provides.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

/// Process-wide client configuration, read once at startup.
#[derive(Clone)]
pub struct LlmConfig {
    /// `None` or blank means the client runs unconfigured.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Per-attempt HTTP timeout.
    pub request_timeout: Duration,
    /// Upper bound on one logical call, retries and backoff included.
    pub deadline: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// The single LLM client used by all services in Sensai.
///
/// Cheap to clone: the generator handle is shared and carries no per-call state.
/// An unconfigured client short-circuits every call to `LlmError::Unconfigured`
/// without touching the network.
#[derive(Clone)]
pub struct LlmClient {
    generator: Option<Arc<dyn TextGenerator>>,
    policy: RetryPolicy,
    deadline: Duration,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        let generator = match key {
            Some(key) => {
                let gemini = GeminiGenerator::new(
                    key,
                    &config.model,
                    &config.base_url,
                    config.request_timeout,
                )?;
                Some(Arc::new(gemini) as Arc<dyn TextGenerator>)
            }
            None => {
                warn!("No Gemini API key configured; AI features will fall back to empty results");
                None
            }
        };

        Ok(Self {
            generator,
            policy: RetryPolicy::default(),
            deadline: config.deadline,
        })
    }

    pub fn unconfigured() -> Self {
        Self {
            generator: None,
            policy: RetryPolicy::default(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
            policy: RetryPolicy::default(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model())
    }

    /// Sends the prompt and returns the raw model text.
    /// Retries per the client's `RetryPolicy`, bounded by the call deadline.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let generator = self.generator.as_ref().ok_or(LlmError::Unconfigured)?;

        let attempt = execute_with_retry(&self.policy, || generator.generate(prompt));
        let text = tokio::time::timeout(self.deadline, attempt)
            .await
            .map_err(|_| LlmError::DeadlineExceeded(self.deadline))??;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!(
            "LLM call succeeded: model={}, response_chars={}",
            generator.model(),
            text.len()
        );
        Ok(text)
    }

    /// Calls the model and returns its payload normalized against `schema`.
    /// Every schema field is present in the result; only transport and parse
    /// failures surface as errors.
    pub async fn request_extraction(&self, prompt: &str, schema: &Schema) -> Result<Value, LlmError> {
        let raw = self.call(prompt).await?;
        let parsed = sanitize::parse_payload(&raw)?;
        Ok(schema.normalize(&parsed))
    }

    /// Typed variant of `request_extraction`. `T` must mirror `schema`.
    pub async fn extract<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: &Schema,
    ) -> Result<T, LlmError> {
        let value = self.request_extraction(prompt, schema).await?;
        serde_json::from_value(value).map_err(|e| {
            LlmError::MalformedPayload(format!("normalized payload does not fit target type: {e}"))
        })
    }

    /// Free-text call: fences removed, whitespace trimmed.
    pub async fn request_text(&self, prompt: &str) -> Result<String, LlmError> {
        let raw = self.call(prompt).await?;
        let text = sanitize::strip_all_fences(&raw);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockGenerator, MockReply};
    use super::*;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(10),
            jitter: Duration::ZERO,
            ..RetryPolicy::default()
        }
    }

    fn growth_schema() -> Schema {
        Schema::new()
            .number("growthRate")
            .enumeration("demandLevel", &["High", "Medium", "Low"], "Medium")
            .array("topSkills", FieldKind::String)
    }

    fn config_with_key(key: Option<&str>, base_url: &str) -> LlmConfig {
        LlmConfig {
            api_key: key.map(String::from),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
            deadline: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_blank_key_yields_unconfigured_client() {
        for key in [None, Some(""), Some("   ")] {
            let client = LlmClient::from_config(&config_with_key(key, DEFAULT_BASE_URL)).unwrap();
            assert!(!client.is_configured());
            assert!(client.model().is_none());
            assert!(matches!(
                client.call("hello").await,
                Err(LlmError::Unconfigured)
            ));
            assert!(matches!(
                client.request_extraction("hello", &growth_schema()).await,
                Err(LlmError::Unconfigured)
            ));
            assert!(matches!(
                client.request_text("hello").await,
                Err(LlmError::Unconfigured)
            ));
        }
    }

    #[tokio::test]
    async fn test_unconfigured_client_makes_no_network_calls() {
        let server = wiremock::MockServer::start().await;
        let client = LlmClient::from_config(&config_with_key(Some(""), &server.uri())).unwrap();

        for _ in 0..3 {
            let result = client.request_extraction("prompt", &growth_schema()).await;
            assert!(matches!(result, Err(LlmError::Unconfigured)));
        }

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_configured_client_reports_model() {
        let client =
            LlmClient::from_config(&config_with_key(Some("key-123"), DEFAULT_BASE_URL)).unwrap();
        assert!(client.is_configured());
        assert_eq!(client.model(), Some(DEFAULT_MODEL));
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let rendered = format!("{:?}", config_with_key(Some("super-secret"), DEFAULT_BASE_URL));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_fenced_percent_growth_rate_is_coerced() {
        let mock = Arc::new(MockGenerator::text(
            "```json\n{\"growthRate\": \"12.5%\"}\n```",
        ));
        let client = LlmClient::with_generator(mock.clone());

        let value = client
            .request_extraction("insights", &growth_schema())
            .await
            .unwrap();

        assert_eq!(value["growthRate"].as_f64(), Some(12.5));
        assert_eq!(value["demandLevel"], "MEDIUM");
        assert_eq!(value["topSkills"], serde_json::json!([]));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_text_is_malformed_payload() {
        let client = LlmClient::with_generator(Arc::new(MockGenerator::text(
            "I'm sorry, I can't help with that.",
        )));
        let result = client.request_extraction("insights", &growth_schema()).await;
        assert!(matches!(result, Err(LlmError::MalformedPayload(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried_until_success() {
        let mock = Arc::new(MockGenerator::sequence(vec![
            MockReply::Status(503),
            MockReply::Status(429),
            MockReply::Text("{\"growthRate\": 4}".to_string()),
        ]));
        let client = LlmClient::with_generator(mock.clone()).with_policy(fast_policy(3));

        let value = client
            .request_extraction("insights", &growth_schema())
            .await
            .unwrap();

        assert_eq!(value["growthRate"], 4);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_surface_transient_upstream() {
        let mock = Arc::new(MockGenerator::always(MockReply::Status(500)));
        let client = LlmClient::with_generator(mock.clone()).with_policy(fast_policy(2));

        let err = client.call("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::TransientUpstream { attempts: 3, .. }));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_fails_fast() {
        let mock = Arc::new(MockGenerator::always(MockReply::Status(401)));
        let client = LlmClient::with_generator(mock.clone());

        let err = client.call("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 401, .. }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_a_hanging_call() {
        let client = LlmClient::with_generator(Arc::new(MockGenerator::always(MockReply::Hang)))
            .with_deadline(Duration::from_secs(2));

        let err = client.call("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::DeadlineExceeded(d) if d == Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_whitespace_only_response_is_empty_content() {
        let client = LlmClient::with_generator(Arc::new(MockGenerator::text("  \n ")));
        assert!(matches!(
            client.call("prompt").await,
            Err(LlmError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_request_text_strips_fences() {
        let client = LlmClient::with_generator(Arc::new(MockGenerator::text(
            "```\nPractice recursion problems daily.\n```",
        )));
        let text = client.request_text("tip").await.unwrap();
        assert_eq!(text, "Practice recursion problems daily.");
    }

    #[tokio::test]
    async fn test_extract_deserializes_normalized_value() {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Growth {
            growth_rate: f64,
            demand_level: String,
            top_skills: Vec<String>,
        }

        let client = LlmClient::with_generator(Arc::new(MockGenerator::text(
            r#"{"growthRate": 7, "demandLevel": "high", "topSkills": "Rust"}"#,
        )));
        let growth: Growth = client.extract("prompt", &growth_schema()).await.unwrap();

        assert!((growth.growth_rate - 7.0).abs() < f64::EPSILON);
        assert_eq!(growth.demand_level, "HIGH");
        assert!(growth.top_skills.is_empty());
    }

    #[test]
    fn test_error_classification() {
        let api = |status| LlmError::Api {
            status,
            message: String::new(),
        };
        assert_eq!(api(429).class(), FailureClass::RateLimited);
        assert_eq!(api(503).class(), FailureClass::ServiceUnavailable);
        assert_eq!(api(400).class(), FailureClass::Client);
        assert_eq!(LlmError::Unconfigured.class(), FailureClass::Local);
        assert_eq!(
            LlmError::MalformedPayload("x".into()).class(),
            FailureClass::Local
        );
    }
}
