//! Narrative source: the upstream vision/text model that turns a meal photo
//! or free-form description into a nutrition narrative we then extract from.
//!
//! The provider sits behind a trait so the pipeline and tests never touch the
//! network. The real provider speaks the OpenAI chat-completions API with a
//! prompt that asks for a final tally line; a mock returns canned narratives.
//!
//! Transient upstream failures (timeouts, 408/429, 5xx) are retried with
//! exponential backoff. Anything else fails immediately.

use std::time::Duration;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "Ты нутрициолог. Опиши блюдо и его состав, затем \
одной строкой дай итог строго в формате: \
'Итого: X ккал, Y г белка, Z г жиров, W г углеводов'. \
Если на фото нет еды или описание не про еду, скажи, что не можешь помочь. \
Если не хватает данных о порции, задай один уточняющий вопрос, начав строку с 'ВОПРОС:'.";

/// What we ask the upstream model about.
#[derive(Debug, Clone)]
pub enum NarrativeRequest {
    Text(String),
    /// Base64-encoded JPEG, sent as an inline data URL.
    Photo { base64_jpeg: String },
}

/// Coarse classification of an upstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeReply {
    /// A usable nutrition narrative.
    Narrative(String),
    /// The model needs more information; the text after the marker.
    Question(String),
    /// The model declined (not food, unable to help).
    Refusal(String),
}

const QUESTION_MARKER: &str = "ВОПРОС:";
const REFUSAL_PHRASES: &[&str] = &["извините", "не могу", "невозможно", "не в состоянии"];

/// Sort a raw upstream reply into narrative / question / refusal.
///
/// The question marker wins over refusal phrasing: "извините, ВОПРОС: ..." is
/// still a question the user can answer.
pub fn classify_reply(raw: &str) -> NarrativeReply {
    let trimmed = raw.trim();
    if let Some(pos) = trimmed.find(QUESTION_MARKER) {
        let question = trimmed[pos + QUESTION_MARKER.len()..].trim();
        return NarrativeReply::Question(question.to_owned());
    }
    let lower = trimmed.to_lowercase();
    if REFUSAL_PHRASES.iter().any(|p| lower.contains(p)) {
        return NarrativeReply::Refusal(trimmed.to_owned());
    }
    NarrativeReply::Narrative(trimmed.to_owned())
}

/// Upstream narrative provider. One call, no retry; retry lives in
/// [`fetch_with_retry`] so mocks stay trivial.
#[async_trait]
pub trait NarrativeSource: Send + Sync {
    async fn fetch_narrative(&self, request: &NarrativeRequest) -> Result<String, CallError>;
    fn provider_name(&self) -> &'static str;
}

/// Call failure split by retryability.
#[derive(Debug)]
pub enum CallError {
    /// Timeout, connection failure, 408/429, or 5xx. Worth retrying.
    Transient(anyhow::Error),
    /// Auth errors, malformed responses, 4xx. Retrying cannot help.
    Fatal(anyhow::Error),
}

/// Exponential backoff schedule: `base_delay * 2^attempt` between tries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Fetch with retry on transient failures only.
pub async fn fetch_with_retry(
    source: &dyn NarrativeSource,
    request: &NarrativeRequest,
    policy: RetryPolicy,
) -> anyhow::Result<String> {
    let mut attempt = 0;
    loop {
        match source.fetch_narrative(request).await {
            Ok(reply) => return Ok(reply),
            Err(CallError::Fatal(e)) => {
                return Err(e.context(format!("{} call failed", source.provider_name())));
            }
            Err(CallError::Transient(e)) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(e.context(format!(
                        "{} unavailable after {} attempts",
                        source.provider_name(),
                        attempt
                    )));
                }
                let delay = policy.base_delay * 2u32.pow(attempt - 1);
                warn!(
                    provider = source.provider_name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient upstream failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Real provider over the OpenAI chat-completions API.
pub struct OpenAiNarrativeSource {
    http: reqwest::Client,
    api_key: String,
    text_model: String,
    vision_model: String,
}

impl OpenAiNarrativeSource {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("meal-nutrition-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            text_model: DEFAULT_TEXT_MODEL.to_owned(),
            vision_model: DEFAULT_VISION_MODEL.to_owned(),
        }
    }

    /// Key from `OPENAI_API_KEY`; errors when unset so misconfiguration is
    /// caught at startup, not on the first user message.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var(ENV_OPENAI_API_KEY)
            .map_err(|_| anyhow!("{ENV_OPENAI_API_KEY} is not set"))?;
        if api_key.is_empty() {
            bail!("{ENV_OPENAI_API_KEY} is empty");
        }
        Ok(Self::new(api_key))
    }

    fn request_body(&self, request: &NarrativeRequest) -> serde_json::Value {
        match request {
            NarrativeRequest::Text(text) => json!({
                "model": self.text_model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": text},
                ],
                "temperature": 0.2,
                "max_tokens": 600,
            }),
            NarrativeRequest::Photo { base64_jpeg } => json!({
                "model": self.vision_model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": [
                        {"type": "text", "text": "Что это за блюдо и сколько в нём калорий?"},
                        {"type": "image_url", "image_url": {
                            "url": format!("data:image/jpeg;base64,{base64_jpeg}"),
                        }},
                    ]},
                ],
                "temperature": 0.2,
                "max_tokens": 600,
            }),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl NarrativeSource for OpenAiNarrativeSource {
    async fn fetch_narrative(&self, request: &NarrativeRequest) -> Result<String, CallError> {
        let resp = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    CallError::Transient(e.into())
                } else {
                    CallError::Fatal(e.into())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let err = anyhow!("upstream returned {status}");
            return Err(if status.is_server_error() || status.as_u16() == 408 || status.as_u16() == 429 {
                CallError::Transient(err)
            } else {
                CallError::Fatal(err)
            });
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CallError::Fatal(anyhow!(e).context("decoding upstream response")))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CallError::Fatal(anyhow!("upstream response has no choices")))?;
        debug!(provider = "openai", chars = content.len(), "narrative received");
        Ok(content)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Deterministic source for tests and local runs.
#[derive(Clone)]
pub struct MockNarrativeSource {
    pub fixed: String,
}

#[async_trait]
impl NarrativeSource for MockNarrativeSource {
    async fn fetch_narrative(&self, _request: &NarrativeRequest) -> Result<String, CallError> {
        Ok(self.fixed.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
