//! HTTP client for the text-generation endpoint.
//!
//! Speaks a messages-style JSON protocol (system context plus one user
//! message, `content[0].text` in the response). Every call is bounded by the
//! configured timeout; transport and HTTP failures surface as
//! `ExternalCallFailed`, response-shape problems as `MalformedResponse`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use pricepilot_core::error::{PricingError, Result};
use pricepilot_core::traits::TextGenerator;
use pricepilot_core::types::StructuredRecommendation;

use crate::schema;

/// Configuration for the text-generation client.
#[derive(Debug, Clone)]
pub struct TextGenClientConfig {
    /// Endpoint URL for message generation.
    pub base_url: String,

    /// Model identifier sent with each request.
    pub model: String,

    /// Optional bearer token.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TextGenClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/mock-api/generate".to_string(),
            model: "claude-3-sonnet".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl TextGenClientConfig {
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
struct ContentBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct TextGenClient {
    config: TextGenClientConfig,
    http: Client,
}

impl TextGenClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: TextGenClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| PricingError::external(format!("client build failed: {err}")))?;
        Ok(Self { config, http })
    }

    async fn request(
        &self,
        system_context: &str,
        user_context: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let body = GenerateRequest {
            model: &self.config.model,
            max_tokens: max_output_tokens,
            system: system_context,
            messages: vec![Message {
                role: "user",
                content: vec![ContentBlock {
                    kind: "text",
                    text: user_context,
                }],
            }],
        };

        let mut request = self.http.post(&self.config.base_url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PricingError::external(format!(
                "text generation returned {status}: {message}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| PricingError::malformed(format!("response body: {err}")))?;
        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| PricingError::malformed("response carried no text content"))?;

        debug!(chars = text.len(), "text generation completed");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for TextGenClient {
    async fn generate(
        &self,
        system_context: &str,
        user_context: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        self.request(system_context, user_context, max_output_tokens)
            .await
    }

    async fn generate_structured(
        &self,
        system_context: &str,
        user_context: &str,
        max_output_tokens: u32,
    ) -> Result<StructuredRecommendation> {
        let raw = self
            .request(system_context, user_context, max_output_tokens)
            .await?;
        schema::parse_structured(&raw)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> PricingError {
    if err.is_timeout() {
        PricingError::external(format!("text generation timed out: {err}"))
    } else {
        PricingError::external(format!("text generation request failed: {err}"))
    }
}
